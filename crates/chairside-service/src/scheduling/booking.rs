//! Appointment booking: advisory availability check, insert, and mapping of
//! raced exclusion violations back to the same conflict outcome.

use chairside_core::availability::AvailabilityRequest;
use chairside_core::slot::TimeSlot;
use chairside_db::db::connection::DbConnection;
use chairside_db::db::enums::AppointmentStatus;
use chairside_db::db::query::appointment::{self, OVERLAP_CONSTRAINTS};
use chairside_db::error::DbError;
use chairside_db::model::appointment::{Appointment, NewAppointment};

use crate::error::{ServiceError, ServiceResult};
use crate::scheduling::availability::check_availability;

/// A booking to attempt for a concrete time window.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub slot: TimeSlot,
    pub notes: Option<String>,
}

impl BookingRequest {
    fn availability_request(&self, exclude: Option<uuid::Uuid>) -> AvailabilityRequest {
        AvailabilityRequest {
            provider_id: self.provider_id,
            chair_id: self.chair_id,
            room_id: self.room_id,
            slot: self.slot,
            exclude_appointment: exclude,
        }
    }
}

fn is_overlap_violation(error: &DbError) -> bool {
    let DbError::DatabaseError(diesel::result::Error::DatabaseError(_, info)) = error else {
        return false;
    };
    info.constraint_name()
        .is_some_and(|name| OVERLAP_CONSTRAINTS.contains(&name))
}

/// ## Summary
/// Books an appointment after verifying its window is free.
///
/// The availability check and the insert are two steps; a concurrent booking
/// can win the slot in between. When the insert then trips an exclusion
/// constraint, the conflict set is re-read and the caller sees the same
/// unavailable outcome the pre-check would have produced.
///
/// ## Errors
/// Returns [`ServiceError::SlotUnavailable`] with the conflicting
/// appointments when a resource is double-booked, or database errors from
/// the lookups and the insert.
#[tracing::instrument(
    skip(conn, request),
    fields(provider_id = %request.provider_id, patient_id = %request.patient_id)
)]
pub async fn book_appointment(
    conn: &mut DbConnection<'_>,
    request: &BookingRequest,
) -> ServiceResult<Appointment> {
    let availability = check_availability(conn, &request.availability_request(None)).await?;
    if !availability.is_available() {
        tracing::info!(
            conflict_count = availability.conflicts.len(),
            "Booking rejected by availability check"
        );
        return Err(ServiceError::SlotUnavailable {
            conflicts: availability.conflicts,
        });
    }

    let new_appointment = NewAppointment {
        id: uuid::Uuid::now_v7(),
        practice_id: request.practice_id,
        patient_id: request.patient_id,
        provider_id: request.provider_id,
        chair_id: request.chair_id,
        room_id: request.room_id,
        starts_at: request.slot.start(),
        ends_at: request.slot.end(),
        status: AppointmentStatus::Scheduled,
        notes: request.notes.clone(),
    };

    match appointment::insert_appointment(conn, &new_appointment).await {
        Ok(appointment) => {
            tracing::info!(appointment_id = %appointment.id, "Appointment booked");
            Ok(appointment)
        }
        Err(error) if is_overlap_violation(&error) => {
            // A concurrent booking won the slot between check and insert
            tracing::info!("Booking lost the slot to a concurrent insert");
            let availability =
                check_availability(conn, &request.availability_request(None)).await?;
            Err(ServiceError::SlotUnavailable {
                conflicts: availability.conflicts,
            })
        }
        Err(error) => Err(error.into()),
    }
}

/// ## Summary
/// Cancels an appointment, releasing its resources for rebooking.
///
/// ## Errors
/// Returns [`ServiceError::NotFound`] when no cancellable appointment with
/// that id exists, or database errors from the update.
#[tracing::instrument(skip(conn))]
pub async fn cancel_appointment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> ServiceResult<Appointment> {
    let cancelled = appointment::cancel_appointment(conn, id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("appointment {id} not found or already cancelled"))
        })?;

    tracing::info!(appointment_id = %cancelled.id, "Appointment cancelled");
    Ok(cancelled)
}

/// ## Summary
/// Moves an existing appointment to a new window.
///
/// The appointment's own interval is excluded from the availability check,
/// so shrinking or shifting within its current window never conflicts with
/// itself.
///
/// ## Errors
/// Returns [`ServiceError::NotFound`] when the appointment does not exist,
/// [`ServiceError::SlotUnavailable`] when the new window is taken, or
/// database errors from the lookups and the update.
#[tracing::instrument(skip(conn, slot))]
pub async fn reschedule_appointment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    slot: TimeSlot,
) -> ServiceResult<Appointment> {
    let existing = appointment::get_appointment(conn, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("appointment {id}")))?;

    let availability_request = AvailabilityRequest {
        provider_id: existing.provider_id,
        chair_id: existing.chair_id,
        room_id: existing.room_id,
        slot,
        exclude_appointment: Some(id),
    };

    let availability = check_availability(conn, &availability_request).await?;
    if !availability.is_available() {
        return Err(ServiceError::SlotUnavailable {
            conflicts: availability.conflicts,
        });
    }

    match appointment::reschedule_appointment(conn, id, &slot).await {
        Ok(Some(updated)) => {
            tracing::info!(appointment_id = %updated.id, "Appointment rescheduled");
            Ok(updated)
        }
        Ok(None) => Err(ServiceError::NotFound(format!("appointment {id}"))),
        Err(error) if is_overlap_violation(&error) => {
            let availability = check_availability(conn, &availability_request).await?;
            Err(ServiceError::SlotUnavailable {
                conflicts: availability.conflicts,
            })
        }
        Err(error) => Err(error.into()),
    }
}
