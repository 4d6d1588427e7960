//! Appointment persistence queries.

pub mod overlap;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use chairside_core::slot::TimeSlot;

use crate::db::connection::DbConnection;
use crate::db::enums::AppointmentStatus;
use crate::db::schema::appointment;
use crate::error::DbResult;
use crate::model::appointment::{Appointment, NewAppointment};

/// Exclusion constraints guarding against double-booking at insert time, one
/// per resource column. Names match the migration DDL.
pub const OVERLAP_CONSTRAINTS: [&str; 3] = [
    "appointment_provider_no_overlap",
    "appointment_chair_no_overlap",
    "appointment_room_no_overlap",
];

/// ## Summary
/// Inserts an appointment and returns the stored row.
///
/// A violation of one of [`OVERLAP_CONSTRAINTS`] propagates as a database
/// error; the service layer maps it to the same conflict outcome the
/// advisory availability check produces.
///
/// ## Errors
/// Returns database errors if the insert fails.
pub async fn insert_appointment(
    conn: &mut DbConnection<'_>,
    new_appointment: &NewAppointment,
) -> DbResult<Appointment> {
    let appointment = diesel::insert_into(appointment::table)
        .values(new_appointment)
        .returning(Appointment::as_select())
        .get_result::<Appointment>(conn)
        .await?;

    Ok(appointment)
}

/// ## Summary
/// Fetches an appointment by id.
///
/// ## Errors
/// Returns database errors if the query fails.
pub async fn get_appointment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<Appointment>> {
    let appointment = appointment::table
        .find(id)
        .select(Appointment::as_select())
        .first::<Appointment>(conn)
        .await
        .optional()?;

    Ok(appointment)
}

/// ## Summary
/// Cancels an appointment, releasing its resources.
///
/// The cancellation instant is stamped by the database, keeping this crate
/// free of ambient clock reads. Returns `None` when no row with that id was
/// still cancellable.
///
/// ## Errors
/// Returns database errors if the update fails.
pub async fn cancel_appointment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<Appointment>> {
    let appointment = diesel::update(
        appointment::table
            .filter(appointment::id.eq(id))
            .filter(appointment::status.ne(AppointmentStatus::Cancelled)),
    )
    .set((
        appointment::status.eq(AppointmentStatus::Cancelled),
        appointment::cancelled_at.eq(diesel::dsl::now),
        appointment::updated_at.eq(diesel::dsl::now),
    ))
    .returning(Appointment::as_select())
    .get_result::<Appointment>(conn)
    .await
    .optional()?;

    Ok(appointment)
}

/// ## Summary
/// Moves an appointment to a new time window.
///
/// ## Errors
/// Returns database errors if the update fails, including exclusion
/// violations when the new window double-books a resource.
pub async fn reschedule_appointment(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    slot: &TimeSlot,
) -> DbResult<Option<Appointment>> {
    let appointment = diesel::update(appointment::table.filter(appointment::id.eq(id)))
        .set((
            appointment::starts_at.eq(slot.start()),
            appointment::ends_at.eq(slot.end()),
            appointment::updated_at.eq(diesel::dsl::now),
        ))
        .returning(Appointment::as_select())
        .get_result::<Appointment>(conn)
        .await
        .optional()?;

    Ok(appointment)
}
