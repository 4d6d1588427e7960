//! Recurring-series workflows: expansion, persistence, and turning pending
//! occurrences into booked appointments.

use chrono::TimeDelta;

use chairside_core::recurrence::{RecurrenceRule, expand};
use chairside_core::slot::TimeSlot;
use chairside_db::db::connection::DbConnection;
use chairside_db::db::enums::OccurrenceStatus;
use chairside_db::db::map::series::{SeriesParties, new_occurrence_rows, new_series_row};
use chairside_db::db::query::series as series_query;
use chairside_db::model::appointment::Appointment;
use chairside_db::model::occurrence::SeriesOccurrence;
use chairside_db::model::series::RecurrenceSeries;

use crate::error::{ServiceError, ServiceResult};
use crate::scheduling::booking::{BookingRequest, book_appointment};

/// A recurring-visit definition to create for a patient.
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub rule: RecurrenceRule,
}

/// A stored series with its occurrences in series order.
#[derive(Debug, Clone)]
pub struct SeriesWithOccurrences {
    pub series: RecurrenceSeries,
    pub occurrences: Vec<SeriesOccurrence>,
}

/// ## Summary
/// Expands a recurrence rule and persists the series with its occurrences in
/// one transaction.
///
/// The rule was validated at construction, so expansion only comes up empty
/// when the pattern genuinely never fires inside its window (e.g. a weekly
/// rule whose day is not in a short window); that is rejected rather than
/// stored as a series with nothing in it.
///
/// ## Errors
/// Returns a validation error for an empty expansion, or database errors
/// from the transactional insert.
#[tracing::instrument(
    skip(conn, request),
    fields(provider_id = %request.provider_id, pattern = request.rule.pattern().kind_str())
)]
pub async fn create_series(
    conn: &mut DbConnection<'_>,
    request: &SeriesRequest,
) -> ServiceResult<SeriesWithOccurrences> {
    let occurrences = expand(&request.rule);
    if occurrences.is_empty() {
        return Err(ServiceError::ValidationError(
            "recurrence rule produces no occurrences within its bounds".to_string(),
        ));
    }

    tracing::debug!(
        occurrence_count = occurrences.len(),
        "Expanded recurrence rule"
    );

    let series_id = uuid::Uuid::now_v7();
    let parties = SeriesParties {
        practice_id: request.practice_id,
        patient_id: request.patient_id,
        provider_id: request.provider_id,
        chair_id: request.chair_id,
        room_id: request.room_id,
    };
    let new_series = new_series_row(series_id, parties, &request.rule)?;
    let new_occurrences = new_occurrence_rows(series_id, &occurrences)?;

    let (series, stored) = series_query::insert_series(conn, &new_series, &new_occurrences).await?;

    tracing::info!(
        series_id = %series.id,
        occurrence_count = stored.len(),
        "Recurrence series created"
    );

    Ok(SeriesWithOccurrences {
        series,
        occurrences: stored,
    })
}

/// ## Summary
/// Loads a series and its occurrences.
///
/// ## Errors
/// Returns [`ServiceError::NotFound`] when the series does not exist, or
/// database errors from the lookups.
pub async fn get_series(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> ServiceResult<SeriesWithOccurrences> {
    let series = series_query::get_series(conn, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("series {id}")))?;
    let occurrences = series_query::occurrences_for_series(conn, id).await?;

    Ok(SeriesWithOccurrences {
        series,
        occurrences,
    })
}

/// ## Summary
/// Books an appointment for a pending occurrence and links the two.
///
/// The appointment window starts at the occurrence's scheduled date and time
/// and runs for the supplied visit duration; it goes through the regular
/// booking path, so the availability check and the exclusion constraints
/// apply unchanged.
///
/// ## Errors
/// Returns [`ServiceError::NotFound`] for an unknown occurrence, a
/// validation error when the occurrence is no longer pending or the duration
/// is not positive, [`ServiceError::SlotUnavailable`] when the window is
/// taken, or database errors.
#[tracing::instrument(skip(conn, duration, notes))]
pub async fn materialize_occurrence(
    conn: &mut DbConnection<'_>,
    occurrence_id: uuid::Uuid,
    duration: TimeDelta,
    notes: Option<String>,
) -> ServiceResult<(SeriesOccurrence, Appointment)> {
    let occurrence = series_query::get_occurrence(conn, occurrence_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("occurrence {occurrence_id}")))?;

    if occurrence.status != OccurrenceStatus::Pending {
        return Err(ServiceError::ValidationError(format!(
            "occurrence {occurrence_id} is already {}",
            occurrence.status
        )));
    }

    let series = series_query::get_series(conn, occurrence.series_id)
        .await?
        .ok_or(ServiceError::InvariantViolation(
            "occurrence references a missing series",
        ))?;

    let starts_at = occurrence
        .scheduled_date
        .and_time(occurrence.scheduled_time)
        .and_utc();
    let slot = TimeSlot::new(starts_at, starts_at + duration)?;

    let booking = BookingRequest {
        practice_id: series.practice_id,
        patient_id: series.patient_id,
        provider_id: series.provider_id,
        chair_id: series.chair_id,
        room_id: series.room_id,
        slot,
        notes,
    };
    let appointment = book_appointment(conn, &booking).await?;

    let occurrence =
        series_query::mark_occurrence_materialized(conn, occurrence_id, appointment.id)
            .await?
            .ok_or(ServiceError::InvariantViolation(
                "pending occurrence vanished during materialization",
            ))?;

    tracing::info!(
        occurrence_id = %occurrence.id,
        appointment_id = %appointment.id,
        "Occurrence materialized"
    );

    Ok((occurrence, appointment))
}

/// ## Summary
/// Marks a pending occurrence skipped.
///
/// ## Errors
/// Returns [`ServiceError::NotFound`] when no pending occurrence with that
/// id exists, or database errors from the update.
#[tracing::instrument(skip(conn))]
pub async fn skip_occurrence(
    conn: &mut DbConnection<'_>,
    occurrence_id: uuid::Uuid,
) -> ServiceResult<SeriesOccurrence> {
    series_query::mark_occurrence_skipped(conn, occurrence_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "occurrence {occurrence_id} not found or not pending"
            ))
        })
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_series_workflows_compile() {
        // This test just verifies the function signatures compile
        // Integration tests with database would go in the tests module
    }
}
