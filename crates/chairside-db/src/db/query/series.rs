//! Recurrence series and occurrence persistence queries.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::connection::DbConnection;
use crate::db::enums::OccurrenceStatus;
use crate::db::schema::{recurrence_series, series_occurrence};
use crate::error::{DbError, DbResult};
use crate::model::occurrence::{NewSeriesOccurrence, SeriesOccurrence};
use crate::model::series::{NewRecurrenceSeries, RecurrenceSeries};

/// ## Summary
/// Inserts a series together with its generated occurrences in one
/// transaction, so a half-written series is never visible.
///
/// ## Errors
/// Returns database errors if either insert fails; the transaction rolls
/// back as a whole.
pub async fn insert_series<'a>(
    conn: &mut DbConnection<'_>,
    new_series: &'a NewRecurrenceSeries,
    new_occurrences: &'a [NewSeriesOccurrence],
) -> DbResult<(RecurrenceSeries, Vec<SeriesOccurrence>)> {
    let conn: &mut diesel_async::AsyncPgConnection = &mut *conn;
    conn.transaction::<_, DbError, _>(|conn| {
        async move {
            let series = diesel::insert_into(recurrence_series::table)
                .values(new_series)
                .returning(RecurrenceSeries::as_select())
                .get_result::<RecurrenceSeries>(conn)
                .await?;

            let occurrences = diesel::insert_into(series_occurrence::table)
                .values(new_occurrences)
                .returning(SeriesOccurrence::as_select())
                .get_results::<SeriesOccurrence>(conn)
                .await?;

            Ok((series, occurrences))
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Fetches a series by id.
///
/// ## Errors
/// Returns database errors if the query fails.
pub async fn get_series(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<RecurrenceSeries>> {
    let series = recurrence_series::table
        .find(id)
        .select(RecurrenceSeries::as_select())
        .first::<RecurrenceSeries>(conn)
        .await
        .optional()?;

    Ok(series)
}

/// ## Summary
/// Loads a series' occurrences in series order.
///
/// ## Errors
/// Returns database errors if the query fails.
pub async fn occurrences_for_series(
    conn: &mut DbConnection<'_>,
    series_id: uuid::Uuid,
) -> DbResult<Vec<SeriesOccurrence>> {
    let occurrences = series_occurrence::table
        .filter(series_occurrence::series_id.eq(series_id))
        .order(series_occurrence::occurrence_number.asc())
        .select(SeriesOccurrence::as_select())
        .load::<SeriesOccurrence>(conn)
        .await?;

    Ok(occurrences)
}

/// ## Summary
/// Fetches a single occurrence by id.
///
/// ## Errors
/// Returns database errors if the query fails.
pub async fn get_occurrence(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<SeriesOccurrence>> {
    let occurrence = series_occurrence::table
        .find(id)
        .select(SeriesOccurrence::as_select())
        .first::<SeriesOccurrence>(conn)
        .await
        .optional()?;

    Ok(occurrence)
}

/// ## Summary
/// Links a pending occurrence to the appointment created from it.
///
/// Only pending occurrences move; returns `None` when the occurrence does
/// not exist or was already materialized or skipped.
///
/// ## Errors
/// Returns database errors if the update fails.
pub async fn mark_occurrence_materialized(
    conn: &mut DbConnection<'_>,
    occurrence_id: uuid::Uuid,
    appointment_id: uuid::Uuid,
) -> DbResult<Option<SeriesOccurrence>> {
    let occurrence = diesel::update(
        series_occurrence::table
            .filter(series_occurrence::id.eq(occurrence_id))
            .filter(series_occurrence::status.eq(OccurrenceStatus::Pending)),
    )
    .set((
        series_occurrence::status.eq(OccurrenceStatus::Materialized),
        series_occurrence::appointment_id.eq(appointment_id),
    ))
    .returning(SeriesOccurrence::as_select())
    .get_result::<SeriesOccurrence>(conn)
    .await
    .optional()?;

    Ok(occurrence)
}

/// ## Summary
/// Marks a pending occurrence skipped.
///
/// ## Errors
/// Returns database errors if the update fails.
pub async fn mark_occurrence_skipped(
    conn: &mut DbConnection<'_>,
    occurrence_id: uuid::Uuid,
) -> DbResult<Option<SeriesOccurrence>> {
    let occurrence = diesel::update(
        series_occurrence::table
            .filter(series_occurrence::id.eq(occurrence_id))
            .filter(series_occurrence::status.eq(OccurrenceStatus::Pending)),
    )
    .set(series_occurrence::status.eq(OccurrenceStatus::Skipped))
    .returning(SeriesOccurrence::as_select())
    .get_result::<SeriesOccurrence>(conn)
    .await
    .optional()?;

    Ok(occurrence)
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_series_queries_compile() {
        // This test just verifies the function signatures compile
        // Integration tests with database would go in the tests module
    }
}
