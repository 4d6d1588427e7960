use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::OccurrenceStatus, schema};

/// One generated calendar instance of a recurrence series.
///
/// The date, time, and number never change after generation; only the status
/// and the appointment link move when an occurrence is materialized or
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::series_occurrence)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::series::RecurrenceSeries, foreign_key = series_id))]
pub struct SeriesOccurrence {
    pub id: uuid::Uuid,
    pub series_id: uuid::Uuid,
    /// 1-based position within the series.
    pub occurrence_number: i32,
    pub scheduled_date: chrono::NaiveDate,
    pub scheduled_time: chrono::NaiveTime,
    pub status: OccurrenceStatus,
    pub appointment_id: Option<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new series occurrences
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::series_occurrence)]
pub struct NewSeriesOccurrence {
    pub id: uuid::Uuid,
    pub series_id: uuid::Uuid,
    pub occurrence_number: i32,
    pub scheduled_date: chrono::NaiveDate,
    pub scheduled_time: chrono::NaiveTime,
    pub status: OccurrenceStatus,
}
