use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::PatternKind, schema};

/// A stored recurrence definition.
///
/// The pattern discriminant lives in `pattern`; the variant-specific fields
/// are nullable columns reassembled into a validated core rule by
/// `db::map::series`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::recurrence_series)]
#[diesel(check_for_backend(Pg))]
pub struct RecurrenceSeries {
    pub id: uuid::Uuid,
    /// Tenant key; every lookup is scoped to one practice.
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub pattern: PatternKind,
    /// Week stride for the every-N-weeks pattern.
    pub interval_weeks: Option<i32>,
    /// Wire weekday indices (0 = Sunday) for the weekly-family patterns.
    pub days_of_week: Option<Vec<i16>>,
    pub day_of_month: Option<i16>,
    /// 1..=4, or -1 for "last".
    pub week_of_month: Option<i16>,
    pub weekday: Option<i16>,
    pub time_of_day: chrono::NaiveTime,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub max_occurrences: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new recurrence series
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::recurrence_series)]
pub struct NewRecurrenceSeries {
    pub id: uuid::Uuid,
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub pattern: PatternKind,
    pub interval_weeks: Option<i32>,
    pub days_of_week: Option<Vec<i16>>,
    pub day_of_month: Option<i16>,
    pub week_of_month: Option<i16>,
    pub weekday: Option<i16>,
    pub time_of_day: chrono::NaiveTime,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub max_occurrences: Option<i32>,
}
