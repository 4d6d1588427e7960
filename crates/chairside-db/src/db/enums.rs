//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

use chairside_core::recurrence::RecurrencePattern;

/// Appointment lifecycle status.
///
/// Maps to `appointment.status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl ToSql<Text, Pg> for AppointmentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AppointmentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"scheduled" => Ok(Self::Scheduled),
            b"completed" => Ok(Self::Completed),
            b"cancelled" => Ok(Self::Cancelled),
            b"no_show" => Ok(Self::NoShow),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl AppointmentStatus {
    /// Returns the database string representation of this appointment status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Whether an appointment in this status holds its resources.
    ///
    /// Cancelled and no-show appointments release the slot and never count as
    /// conflicts.
    #[must_use]
    pub const fn blocks_schedule(self) -> bool {
        matches!(self, Self::Scheduled | Self::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Series occurrence lifecycle status.
///
/// Maps to `series_occurrence.status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Pending,
    Materialized,
    Skipped,
}

impl ToSql<Text, Pg> for OccurrenceStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for OccurrenceStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(Self::Pending),
            b"materialized" => Ok(Self::Materialized),
            b"skipped" => Ok(Self::Skipped),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl OccurrenceStatus {
    /// Returns the database string representation of this occurrence status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Materialized => "materialized",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence pattern discriminant.
///
/// Maps to `recurrence_series.pattern` CHECK constraint; the variant-specific
/// fields live in their own columns and are reassembled by the map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum PatternKind {
    Daily,
    Weekly,
    Biweekly,
    MonthlyByDay,
    MonthlyByWeekday,
    EveryNWeeks,
}

impl ToSql<Text, Pg> for PatternKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for PatternKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"daily" => Ok(Self::Daily),
            b"weekly" => Ok(Self::Weekly),
            b"biweekly" => Ok(Self::Biweekly),
            b"monthly_by_day" => Ok(Self::MonthlyByDay),
            b"monthly_by_weekday" => Ok(Self::MonthlyByWeekday),
            b"every_n_weeks" => Ok(Self::EveryNWeeks),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl PatternKind {
    /// Returns the database string representation of this pattern kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::MonthlyByDay => "monthly_by_day",
            Self::MonthlyByWeekday => "monthly_by_weekday",
            Self::EveryNWeeks => "every_n_weeks",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&RecurrencePattern> for PatternKind {
    fn from(pattern: &RecurrencePattern) -> Self {
        match pattern {
            RecurrencePattern::Daily => Self::Daily,
            RecurrencePattern::Weekly { .. } => Self::Weekly,
            RecurrencePattern::Biweekly { .. } => Self::Biweekly,
            RecurrencePattern::MonthlyByDay { .. } => Self::MonthlyByDay,
            RecurrencePattern::MonthlyByWeekday { .. } => Self::MonthlyByWeekday,
            RecurrencePattern::EveryNWeeks { .. } => Self::EveryNWeeks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_kind_matches_core_kind_strings() {
        use std::num::NonZeroU32;

        use chairside_core::recurrence::WeekdaySet;
        use chrono::Weekday;

        let patterns = vec![
            RecurrencePattern::Daily,
            RecurrencePattern::Weekly {
                days: WeekdaySet::from_indices(&[1]).unwrap(),
            },
            RecurrencePattern::Biweekly {
                weekday: Weekday::Tue,
            },
            RecurrencePattern::MonthlyByDay { day: 15 },
            RecurrencePattern::MonthlyByWeekday {
                week: chairside_core::recurrence::MonthWeek::Last,
                weekday: Weekday::Fri,
            },
            RecurrencePattern::EveryNWeeks {
                interval: NonZeroU32::new(3).unwrap(),
                days: WeekdaySet::from_indices(&[2]).unwrap(),
            },
        ];

        for pattern in &patterns {
            assert_eq!(PatternKind::from(pattern).as_str(), pattern.kind_str());
        }
    }

    #[test]
    fn cancelled_and_no_show_release_the_slot() {
        assert!(AppointmentStatus::Scheduled.blocks_schedule());
        assert!(AppointmentStatus::Completed.blocks_schedule());
        assert!(!AppointmentStatus::Cancelled.blocks_schedule());
        assert!(!AppointmentStatus::NoShow.blocks_schedule());
    }
}
