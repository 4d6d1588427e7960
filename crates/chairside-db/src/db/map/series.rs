//! Mapping between `recurrence_series` rows and core recurrence rules.
//!
//! A row that is missing the fields its pattern requires surfaces an
//! explicit validation error here; it never turns into a rule that silently
//! expands to nothing.

use std::num::NonZeroU32;

use chairside_core::error::{CoreError, CoreResult};
use chairside_core::recurrence::{
    MonthWeek, Occurrence, RecurrencePattern, RecurrenceRule, WeekdaySet, weekday_from_index,
    weekday_index,
};

use crate::db::enums::{OccurrenceStatus, PatternKind};
use crate::model::occurrence::NewSeriesOccurrence;
use crate::model::series::{NewRecurrenceSeries, RecurrenceSeries};

fn require<T>(value: Option<T>, kind: PatternKind, field: &'static str) -> CoreResult<T> {
    value.ok_or_else(|| {
        CoreError::ValidationError(format!("{kind} series is missing its {field}"))
    })
}

fn weekday_set_from_column(days: Option<&[i16]>, kind: PatternKind) -> CoreResult<WeekdaySet> {
    let days = require(days, kind, "weekday set")?;
    let indices = days
        .iter()
        .map(|&day| {
            u8::try_from(day).map_err(|_| {
                CoreError::ValidationError(format!("{kind} series has weekday index {day}"))
            })
        })
        .collect::<CoreResult<Vec<u8>>>()?;
    WeekdaySet::from_indices(&indices)
}

fn weekday_from_column(weekday: Option<i16>, kind: PatternKind) -> CoreResult<chrono::Weekday> {
    let index = require(weekday, kind, "weekday")?;
    let index = u8::try_from(index).map_err(|_| {
        CoreError::ValidationError(format!("{kind} series has weekday index {index}"))
    })?;
    weekday_from_index(index)
}

/// ## Summary
/// Reassembles the validated recurrence rule a series row stores.
///
/// ## Errors
/// Returns a validation error when the row lacks a field its pattern
/// requires or a stored value is out of range.
pub fn rule_from_series(series: &RecurrenceSeries) -> CoreResult<RecurrenceRule> {
    let kind = series.pattern;

    let pattern = match kind {
        PatternKind::Daily => RecurrencePattern::Daily,
        PatternKind::Weekly => RecurrencePattern::Weekly {
            days: weekday_set_from_column(series.days_of_week.as_deref(), kind)?,
        },
        PatternKind::Biweekly => RecurrencePattern::Biweekly {
            weekday: weekday_from_column(series.weekday, kind)?,
        },
        PatternKind::MonthlyByDay => {
            let day = require(series.day_of_month, kind, "day of month")?;
            RecurrencePattern::MonthlyByDay {
                day: u8::try_from(day).map_err(|_| {
                    CoreError::ValidationError(format!("{kind} series has day of month {day}"))
                })?,
            }
        }
        PatternKind::MonthlyByWeekday => {
            let week = require(series.week_of_month, kind, "week of month")?;
            let week = i8::try_from(week)
                .map_err(|_| {
                    CoreError::ValidationError(format!("{kind} series has week of month {week}"))
                })
                .and_then(MonthWeek::from_index)?;
            RecurrencePattern::MonthlyByWeekday {
                week,
                weekday: weekday_from_column(series.weekday, kind)?,
            }
        }
        PatternKind::EveryNWeeks => {
            let interval = require(series.interval_weeks, kind, "week interval")?;
            let interval = u32::try_from(interval)
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or_else(|| {
                    CoreError::ValidationError(format!(
                        "{kind} series has week interval {interval}"
                    ))
                })?;
            RecurrencePattern::EveryNWeeks {
                interval,
                days: weekday_set_from_column(series.days_of_week.as_deref(), kind)?,
            }
        }
    };

    let max_occurrences = series
        .max_occurrences
        .map(|max| {
            u32::try_from(max).map_err(|_| {
                CoreError::ValidationError(format!("series has occurrence cap {max}"))
            })
        })
        .transpose()?;

    RecurrenceRule::new(
        pattern,
        series.start_date,
        series.end_date,
        max_occurrences,
        series.time_of_day,
    )
}

/// Resource assignment shared by every appointment a series produces.
#[derive(Debug, Clone, Copy)]
pub struct SeriesParties {
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
}

/// ## Summary
/// Flattens a validated rule into an insertable series row.
///
/// ## Errors
/// Returns a validation error if a rule value does not fit its column type.
pub fn new_series_row(
    id: uuid::Uuid,
    parties: SeriesParties,
    rule: &RecurrenceRule,
) -> CoreResult<NewRecurrenceSeries> {
    let mut interval_weeks = None;
    let mut days_of_week = None;
    let mut day_of_month = None;
    let mut week_of_month = None;
    let mut weekday = None;

    match rule.pattern() {
        RecurrencePattern::Daily => {}
        RecurrencePattern::Weekly { days } => {
            days_of_week = Some(days.indices().into_iter().map(i16::from).collect());
        }
        RecurrencePattern::Biweekly { weekday: day } => {
            weekday = Some(i16::from(weekday_index(*day)));
        }
        RecurrencePattern::MonthlyByDay { day } => {
            day_of_month = Some(i16::from(*day));
        }
        RecurrencePattern::MonthlyByWeekday { week, weekday: day } => {
            week_of_month = Some(i16::from(week.as_index()));
            weekday = Some(i16::from(weekday_index(*day)));
        }
        RecurrencePattern::EveryNWeeks { interval, days } => {
            interval_weeks = Some(i32::try_from(interval.get()).map_err(|_| {
                CoreError::ValidationError(format!(
                    "week interval {interval} does not fit its column"
                ))
            })?);
            days_of_week = Some(days.indices().into_iter().map(i16::from).collect());
        }
    }

    let max_occurrences = rule
        .max_occurrences()
        .map(|max| {
            i32::try_from(max).map_err(|_| {
                CoreError::ValidationError(format!(
                    "occurrence cap {max} does not fit its column"
                ))
            })
        })
        .transpose()?;

    Ok(NewRecurrenceSeries {
        id,
        practice_id: parties.practice_id,
        patient_id: parties.patient_id,
        provider_id: parties.provider_id,
        chair_id: parties.chair_id,
        room_id: parties.room_id,
        pattern: PatternKind::from(rule.pattern()),
        interval_weeks,
        days_of_week,
        day_of_month,
        week_of_month,
        weekday,
        time_of_day: rule.time_of_day(),
        start_date: rule.start_date(),
        end_date: rule.end_date(),
        max_occurrences,
    })
}

/// ## Summary
/// Builds insertable pending occurrence rows from an expansion.
///
/// ## Errors
/// Returns a validation error if an occurrence number does not fit its
/// column type.
pub fn new_occurrence_rows(
    series_id: uuid::Uuid,
    occurrences: &[Occurrence],
) -> CoreResult<Vec<NewSeriesOccurrence>> {
    occurrences
        .iter()
        .map(|occurrence| {
            let occurrence_number = i32::try_from(occurrence.number).map_err(|_| {
                CoreError::ValidationError(format!(
                    "occurrence number {} does not fit its column",
                    occurrence.number
                ))
            })?;
            Ok(NewSeriesOccurrence {
                id: uuid::Uuid::now_v7(),
                series_id,
                occurrence_number,
                scheduled_date: occurrence.date,
                scheduled_time: occurrence.time,
                status: OccurrenceStatus::Pending,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

    use super::*;

    fn parties() -> SeriesParties {
        SeriesParties {
            practice_id: uuid::Uuid::now_v7(),
            patient_id: uuid::Uuid::now_v7(),
            provider_id: uuid::Uuid::now_v7(),
            chair_id: Some(uuid::Uuid::now_v7()),
            room_id: None,
        }
    }

    fn row_from_new(new: NewRecurrenceSeries) -> RecurrenceSeries {
        RecurrenceSeries {
            id: new.id,
            practice_id: new.practice_id,
            patient_id: new.patient_id,
            provider_id: new.provider_id,
            chair_id: new.chair_id,
            room_id: new.room_id,
            pattern: new.pattern,
            interval_weeks: new.interval_weeks,
            days_of_week: new.days_of_week,
            day_of_month: new.day_of_month,
            week_of_month: new.week_of_month,
            weekday: new.weekday,
            time_of_day: new.time_of_day,
            start_date: new.start_date,
            end_date: new.end_date,
            max_occurrences: new.max_occurrences,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn rule(pattern: RecurrencePattern) -> RecurrenceRule {
        RecurrenceRule::new(
            pattern,
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()),
            Some(12),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test_log::test]
    fn every_pattern_survives_the_row_round_trip() {
        use std::num::NonZeroU32;

        let rules = vec![
            rule(RecurrencePattern::Daily),
            rule(RecurrencePattern::Weekly {
                days: WeekdaySet::from_indices(&[1, 3, 5]).unwrap(),
            }),
            rule(RecurrencePattern::Biweekly {
                weekday: Weekday::Tue,
            }),
            rule(RecurrencePattern::MonthlyByDay { day: 28 }),
            rule(RecurrencePattern::MonthlyByWeekday {
                week: MonthWeek::Last,
                weekday: Weekday::Fri,
            }),
            rule(RecurrencePattern::EveryNWeeks {
                interval: NonZeroU32::new(3).unwrap(),
                days: WeekdaySet::from_indices(&[2, 4]).unwrap(),
            }),
        ];

        for original in rules {
            let row = row_from_new(
                new_series_row(uuid::Uuid::now_v7(), parties(), &original).unwrap(),
            );
            let restored = rule_from_series(&row).unwrap();
            assert_eq!(restored, original, "pattern {}", row.pattern);
        }
    }

    #[test_log::test]
    fn underspecified_rows_are_rejected_not_silently_empty() {
        let base = row_from_new(
            new_series_row(
                uuid::Uuid::now_v7(),
                parties(),
                &rule(RecurrencePattern::Weekly {
                    days: WeekdaySet::from_indices(&[1]).unwrap(),
                }),
            )
            .unwrap(),
        );

        let mut weekly_without_days = base.clone();
        weekly_without_days.days_of_week = None;
        assert!(rule_from_series(&weekly_without_days).is_err());

        let mut monthly_without_selector = base.clone();
        monthly_without_selector.pattern = PatternKind::MonthlyByWeekday;
        monthly_without_selector.week_of_month = None;
        monthly_without_selector.weekday = None;
        assert!(rule_from_series(&monthly_without_selector).is_err());

        let mut zero_interval = base;
        zero_interval.pattern = PatternKind::EveryNWeeks;
        zero_interval.interval_weeks = Some(0);
        assert!(rule_from_series(&zero_interval).is_err());
    }

    #[test]
    fn occurrence_rows_preserve_numbering_and_start_pending() {
        let occurrences = chairside_core::recurrence::expand(&rule(RecurrencePattern::Daily));
        let series_id = uuid::Uuid::now_v7();
        let rows = new_occurrence_rows(series_id, &occurrences).unwrap();

        assert_eq!(rows.len(), occurrences.len());
        for (row, occurrence) in rows.iter().zip(&occurrences) {
            assert_eq!(row.series_id, series_id);
            assert_eq!(row.occurrence_number, i32::try_from(occurrence.number).unwrap());
            assert_eq!(row.scheduled_date, occurrence.date);
            assert_eq!(row.scheduled_time, occurrence.time);
            assert_eq!(row.status, OccurrenceStatus::Pending);
        }
    }
}
