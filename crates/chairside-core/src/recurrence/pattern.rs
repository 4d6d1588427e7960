//! Recurrence rule types.
//!
//! Each pattern variant carries only the fields it needs, so an
//! underspecified rule (e.g. a monthly pattern with no day selector) cannot
//! be constructed in the first place. Validation happens when a rule is
//! built, not when it is expanded.

use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveTime, Weekday};

use crate::constants::{DEFAULT_EXPANSION_HORIZON_DAYS, DEFAULT_MAX_OCCURRENCES};
use crate::error::{CoreError, CoreResult};

/// Weekday indices use the clinic wire convention: 0 = Sunday .. 6 = Saturday.
///
/// ## Errors
/// Returns an error for indices outside 0..=6.
pub fn weekday_from_index(index: u8) -> CoreResult<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(CoreError::InvalidInput(format!(
            "weekday index out of range: {index}"
        ))),
    }
}

/// Inverse of [`weekday_from_index`].
#[must_use]
pub const fn weekday_index(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// ## Summary
/// Parses a wall-clock time string, accepting `HH:MM` and `HH:MM:SS`.
///
/// Times are carried opaquely through the whole system; no timezone
/// interpretation happens here.
///
/// ## Errors
/// Returns an error if the string matches neither format.
pub fn parse_time_of_day(value: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| CoreError::InvalidInput(format!("invalid wall-clock time: {value}")))
}

/// Non-empty set of weekdays a weekly-family pattern fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// ## Summary
    /// Builds a set from wire indices (0 = Sunday .. 6 = Saturday).
    ///
    /// ## Errors
    /// Returns an error for out-of-range indices or an empty set.
    pub fn from_indices(indices: &[u8]) -> CoreResult<Self> {
        let mut bits = 0u8;
        for &index in indices {
            weekday_from_index(index)?;
            bits |= 1 << index;
        }
        if bits == 0 {
            return Err(CoreError::ValidationError(
                "weekday set must not be empty".to_string(),
            ));
        }
        Ok(Self(bits))
    }

    /// ## Summary
    /// Builds a set from weekdays.
    ///
    /// ## Errors
    /// Returns an error if the iterator yields no weekdays.
    pub fn from_weekdays(weekdays: impl IntoIterator<Item = Weekday>) -> CoreResult<Self> {
        let indices: Vec<u8> = weekdays.into_iter().map(weekday_index).collect();
        Self::from_indices(&indices)
    }

    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday_index(weekday)) != 0
    }

    /// Wire indices in ascending order.
    #[must_use]
    pub fn indices(self) -> Vec<u8> {
        (0..=6u8).filter(|index| self.0 & (1 << index) != 0).collect()
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        // Construction rejects empty sets; kept for the len/is_empty pair
        self.0 == 0
    }
}

/// Which occurrence of a weekday within a month a monthly pattern targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthWeek {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl MonthWeek {
    /// ## Summary
    /// Builds from the wire encoding: 1..=4, or -1 for "last".
    ///
    /// ## Errors
    /// Returns an error for any other value.
    pub fn from_index(index: i8) -> CoreResult<Self> {
        match index {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            -1 => Ok(Self::Last),
            _ => Err(CoreError::InvalidInput(format!(
                "week-of-month out of range: {index}"
            ))),
        }
    }

    #[must_use]
    pub const fn as_index(self) -> i8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }

    /// 1-based ordinal for the counted variants, `None` for [`Self::Last`].
    #[must_use]
    pub const fn ordinal(self) -> Option<u8> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }
}

/// The rule family governing which dates a series selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrencePattern {
    /// Every walked date.
    Daily,
    /// Dates whose weekday is in the set.
    Weekly { days: WeekdaySet },
    /// The preferred weekday on even elapsed weeks since the start date.
    Biweekly { weekday: Weekday },
    /// A fixed day of month; months without that day contribute nothing.
    MonthlyByDay { day: u8 },
    /// The nth (or last) occurrence of a weekday in each month.
    MonthlyByWeekday { week: MonthWeek, weekday: Weekday },
    /// Weekday set applied every `interval` weeks since the start date.
    EveryNWeeks { interval: NonZeroU32, days: WeekdaySet },
}

impl RecurrencePattern {
    /// ## Summary
    /// Checks field ranges the type system does not already enforce.
    ///
    /// ## Errors
    /// Returns an error for a day-of-month outside 1..=31.
    pub fn validate(&self) -> CoreResult<()> {
        if let Self::MonthlyByDay { day } = self {
            if !(1..=31).contains(day) {
                return Err(CoreError::ValidationError(format!(
                    "day-of-month out of range: {day}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Biweekly { .. } => "biweekly",
            Self::MonthlyByDay { .. } => "monthly_by_day",
            Self::MonthlyByWeekday { .. } => "monthly_by_weekday",
            Self::EveryNWeeks { .. } => "every_n_weeks",
        }
    }
}

/// A validated recurrence rule: a pattern plus its date bounds, occurrence
/// cap, and the wall-clock time every occurrence is scheduled at.
///
/// Fields are private so a constructed rule is always internally consistent;
/// expansion never needs to re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pattern: RecurrencePattern,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    max_occurrences: Option<u32>,
    time_of_day: NaiveTime,
}

impl RecurrenceRule {
    /// ## Summary
    /// Builds a rule, rejecting underspecified or out-of-range input with an
    /// explicit error rather than deferring to an empty expansion.
    ///
    /// ## Errors
    /// Returns a validation error when the pattern fields are out of range,
    /// the end date precedes the start date, or the occurrence cap is zero.
    pub fn new(
        pattern: RecurrencePattern,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        max_occurrences: Option<u32>,
        time_of_day: NaiveTime,
    ) -> CoreResult<Self> {
        pattern.validate()?;

        if let Some(end) = end_date {
            if end < start_date {
                return Err(CoreError::ValidationError(format!(
                    "end date {end} precedes start date {start_date}"
                )));
            }
        }

        if max_occurrences == Some(0) {
            return Err(CoreError::ValidationError(
                "max occurrences must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            pattern,
            start_date,
            end_date,
            max_occurrences,
            time_of_day,
        })
    }

    #[must_use]
    pub const fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    #[must_use]
    pub const fn max_occurrences(&self) -> Option<u32> {
        self.max_occurrences
    }

    #[must_use]
    pub const fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// Inclusive upper date bound: the explicit end date, or the safety
    /// horizon past the start date when none was supplied.
    #[must_use]
    pub fn effective_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| {
            self.start_date
                .checked_add_days(chrono::Days::new(DEFAULT_EXPANSION_HORIZON_DAYS))
                .unwrap_or(NaiveDate::MAX)
        })
    }

    /// Occurrence cap: the explicit cap, or the safety default.
    #[must_use]
    pub fn effective_max_occurrences(&self) -> u32 {
        self.max_occurrences.unwrap_or(DEFAULT_MAX_OCCURRENCES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_am() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 0, 0).unwrap()
    }

    #[test]
    fn weekday_indices_round_trip() {
        for index in 0..=6u8 {
            let weekday = weekday_from_index(index).unwrap();
            assert_eq!(weekday_index(weekday), index);
        }
        assert!(weekday_from_index(7).is_err());
    }

    #[test]
    fn weekday_index_follows_sunday_zero_convention() {
        assert_eq!(weekday_from_index(0).unwrap(), Weekday::Sun);
        assert_eq!(weekday_from_index(1).unwrap(), Weekday::Mon);
        assert_eq!(weekday_from_index(5).unwrap(), Weekday::Fri);
    }

    #[test]
    fn parses_wall_clock_times_with_and_without_seconds() {
        assert_eq!(
            parse_time_of_day("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("tenish").is_err());
    }

    #[test]
    fn weekday_set_rejects_empty_and_out_of_range() {
        assert!(WeekdaySet::from_indices(&[]).is_err());
        assert!(WeekdaySet::from_indices(&[7]).is_err());

        let set = WeekdaySet::from_indices(&[1, 3, 3]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.indices(), vec![1, 3]);
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(!set.contains(Weekday::Sun));

        assert_eq!(
            WeekdaySet::from_weekdays([Weekday::Mon, Weekday::Wed]).unwrap(),
            set
        );
    }

    #[test]
    fn month_week_wire_encoding_round_trips() {
        for index in [1i8, 2, 3, 4, -1] {
            assert_eq!(MonthWeek::from_index(index).unwrap().as_index(), index);
        }
        assert!(MonthWeek::from_index(0).is_err());
        assert!(MonthWeek::from_index(5).is_err());
        assert_eq!(MonthWeek::Last.ordinal(), None);
        assert_eq!(MonthWeek::Third.ordinal(), Some(3));
    }

    #[test]
    fn rule_rejects_day_of_month_out_of_range() {
        for day in [0u8, 32] {
            let result = RecurrenceRule::new(
                RecurrencePattern::MonthlyByDay { day },
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                None,
                None,
                ten_am(),
            );
            assert!(result.is_err(), "day {day} should be rejected");
        }
    }

    #[test]
    fn rule_rejects_inverted_date_bounds_and_zero_cap() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

        let inverted = RecurrenceRule::new(
            RecurrencePattern::Daily,
            start,
            Some(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()),
            None,
            ten_am(),
        );
        assert!(inverted.is_err());

        let zero_cap =
            RecurrenceRule::new(RecurrencePattern::Daily, start, None, Some(0), ten_am());
        assert!(zero_cap.is_err());
    }

    #[test]
    fn effective_bounds_fall_back_to_safety_defaults() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rule = RecurrenceRule::new(RecurrencePattern::Daily, start, None, None, ten_am())
            .unwrap();

        assert_eq!(
            rule.effective_end_date(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert_eq!(rule.effective_max_occurrences(), 52);

        let bounded = RecurrenceRule::new(
            RecurrencePattern::Daily,
            start,
            Some(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()),
            Some(10),
            ten_am(),
        )
        .unwrap();
        assert_eq!(
            bounded.effective_end_date(),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
        assert_eq!(bounded.effective_max_occurrences(), 10);
    }
}
