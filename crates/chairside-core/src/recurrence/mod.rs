//! Recurrence patterns for repeating visits and their expansion into
//! concrete calendar occurrences.

mod expand;
mod pattern;

pub use expand::{Occurrence, expand};
pub use pattern::{
    MonthWeek, RecurrencePattern, RecurrenceRule, WeekdaySet, parse_time_of_day,
    weekday_from_index, weekday_index,
};
