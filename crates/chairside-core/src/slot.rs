//! Half-open time intervals for appointment windows.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// A half-open interval `[start, end)` on the UTC timeline.
///
/// Instants are supplied by the caller already in the clinic's local terms;
/// no timezone conversion happens here or anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    /// ## Summary
    /// Creates a time slot, enforcing `start < end`.
    ///
    /// ## Errors
    /// Returns a validation error for empty or inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start >= end {
            return Err(CoreError::ValidationError(format!(
                "time slot must start before it ends (start={start}, end={end})"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// ## Summary
    /// Whether two half-open intervals intersect.
    ///
    /// Covers all three containment cases (overlap at the start, overlap at
    /// the end, full containment either way); back-to-back slots sharing a
    /// boundary instant do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeSlot {
        TimeSlot::new(
            Utc.with_ymd_and_hms(2025, 3, 10, start_h, start_m, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, end_h, end_m, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_slots() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert!(TimeSlot::new(at, at).is_err());
        assert!(TimeSlot::new(at, at - TimeDelta::minutes(5)).is_err());
    }

    #[test]
    fn partial_overlap_is_detected() {
        // Existing 10:00-10:30 vs proposed 10:15-10:45
        let existing = slot(10, 0, 10, 30);
        let proposed = slot(10, 15, 10, 45);
        assert!(existing.overlaps(&proposed));
        assert!(proposed.overlaps(&existing));
    }

    #[test]
    fn back_to_back_slots_do_not_overlap() {
        // Existing 10:00-10:30 vs proposed 10:30-11:00
        let existing = slot(10, 0, 10, 30);
        let proposed = slot(10, 30, 11, 0);
        assert!(!existing.overlaps(&proposed));
        assert!(!proposed.overlaps(&existing));
    }

    #[test]
    fn containment_overlaps_both_ways() {
        let outer = slot(9, 0, 12, 0);
        let inner = slot(10, 0, 10, 30);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn duration_is_end_minus_start() {
        assert_eq!(slot(10, 0, 10, 45).duration(), TimeDelta::minutes(45));
    }
}
