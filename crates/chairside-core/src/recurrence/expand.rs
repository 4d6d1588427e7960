//! Occurrence expansion: walking a rule's date window one day at a time.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use super::pattern::{MonthWeek, RecurrencePattern, RecurrenceRule};

/// One concrete calendar instance produced from a rule, prior to becoming a
/// real appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based position within the series.
    pub number: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// ## Summary
/// Expands a rule into its ordered occurrence sequence.
///
/// Walks one calendar day per iteration from the start date, stopping at the
/// effective end date or the occurrence cap, whichever is hit first. The walk
/// visits each date exactly once, so the output is ascending and free of
/// duplicates by construction. Deterministic: no clock is read anywhere.
///
/// Cost is linear in the span of days walked, not in occurrences produced.
#[must_use]
pub fn expand(rule: &RecurrenceRule) -> Vec<Occurrence> {
    let end = rule.effective_end_date();
    let cap = rule.effective_max_occurrences();

    let mut occurrences = Vec::new();
    let mut count: u32 = 0;
    let mut date = rule.start_date();

    while date <= end && count < cap {
        if date_matches(rule.pattern(), rule.start_date(), date) {
            count += 1;
            occurrences.push(Occurrence {
                number: count,
                date,
                time: rule.time_of_day(),
            });
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }

    occurrences
}

fn date_matches(pattern: &RecurrencePattern, anchor: NaiveDate, date: NaiveDate) -> bool {
    match pattern {
        RecurrencePattern::Daily => true,
        RecurrencePattern::Weekly { days } => days.contains(date.weekday()),
        RecurrencePattern::Biweekly { weekday } => {
            date.weekday() == *weekday && nth_week_matches(anchor, date, 2)
        }
        RecurrencePattern::EveryNWeeks { interval, days } => {
            days.contains(date.weekday()) && nth_week_matches(anchor, date, interval.get())
        }
        RecurrencePattern::MonthlyByDay { day } => date.day() == u32::from(*day),
        RecurrencePattern::MonthlyByWeekday { week, weekday } => {
            monthly_weekday_target(date.year(), date.month(), *week, *weekday) == Some(date)
        }
    }
}

/// Whether `date` falls in a firing week of an every-Nth-week stride.
///
/// Weeks are counted as elapsed whole weeks since the anchor date, not ISO
/// weeks: an anchor on a Wednesday keeps Wednesday-to-Tuesday weeks.
fn nth_week_matches(anchor: NaiveDate, date: NaiveDate, stride: u32) -> bool {
    let elapsed_weeks = (date - anchor).num_days().div_euclid(7);
    elapsed_weeks.rem_euclid(i64::from(stride)) == 0
}

/// The nth (or last) occurrence of `weekday` within the given month.
fn monthly_weekday_target(
    year: i32,
    month: u32,
    week: MonthWeek,
    weekday: Weekday,
) -> Option<NaiveDate> {
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (weekday.num_days_from_sunday() + 7
        - first_of_month.weekday().num_days_from_sunday())
        % 7;
    let first_hit = first_of_month.checked_add_days(chrono::Days::new(u64::from(offset)))?;

    match week.ordinal() {
        // The first hit lands on day 1..=7, so the fourth hit is at most day 28
        Some(n) => first_hit.checked_add_days(chrono::Days::new(u64::from(n - 1) * 7)),
        None => {
            let mut hit = first_hit;
            while let Some(next) = hit.checked_add_days(chrono::Days::new(7)) {
                if next.month() != month {
                    break;
                }
                hit = next;
            }
            Some(hit)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::recurrence::pattern::WeekdaySet;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn rule(
        pattern: RecurrencePattern,
        start: NaiveDate,
        end: Option<NaiveDate>,
        max: Option<u32>,
    ) -> RecurrenceRule {
        RecurrenceRule::new(pattern, start, end, max, nine_am()).unwrap()
    }

    fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(|o| o.date).collect()
    }

    #[test]
    fn daily_includes_every_date_in_window() {
        let occurrences = expand(&rule(
            RecurrencePattern::Daily,
            date(2025, 1, 1),
            Some(date(2025, 1, 5)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            (1..=5).map(|d| date(2025, 1, d)).collect::<Vec<_>>()
        );
        assert_eq!(
            occurrences.iter().map(|o| o.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn weekly_fires_on_selected_weekdays_only() {
        // 2025-01-06 is a Monday
        let days = WeekdaySet::from_indices(&[1, 3]).unwrap();
        let occurrences = expand(&rule(
            RecurrencePattern::Weekly { days },
            date(2025, 1, 6),
            Some(date(2025, 1, 19)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![
                date(2025, 1, 6),
                date(2025, 1, 8),
                date(2025, 1, 13),
                date(2025, 1, 15),
            ]
        );
    }

    #[test]
    fn biweekly_takes_every_other_preferred_weekday() {
        // 2025-01-07 is a Tuesday
        let occurrences = expand(&rule(
            RecurrencePattern::Biweekly {
                weekday: Weekday::Tue,
            },
            date(2025, 1, 7),
            Some(date(2025, 2, 4)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![date(2025, 1, 7), date(2025, 1, 21), date(2025, 2, 4)]
        );
    }

    #[test]
    fn biweekly_weeks_are_anchored_at_the_start_date() {
        // Anchor Wednesday 2025-01-01; the first Tuesday (Jan 7) is still in
        // elapsed week 0, Jan 14 is week 1, Jan 21 week 2.
        let occurrences = expand(&rule(
            RecurrencePattern::Biweekly {
                weekday: Weekday::Tue,
            },
            date(2025, 1, 1),
            Some(date(2025, 1, 28)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![date(2025, 1, 7), date(2025, 1, 21)]
        );
    }

    #[test]
    fn monthly_by_day_skips_months_without_that_day() {
        let occurrences = expand(&rule(
            RecurrencePattern::MonthlyByDay { day: 31 },
            date(2025, 1, 1),
            Some(date(2025, 4, 30)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![date(2025, 1, 31), date(2025, 3, 31)]
        );
    }

    #[test]
    fn monthly_last_weekday_lands_on_the_final_in_month_hit() {
        // Last Friday of January 2025 is the 31st
        let occurrences = expand(&rule(
            RecurrencePattern::MonthlyByWeekday {
                week: MonthWeek::Last,
                weekday: Weekday::Fri,
            },
            date(2025, 1, 1),
            Some(date(2025, 1, 31)),
            None,
        ));

        assert_eq!(dates(&occurrences), vec![date(2025, 1, 31)]);
    }

    #[test]
    fn monthly_nth_weekday_counts_from_the_month_start() {
        // Second Tuesdays: 2025-01-14 and 2025-02-11
        let occurrences = expand(&rule(
            RecurrencePattern::MonthlyByWeekday {
                week: MonthWeek::Second,
                weekday: Weekday::Tue,
            },
            date(2025, 1, 1),
            Some(date(2025, 2, 28)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![date(2025, 1, 14), date(2025, 2, 11)]
        );
    }

    #[test]
    fn every_n_weeks_applies_the_stride_to_the_whole_day_set() {
        // Anchor Monday 2025-01-06, every 3rd week, Mondays and Fridays
        let days = WeekdaySet::from_indices(&[1, 5]).unwrap();
        let occurrences = expand(&rule(
            RecurrencePattern::EveryNWeeks {
                interval: NonZeroU32::new(3).unwrap(),
                days,
            },
            date(2025, 1, 6),
            Some(date(2025, 2, 28)),
            None,
        ));

        assert_eq!(
            dates(&occurrences),
            vec![
                date(2025, 1, 6),
                date(2025, 1, 10),
                date(2025, 1, 27),
                date(2025, 1, 31),
                date(2025, 2, 17),
                date(2025, 2, 21),
            ]
        );
    }

    #[test]
    fn unbounded_daily_rule_stops_at_the_occurrence_cap() {
        let occurrences = expand(&rule(RecurrencePattern::Daily, date(2025, 1, 1), None, None));

        assert_eq!(occurrences.len(), 52);
        assert_eq!(occurrences.last().unwrap().date, date(2025, 2, 21));
    }

    #[test]
    fn unbounded_weekly_rule_stops_at_the_horizon() {
        // Mondays from 2025-01-06 with no bounds: 13 Mondays fit in 90 days
        let days = WeekdaySet::from_indices(&[1]).unwrap();
        let occurrences = expand(&rule(
            RecurrencePattern::Weekly { days },
            date(2025, 1, 6),
            None,
            None,
        ));

        assert_eq!(occurrences.len(), 13);
        assert_eq!(occurrences.last().unwrap().date, date(2025, 3, 31));
    }

    #[test]
    fn explicit_cap_wins_over_the_date_window() {
        let occurrences = expand(&rule(
            RecurrencePattern::Daily,
            date(2025, 1, 1),
            Some(date(2025, 12, 31)),
            Some(3),
        ));

        assert_eq!(
            dates(&occurrences),
            vec![date(2025, 1, 1), date(2025, 1, 2), date(2025, 1, 3)]
        );
    }

    #[test]
    fn expansion_is_deterministic() {
        let r = rule(
            RecurrencePattern::Biweekly {
                weekday: Weekday::Thu,
            },
            date(2025, 6, 2),
            None,
            None,
        );
        assert_eq!(expand(&r), expand(&r));
    }

    #[test]
    fn every_expansion_is_ordered_numbered_and_in_bounds() {
        let rules = vec![
            rule(RecurrencePattern::Daily, date(2025, 1, 1), None, Some(10)),
            rule(
                RecurrencePattern::Weekly {
                    days: WeekdaySet::from_indices(&[0, 2, 4, 6]).unwrap(),
                },
                date(2025, 2, 14),
                Some(date(2025, 5, 1)),
                None,
            ),
            rule(
                RecurrencePattern::MonthlyByDay { day: 15 },
                date(2024, 11, 30),
                Some(date(2025, 6, 1)),
                None,
            ),
            rule(
                RecurrencePattern::MonthlyByWeekday {
                    week: MonthWeek::Last,
                    weekday: Weekday::Mon,
                },
                date(2025, 1, 1),
                None,
                None,
            ),
            rule(
                RecurrencePattern::EveryNWeeks {
                    interval: NonZeroU32::new(4).unwrap(),
                    days: WeekdaySet::from_indices(&[2]).unwrap(),
                },
                date(2025, 3, 5),
                None,
                None,
            ),
        ];

        for r in rules {
            let occurrences = expand(&r);
            for (position, occurrence) in occurrences.iter().enumerate() {
                assert_eq!(occurrence.number as usize, position + 1);
                assert!(occurrence.date >= r.start_date());
                assert!(occurrence.date <= r.effective_end_date());
                assert_eq!(occurrence.time, r.time_of_day());
            }
            for pair in occurrences.windows(2) {
                assert!(pair[0].date < pair[1].date, "dates must strictly increase");
            }
        }
    }
}
