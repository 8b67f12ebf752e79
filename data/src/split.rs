use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::range::{
    DateRange, days, days_in_month, days_in_quarter, month_start, quarter_start, week_start,
};
use crate::util::short_date;
use crate::{PeriodCategory, PeriodType, Timezone};

/// Current and comparison windows of matching shape, plus x-axis alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSplit {
    pub period: PeriodType,
    pub comparison_range: DateRange,
    pub current_range: DateRange,
    /// Calendar length of the current cycle; the chart's x-axis spans `1..=total_days`.
    pub total_days: usize,
    /// 1-based position of the anchor day inside the current cycle.
    pub yesterday_index: usize,
    pub yesterday_label: String,
}

impl ComparisonSplit {
    /// `None` for [`PeriodType::LastDay`], which has no day-by-day comparison.
    pub fn for_period(period: PeriodType, yesterday: NaiveDate) -> Option<Self> {
        match period.category() {
            PeriodCategory::ToDate => Some(Self::to_date(period, yesterday)),
            PeriodCategory::Complete => Self::complete(period, yesterday),
            PeriodCategory::Rolling => period
                .rolling_days()
                .map(|n| Self::rolling(period, yesterday, n)),
        }
    }

    fn to_date(period: PeriodType, yesterday: NaiveDate) -> Self {
        let (cycle_start, previous_start, total_days) = match period {
            PeriodType::MonthToDate => {
                let start = month_start(yesterday);
                (start, month_start(start - days(1)), days_in_month(yesterday))
            }
            PeriodType::QuarterToDate => {
                let start = quarter_start(yesterday);
                (
                    start,
                    quarter_start(start - days(1)),
                    days_in_quarter(yesterday),
                )
            }
            _ => {
                let start = week_start(yesterday);
                (start, start - days(7), 7)
            }
        };

        let offset = (yesterday - cycle_start).num_days();
        // the previous cycle can be shorter (31 Mar vs February)
        let comparison_end = (previous_start + days(offset)).min(cycle_start - days(1));

        Self {
            period,
            comparison_range: DateRange::new(previous_start, comparison_end),
            current_range: DateRange::new(cycle_start, yesterday),
            total_days: total_days as usize,
            yesterday_index: offset as usize + 1,
            yesterday_label: short_date(yesterday),
        }
    }

    fn complete(period: PeriodType, yesterday: NaiveDate) -> Option<Self> {
        let (current, comparison) = match period {
            PeriodType::LastWeek => {
                let this_week = week_start(yesterday);
                (
                    DateRange::new(this_week - days(7), this_week - days(1)),
                    DateRange::new(this_week - days(14), this_week - days(8)),
                )
            }
            PeriodType::LastMonth => {
                let current_end = month_start(yesterday) - days(1);
                let current_start = month_start(current_end);
                let length = days_in_month(current_start);
                let previous_end = current_start - days(1);
                // a shorter previous month (February) is taken whole
                let previous_start =
                    (previous_end - days(length - 1)).max(month_start(previous_end));
                (
                    DateRange::new(current_start, current_end),
                    DateRange::new(previous_start, previous_end),
                )
            }
            _ => return None,
        };

        let total_days = current.days() as usize;

        Some(Self {
            period,
            comparison_range: comparison,
            current_range: current,
            total_days,
            yesterday_index: total_days,
            yesterday_label: short_date(current.max),
        })
    }

    fn rolling(period: PeriodType, yesterday: NaiveDate, n: i64) -> Self {
        let current_start = yesterday - days(n - 1);
        let comparison_end = current_start - days(1);

        Self {
            period,
            comparison_range: DateRange::new(comparison_end - days(n - 1), comparison_end),
            current_range: DateRange::new(current_start, yesterday),
            total_days: n as usize,
            yesterday_index: n as usize,
            yesterday_label: short_date(yesterday),
        }
    }
}

pub fn split_comparison_and_current_ranges_at(
    period: PeriodType,
    timezone: Timezone,
    now: DateTime<Utc>,
) -> Option<ComparisonSplit> {
    let yesterday = timezone.yesterday_at(now);
    let split = ComparisonSplit::for_period(period, yesterday);

    match &split {
        Some(s) => log::debug!(
            "Split {}: comparison {} / current {} ({} days, anchor #{})",
            period.as_str(),
            s.comparison_range,
            s.current_range,
            s.total_days,
            s.yesterday_index
        ),
        None => log::debug!("No comparison windows for {}", period.as_str()),
    }

    split
}

pub fn split_comparison_and_current_ranges(
    period: PeriodType,
    timezone: Timezone,
) -> Option<ComparisonSplit> {
    split_comparison_and_current_ranges_at(period, timezone, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn split(period: PeriodType, yesterday: NaiveDate) -> ComparisonSplit {
        ComparisonSplit::for_period(period, yesterday).unwrap()
    }

    #[test]
    fn month_to_date_example() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let s = split_comparison_and_current_ranges_at(PeriodType::MonthToDate, Timezone::Utc, now)
            .unwrap();

        assert_eq!(
            s.current_range,
            DateRange::new(date(2024, 3, 1), date(2024, 3, 14))
        );
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 2, 1), date(2024, 2, 14))
        );
        assert_eq!(s.total_days, 31);
        assert_eq!(s.yesterday_index, 14);
        assert_eq!(s.yesterday_label, "3/14");
        assert_eq!(s.period, PeriodType::MonthToDate);
    }

    #[test]
    fn rolling7_windows_are_back_to_back() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let s = split_comparison_and_current_ranges_at(PeriodType::Rolling7, Timezone::Utc, now)
            .unwrap();

        assert_eq!(s.current_range.days(), 7);
        assert_eq!(s.comparison_range.days(), 7);
        assert_eq!(s.comparison_range.max + days(1), s.current_range.min);
        assert_eq!(s.current_range.max, date(2024, 3, 14));
        assert_eq!(s.total_days, 7);
        assert_eq!(s.yesterday_index, 7);
    }

    #[test]
    fn week_to_date_on_wednesday() {
        // 2024-03-13 is a Wednesday
        let s = split(PeriodType::WeekToDate, date(2024, 3, 13));
        assert_eq!(s.total_days, 7);
        assert_eq!(s.yesterday_index, 3);
        assert_eq!(
            s.current_range,
            DateRange::new(date(2024, 3, 11), date(2024, 3, 13))
        );
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 3, 4), date(2024, 3, 6))
        );
    }

    #[test]
    fn week_to_date_index_matches_iso_weekday() {
        let monday = date(2024, 3, 11);
        for offset in 0..7 {
            let y = monday + days(offset);
            let s = split(PeriodType::WeekToDate, y);
            assert_eq!(s.yesterday_index as u32, y.weekday().number_from_monday());
        }
    }

    #[test]
    fn last_day_has_no_split() {
        for timezone in Timezone::iter() {
            assert!(split_comparison_and_current_ranges(PeriodType::LastDay, timezone).is_none());
        }
    }

    #[test]
    fn month_to_date_clamps_comparison_to_shorter_month() {
        let s = split(PeriodType::MonthToDate, date(2024, 3, 31));
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(s.yesterday_index, 31);
    }

    #[test]
    fn quarter_to_date_uses_current_quarter_length() {
        let s = split(PeriodType::QuarterToDate, date(2024, 5, 10));
        assert_eq!(s.current_range.min, date(2024, 4, 1));
        assert_eq!(s.comparison_range.min, date(2024, 1, 1));
        assert_eq!(s.comparison_range.max, date(2024, 2, 9));
        assert_eq!(s.total_days, 91);
        assert_eq!(s.yesterday_index, 40);
    }

    #[test]
    fn last_week_is_a_complete_monday_to_sunday_week() {
        let s = split(PeriodType::LastWeek, date(2024, 3, 14));
        assert_eq!(
            s.current_range,
            DateRange::new(date(2024, 3, 4), date(2024, 3, 10))
        );
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 2, 26), date(2024, 3, 3))
        );
        assert_eq!(s.yesterday_index, 7);
        assert_eq!(s.yesterday_label, "3/10");
    }

    #[test]
    fn last_month_comparison_ends_the_day_before() {
        // current = April (30 days), comparison = the last 30 days of March
        let s = split(PeriodType::LastMonth, date(2024, 5, 10));
        assert_eq!(
            s.current_range,
            DateRange::new(date(2024, 4, 1), date(2024, 4, 30))
        );
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 3, 2), date(2024, 3, 31))
        );
        assert_eq!(s.comparison_range.max + days(1), s.current_range.min);
        assert_eq!(s.total_days, 30);
        assert_eq!(s.yesterday_index, 30);

        // current = February (29 days), comparison = the last 29 days of January
        let s = split(PeriodType::LastMonth, date(2024, 3, 5));
        assert_eq!(s.total_days, 29);
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 1, 3), date(2024, 1, 31))
        );
    }

    #[test]
    fn last_month_takes_a_shorter_previous_month_whole() {
        // current = March (31 days), comparison = all of February
        let s = split(PeriodType::LastMonth, date(2024, 4, 5));
        assert_eq!(
            s.current_range,
            DateRange::new(date(2024, 3, 1), date(2024, 3, 31))
        );
        assert_eq!(
            s.comparison_range,
            DateRange::new(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(s.total_days, 31);
        assert_eq!(s.yesterday_index, 31);
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..20_000).prop_map(|offset| date(1990, 1, 1) + days(offset))
    }

    proptest! {
        #[test]
        fn windows_never_overlap_and_fit_the_fetched_range(y in any_date()) {
            for period in PeriodType::iter() {
                let Some(s) = ComparisonSplit::for_period(period, y) else {
                    prop_assert_eq!(period, PeriodType::LastDay);
                    continue;
                };
                let fetched = DateRange::for_period(period, y);

                prop_assert!(s.comparison_range.max < s.current_range.min);
                prop_assert!(fetched.contains(s.comparison_range.min));
                prop_assert!(fetched.contains(s.current_range.max));
                prop_assert!(s.current_range.days() as usize <= s.total_days);
                prop_assert!(s.comparison_range.days() as usize <= s.total_days);
                prop_assert!((1..=s.total_days).contains(&s.yesterday_index));
            }
        }

        #[test]
        fn complete_windows_are_adjacent_and_span_the_cycle(y in any_date()) {
            for period in [PeriodType::LastWeek, PeriodType::LastMonth] {
                let s = ComparisonSplit::for_period(period, y).unwrap();
                prop_assert_eq!(s.comparison_range.max + days(1), s.current_range.min);
                prop_assert_eq!(s.current_range.days() as usize, s.total_days);
                prop_assert_eq!(s.yesterday_index, s.total_days);
                prop_assert!(s.current_range.max < y + days(1));

                let comparison = s.comparison_range.days() as usize;
                if period == PeriodType::LastWeek {
                    prop_assert_eq!(comparison, 7);
                } else {
                    // equal length unless the previous month is shorter
                    let previous_month = days_in_month(s.comparison_range.max) as usize;
                    prop_assert_eq!(comparison, s.total_days.min(previous_month));
                }
            }
        }

        #[test]
        fn rolling_windows_have_equal_length(y in any_date()) {
            for period in [PeriodType::Rolling7, PeriodType::Rolling14, PeriodType::Rolling28] {
                let s = ComparisonSplit::for_period(period, y).unwrap();
                prop_assert_eq!(s.current_range.days() as usize, s.total_days);
                prop_assert_eq!(s.comparison_range.days() as usize, s.total_days);
                prop_assert_eq!(s.comparison_range.max + days(1), s.current_range.min);
                prop_assert_eq!(s.current_range.max, y);
            }
        }
    }
}
