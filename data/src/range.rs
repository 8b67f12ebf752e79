use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{PeriodType, Timezone};

const ISO_DATE: &str = "%Y-%m-%d";

pub fn days(n: i64) -> TimeDelta {
    TimeDelta::days(n)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - days(i64::from(date.day0()))
}

/// First day of the January-based calendar quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let mut start = month_start(date);
    while start.month0() % 3 != 0 {
        start = month_start(start - days(1));
    }
    start
}

pub fn days_in_month(date: NaiveDate) -> i64 {
    let start = month_start(date);
    // any month is at most 31 days long, so +32 always lands in the next one
    let next = month_start(start + days(32));
    (next - start).num_days()
}

pub fn days_in_quarter(date: NaiveDate) -> i64 {
    let start = quarter_start(date);
    let next = quarter_start(start + days(93));
    (next - start).num_days()
}

/// Inclusive range of whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        debug_assert!(min <= max, "date range {min}..={max} is inverted");
        Self { min, max }
    }

    /// Bounds used to filter the data source for `period`, relative to `yesterday`.
    ///
    /// Period-to-date types span two cycles so the caller can later split them
    /// into "this cycle so far" and "last cycle so far". `LastDay` covers the
    /// trailing seven days ending yesterday, not a single day; existing filters
    /// depend on that width.
    pub fn for_period(period: PeriodType, yesterday: NaiveDate) -> Self {
        match period {
            PeriodType::WeekToDate => Self::new(week_start(yesterday) - days(7), yesterday),
            PeriodType::MonthToDate => {
                let previous_month_start = month_start(month_start(yesterday) - days(1));
                Self::new(previous_month_start, yesterday)
            }
            PeriodType::QuarterToDate => {
                let previous_quarter_start = quarter_start(quarter_start(yesterday) - days(1));
                Self::new(previous_quarter_start, yesterday)
            }
            PeriodType::LastDay => Self::new(yesterday - days(6), yesterday),
            PeriodType::LastWeek => {
                let this_week = week_start(yesterday);
                Self::new(this_week - days(14), this_week - days(1))
            }
            PeriodType::LastMonth => {
                let last_month_end = month_start(yesterday) - days(1);
                let last_month_start = month_start(last_month_end);
                let two_months_ago_start = month_start(last_month_start - days(1));
                Self::new(two_months_ago_start, last_month_end)
            }
            PeriodType::Rolling7 => Self::new(yesterday - days(13), yesterday),
            PeriodType::Rolling14 => Self::new(yesterday - days(27), yesterday),
            PeriodType::Rolling28 => Self::new(yesterday - days(55), yesterday),
        }
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.max - self.min).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let max = self.max;
        self.min.iter_days().take_while(move |d| *d <= max)
    }

    /// 1-based position of `date` inside the range, if it falls inside.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.min).num_days() as usize + 1)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..={}",
            self.min.format(ISO_DATE),
            self.max.format(ISO_DATE)
        )
    }
}

pub fn calculate_date_range_at(
    period: PeriodType,
    timezone: Timezone,
    now: DateTime<Utc>,
) -> DateRange {
    let yesterday = timezone.yesterday_at(now);
    let range = DateRange::for_period(period, yesterday);

    log::debug!("Resolved {} range in {timezone}: {range}", period.as_str());
    range
}

pub fn calculate_date_range(period: PeriodType, timezone: Timezone) -> DateRange {
    calculate_date_range_at(period, timezone, Utc::now())
}

/// Range filter a data source applies before rows are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub field: String,
    pub period: PeriodType,
    pub range: DateRange,
}

impl RangeFilter {
    pub fn for_period_at(
        field: &str,
        period: PeriodType,
        timezone: Timezone,
        now: DateTime<Utc>,
    ) -> Result<Self, crate::Error> {
        let field = field.trim();
        if field.is_empty() {
            return Err(crate::Error::MissingFilterField);
        }

        let range = calculate_date_range_at(period, timezone, now);
        log::info!(
            "Range filter on '{field}' for {}: {range}",
            period.as_str()
        );

        Ok(Self {
            field: field.to_string(),
            period,
            range,
        })
    }

    pub fn for_period(
        field: &str,
        period: PeriodType,
        timezone: Timezone,
    ) -> Result<Self, crate::Error> {
        Self::for_period_at(field, period, timezone, Utc::now())
    }

    /// Builds a filter from the raw strings a settings store hands over.
    pub fn parse(field: &str, period: &str, timezone: Timezone) -> Result<Self, crate::Error> {
        let period = period.parse::<PeriodType>()?;
        Self::for_period(field, period, timezone)
    }

    pub fn bounds_iso(&self) -> (String, String) {
        (
            self.range.min.format(ISO_DATE).to_string(),
            self.range.max.format(ISO_DATE).to_string(),
        )
    }
}
