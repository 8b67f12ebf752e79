use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumMessage;

/// Named reporting period, always anchored at "yesterday".
///
/// Parses from and serializes to the wire names (`wtd`, `lastMonth`, ...);
/// `Display` shows the human label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    Serialize,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
    strum::EnumMessage,
)]
#[strum(parse_err_ty = crate::Error, parse_err_fn = invalid_period)]
pub enum PeriodType {
    #[default]
    #[serde(rename = "wtd")]
    #[strum(serialize = "wtd", message = "Week to date")]
    WeekToDate,
    #[serde(rename = "mtd")]
    #[strum(serialize = "mtd", message = "Month to date")]
    MonthToDate,
    #[serde(rename = "qtd")]
    #[strum(serialize = "qtd", message = "Quarter to date")]
    QuarterToDate,
    #[serde(rename = "lastDay")]
    #[strum(serialize = "lastDay", message = "Last day")]
    LastDay,
    #[serde(rename = "lastWeek")]
    #[strum(serialize = "lastWeek", message = "Last week")]
    LastWeek,
    #[serde(rename = "lastMonth")]
    #[strum(serialize = "lastMonth", message = "Last month")]
    LastMonth,
    #[serde(rename = "rolling7")]
    #[strum(serialize = "rolling7", message = "Rolling 7 days")]
    Rolling7,
    #[serde(rename = "rolling14")]
    #[strum(serialize = "rolling14", message = "Rolling 14 days")]
    Rolling14,
    #[serde(rename = "rolling28")]
    #[strum(serialize = "rolling28", message = "Rolling 28 days")]
    Rolling28,
}

fn invalid_period(s: &str) -> crate::Error {
    crate::Error::InvalidPeriodType(s.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodCategory {
    /// From the start of the running cycle through yesterday.
    ToDate,
    /// The last fully finished cycle.
    Complete,
    /// Fixed number of trailing days ending yesterday.
    Rolling,
}

impl PeriodType {
    pub fn category(&self) -> PeriodCategory {
        match self {
            PeriodType::WeekToDate | PeriodType::MonthToDate | PeriodType::QuarterToDate => {
                PeriodCategory::ToDate
            }
            PeriodType::LastDay | PeriodType::LastWeek | PeriodType::LastMonth => {
                PeriodCategory::Complete
            }
            PeriodType::Rolling7 | PeriodType::Rolling14 | PeriodType::Rolling28 => {
                PeriodCategory::Rolling
            }
        }
    }

    /// Window length of a rolling period.
    pub fn rolling_days(&self) -> Option<i64> {
        match self {
            PeriodType::Rolling7 => Some(7),
            PeriodType::Rolling14 => Some(14),
            PeriodType::Rolling28 => Some(28),
            _ => None,
        }
    }

    /// Whether the data source may express this period with a native
    /// "last N days" filter instead of explicit bounds.
    pub fn relative_date(&self) -> Option<RelativeDate> {
        self.rolling_days().map(|n| RelativeDate {
            unit: RelativeUnit::Days,
            range: RelativeRange::LastN(n),
        })
    }

    /// Wire name, as stored in settings and sent to the host.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn label(&self) -> &'static str {
        self.get_message().unwrap_or_else(|| self.as_str())
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeDate {
    pub unit: RelativeUnit,
    pub range: RelativeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeUnit {
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeRange {
    LastN(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for period in PeriodType::iter() {
            assert_eq!(period.as_str().parse::<PeriodType>().unwrap(), period);
        }
    }

    #[test]
    fn unknown_period_is_rejected() {
        let err = "daily".parse::<PeriodType>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidPeriodType(ref s) if s == "daily"));
        assert_eq!(err.to_string(), "Unknown period type: daily");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("MTD".parse::<PeriodType>().is_err());
    }

    #[test]
    fn labels_are_not_wire_names() {
        assert_eq!(PeriodType::Rolling14.to_string(), "Rolling 14 days");
        assert_eq!(PeriodType::Rolling14.as_str(), "rolling14");
        assert!("Rolling 14 days".parse::<PeriodType>().is_err());
        assert_eq!(PeriodType::iter().count(), 9);
    }

    #[test]
    fn serde_matches_wire_names() {
        let json = serde_json::to_string(&PeriodType::LastMonth).unwrap();
        assert_eq!(json, "\"lastMonth\"");
        let back: PeriodType = serde_json::from_str("\"rolling14\"").unwrap();
        assert_eq!(back, PeriodType::Rolling14);
        assert!(serde_json::from_str::<PeriodType>("\"ytd\"").is_err());
    }

    #[test]
    fn categories_split_three_ways() {
        let count = |c| {
            PeriodType::iter()
                .filter(|p| p.category() == c)
                .count()
        };
        assert_eq!(count(PeriodCategory::ToDate), 3);
        assert_eq!(count(PeriodCategory::Complete), 3);
        assert_eq!(count(PeriodCategory::Rolling), 3);
    }

    #[test]
    fn only_rolling_periods_have_relative_dates() {
        assert_eq!(
            PeriodType::Rolling28.relative_date(),
            Some(RelativeDate {
                unit: RelativeUnit::Days,
                range: RelativeRange::LastN(28),
            })
        );
        assert_eq!(PeriodType::LastWeek.relative_date(), None);
        assert_eq!(PeriodType::MonthToDate.relative_date(), None);
    }
}
