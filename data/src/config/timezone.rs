use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: i32 = 3600;

/// Reporting timezone used to decide which calendar day is "yesterday".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::EnumIter, strum::IntoStaticStr,
)]
pub enum Timezone {
    #[default]
    #[strum(serialize = "UTC")]
    Utc,
    #[strum(serialize = "JST")]
    Jst,
}

impl Timezone {
    pub fn offset_hours(&self) -> i32 {
        match self {
            Timezone::Utc => 0,
            Timezone::Jst => 9,
        }
    }

    pub fn fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_hours() * SECONDS_PER_HOUR)
            .unwrap_or_else(|| Utc.fix())
    }

    /// The most recent fully completed calendar day in this timezone, as seen at `now`.
    pub fn yesterday_at(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.with_timezone(&self.fixed_offset()).date_naive();
        today - TimeDelta::days(1)
    }

    pub fn yesterday(&self) -> NaiveDate {
        self.yesterday_at(Utc::now())
    }

    fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timezone::Utc => write!(f, "UTC"),
            Timezone::Jst => {
                let hours = self.offset_hours();
                write!(f, "JST (UTC{hours:+03}:00)")
            }
        }
    }
}

impl FromStr for Timezone {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utc" => Ok(Timezone::Utc),
            "jst" => Ok(Timezone::Jst),
            _ => Err(crate::Error::InvalidTimezone(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let timezone_str = String::deserialize(deserializer)?;
        timezone_str
            .parse()
            .map_err(|_| serde::de::Error::custom("Invalid Timezone"))
    }
}

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
