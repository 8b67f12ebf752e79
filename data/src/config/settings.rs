use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, PeriodType, Timezone};

pub const SETTINGS_FILE: &str = "settings.json";

/// How an increase of the metric should be read.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum TrendMeaning {
    #[strum(to_string = "Good (up is positive)")]
    Positive,
    #[strum(to_string = "Bad (up is negative)")]
    Negative,
    #[default]
    #[strum(to_string = "Neutral")]
    Neutral,
}

/// Keys match the extension's stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub period: PeriodType,
    pub timezone: Timezone,
    /// Whether the measure can be summed, which enables the cumulative view.
    #[serde(
        rename = "isAdditiveMetric",
        alias = "additiveMetric",
        deserialize_with = "flag"
    )]
    pub additive_metric: bool,
    #[serde(rename = "trendMeaning", alias = "trend")]
    pub trend: TrendMeaning,
    #[serde(rename = "summaryLanguage", alias = "language")]
    pub language: String,
    pub cumulative: bool,
}

/// Accepts JSON booleans as well as the `"true"`/`"false"` strings the extension stores.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(text) => match text.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"true\" or \"false\", got {other:?}"
            ))),
        },
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            period: PeriodType::default(),
            timezone: Timezone::default(),
            additive_metric: false,
            trend: TrendMeaning::default(),
            language: "en".to_string(),
            cumulative: false,
        }
    }
}

impl Settings {
    /// Cumulative plotting only applies to additive metrics.
    pub fn plots_cumulative(&self) -> bool {
        self.additive_metric && self.cumulative
    }

    /// Reads settings from `path`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::warn!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Failed to read settings from {}: {e}; using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strum::IntoEnumIterator;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("daybrief-settings-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.period, PeriodType::WeekToDate);
        assert_eq!(s.timezone, Timezone::Utc);
        assert_eq!(s.trend, TrendMeaning::Neutral);
        assert_eq!(s.language, "en");
        assert!(!s.additive_metric);
        assert!(!s.plots_cumulative());
    }

    #[test]
    fn cumulative_requires_additive_metric() {
        let mut s = Settings {
            cumulative: true,
            ..Settings::default()
        };
        assert!(!s.plots_cumulative());
        s.additive_metric = true;
        assert!(s.plots_cumulative());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{ "period": "mtd", "timezone": "JST", "additiveMetric": true }"#)
                .unwrap();
        assert_eq!(s.period, PeriodType::MonthToDate);
        assert_eq!(s.timezone, Timezone::Jst);
        assert!(s.additive_metric);
        assert_eq!(s.trend, TrendMeaning::Neutral);
        assert_eq!(s.language, "en");
    }

    #[test]
    fn save_then_load() {
        let path = scratch("roundtrip/settings.json");
        let s = Settings {
            period: PeriodType::Rolling28,
            trend: TrendMeaning::Negative,
            cumulative: true,
            additive_metric: true,
            ..Settings::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path), s);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_or_malformed_file_falls_back() {
        assert_eq!(
            Settings::load(&scratch("does-not-exist.json")),
            Settings::default()
        );

        let path = scratch("broken/settings.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn reads_keys_written_by_the_extension() {
        let s: Settings = serde_json::from_str(
            r#"{
                "period": "lastMonth",
                "timezone": "UTC",
                "isAdditiveMetric": "true",
                "trendMeaning": "positive",
                "summaryLanguage": "ja"
            }"#,
        )
        .unwrap();
        assert_eq!(s.period, PeriodType::LastMonth);
        assert!(s.additive_metric);
        assert_eq!(s.trend, TrendMeaning::Positive);
        assert_eq!(s.language, "ja");

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["isAdditiveMetric"], true);
        assert_eq!(json["trendMeaning"], "positive");
        assert_eq!(json["summaryLanguage"], "ja");
        assert_eq!(json["period"], "lastMonth");

        let s: Settings = serde_json::from_str(r#"{ "isAdditiveMetric": "false" }"#).unwrap();
        assert!(!s.additive_metric);
        assert!(serde_json::from_str::<Settings>(r#"{ "isAdditiveMetric": "maybe" }"#).is_err());
    }

    #[test]
    fn trend_labels() {
        assert_eq!(TrendMeaning::Positive.to_string(), "Good (up is positive)");
        assert_eq!(TrendMeaning::Negative.to_string(), "Bad (up is negative)");
        assert_eq!(TrendMeaning::Neutral.to_string(), "Neutral");
        assert_eq!(TrendMeaning::iter().count(), 3);
    }
}
