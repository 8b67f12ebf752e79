pub mod comparison;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::short_date;
use crate::{ComparisonSplit, PeriodType};

/// Iteration order is draw and hit-test order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    enum_map::Enum,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Series {
    Comparison,
    Current,
}

/// One aggregated day, positioned by its 1-based offset inside its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub day_index: usize,
    pub value: f64,
    pub label: String,
    pub raw_date: NaiveDate,
}

impl SeriesPoint {
    pub fn new(day_index: usize, value: f64, raw_date: NaiveDate) -> Self {
        Self {
            day_index,
            value,
            label: short_date(raw_date),
            raw_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub total_days: usize,
    pub yesterday_index: usize,
    pub yesterday_label: String,
    pub period: PeriodType,
}

impl From<&ComparisonSplit> for ChartMetadata {
    fn from(split: &ComparisonSplit) -> Self {
        Self {
            total_days: split.total_days,
            yesterday_index: split.yesterday_index,
            yesterday_label: split.yesterday_label.clone(),
            period: split.period,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub comparison: Vec<SeriesPoint>,
    pub current: Vec<SeriesPoint>,
    pub metadata: ChartMetadata,
}

impl ChartDataset {
    pub fn series(&self, series: Series) -> &[SeriesPoint] {
        match series {
            Series::Comparison => &self.comparison,
            Series::Current => &self.current,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comparison.is_empty() && self.current.is_empty()
    }
}
