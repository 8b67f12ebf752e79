use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartDataset, ChartMetadata, SeriesPoint};
use crate::split::ComparisonSplit;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Single value of a tabular data source, as handed over by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Calendar day of this cell in UTC. Numbers are epoch milliseconds.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Null => None,
            Cell::Number(ms) if ms.is_finite() => {
                DateTime::<Utc>::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
            }
            Cell::Number(_) => None,
            Cell::Text(text) => parse_date(text),
        }
    }

    /// Numeric measure; anything that is not a finite number counts as zero.
    pub fn measure(&self) -> f64 {
        let value = match self {
            Cell::Null => None,
            Cell::Number(n) => Some(*n),
            Cell::Text(text) => text.trim().replace(',', "").parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Index of `name`, matched exactly first and case-insensitively second.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
    }
}

/// Which columns carry the date and the measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub measure: String,
}

impl ColumnMapping {
    pub fn new(date: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            measure: measure.into(),
        }
    }

    fn locate(&self, table: &DataTable) -> Option<(usize, usize)> {
        let date = table.column_index(&self.date);
        let measure = table.column_index(&self.measure);

        match (date, measure) {
            (Some(d), Some(m)) => Some((d, m)),
            _ => {
                log::warn!(
                    "Columns not found (date '{}': {}, measure '{}': {}) among {:?}",
                    self.date,
                    date.is_some(),
                    self.measure,
                    measure.is_some(),
                    table.columns
                );
                None
            }
        }
    }
}

/// Total of all rows that fall on one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub value: f64,
}

/// Sums the measure per UTC day, ascending by date.
///
/// Rows without a parseable date are skipped. `None` when a mapped column is missing.
pub fn daily_totals(table: &DataTable, mapping: &ColumnMapping) -> Option<Vec<DayBucket>> {
    let (date_idx, measure_idx) = mapping.locate(table)?;

    let mut totals: FxHashMap<NaiveDate, f64> = FxHashMap::default();
    let mut skipped = 0usize;

    for row in &table.rows {
        let Some(date) = row.get(date_idx).and_then(Cell::date) else {
            skipped += 1;
            continue;
        };
        let value = row.get(measure_idx).map_or(0.0, Cell::measure);
        *totals.entry(date).or_insert(0.0) += value;
    }

    if skipped > 0 {
        log::debug!(
            "Skipped {skipped} of {} rows with unparseable '{}' values",
            table.rows.len(),
            mapping.date
        );
    }

    let mut buckets: Vec<DayBucket> = totals
        .into_iter()
        .map(|(date, value)| DayBucket { date, value })
        .collect();
    buckets.sort_by_key(|b| b.date);

    Some(buckets)
}

/// Buckets per-day totals into the comparison and current windows of `split`.
///
/// Propagates `None` from a missing split (the `LastDay` case) or from unmapped columns.
pub fn aggregate(
    table: &DataTable,
    mapping: &ColumnMapping,
    split: Option<&ComparisonSplit>,
) -> Option<ChartDataset> {
    let split = split?;
    let buckets = daily_totals(table, mapping)?;

    let mut comparison = Vec::new();
    let mut current = Vec::new();

    for bucket in &buckets {
        if let Some(day_index) = split.comparison_range.day_index(bucket.date) {
            comparison.push(SeriesPoint::new(day_index, bucket.value, bucket.date));
        }
        if let Some(day_index) = split.current_range.day_index(bucket.date) {
            current.push(SeriesPoint::new(day_index, bucket.value, bucket.date));
        }
    }

    comparison.sort_by_key(|p| p.day_index);
    current.sort_by_key(|p| p.day_index);

    log::debug!(
        "Aggregated {} days into {} comparison / {} current points",
        buckets.len(),
        comparison.len(),
        current.len()
    );

    Some(ChartDataset {
        comparison,
        current,
        metadata: ChartMetadata::from(split),
    })
}
