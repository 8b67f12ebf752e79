pub mod aggr;
pub mod chart;
pub mod config;
pub mod log;
pub mod period;
pub mod range;
pub mod split;
pub mod util;

use std::path::PathBuf;

pub use aggr::{Cell, ColumnMapping, DataTable, DayBucket};
pub use chart::{ChartDataset, ChartMetadata, Series, SeriesPoint};
pub use config::settings::{self, Settings, TrendMeaning};
pub use config::timezone::Timezone;
pub use period::{PeriodCategory, PeriodType};
pub use range::{DateRange, RangeFilter};
pub use split::ComparisonSplit;

const DATA_PATH_ENV: &str = "DAYBRIEF_DATA_PATH";
const APP_DIR: &str = "daybrief";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown period type: {0}")]
    InvalidPeriodType(String),
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("Missing field name for date filter")]
    MissingFilterField,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Resolves `name` inside the per-user data directory.
///
/// `DAYBRIEF_DATA_PATH` takes precedence over the platform default.
pub fn data_path(name: &str) -> PathBuf {
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        PathBuf::from(path).join(name)
    } else {
        let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join(APP_DIR).join(name)
    }
}
