pub mod logger;
pub mod style;
pub mod widget;

pub use widget::chart::ComparisonChart;

use data::Settings;
use data::settings::SETTINGS_FILE;

/// Settings stored in the per-user data directory.
pub fn load_settings() -> Settings {
    Settings::load(&data::data_path(SETTINGS_FILE))
}

pub fn save_settings(settings: &Settings) -> Result<(), data::Error> {
    settings.save(&data::data_path(SETTINGS_FILE))
}
