pub mod settings;
pub mod timezone;
