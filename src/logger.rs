use std::io;

use log::LevelFilter;

const LEVEL_ENV: &str = "RUST_LOG";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Log(#[from] data::log::Error),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Routes the `log` facade to stdout and to the data directory's log file.
pub fn setup() -> Result<(), Error> {
    let level = level_from(std::env::var(LEVEL_ENV).ok().as_deref())?;

    fern::Dispatch::new()
        .format(|out, _message, record| {
            out.finish(format_args!("{}", data::log::Record::new(record)));
        })
        .level(level)
        .level_for("wgpu_core", LevelFilter::Warn)
        .level_for("wgpu_hal", LevelFilter::Warn)
        .level_for("naga", LevelFilter::Warn)
        .level_for("cosmic_text", LevelFilter::Warn)
        .chain(io::stdout())
        .chain(data::log::file()?)
        .apply()?;

    log::info!("Logging at {level}, file: {:?}", data::log::path().ok());
    Ok(())
}

fn level_from(value: Option<&str>) -> Result<LevelFilter, data::log::Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(LevelFilter::Info),
        Some(s) => Ok(s.parse::<LevelFilter>()?),
    }
}
