// ============================================================================
// mediaforge-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch for console and file output
//
// Console records go to stderr, filtered by the -v count:
// - (none): warn
// - -v:     info
// - -vv:    debug
// - -vvv:   trace
//
// With --log-file every record at debug or above is also written to the file
// with a local timestamp, whatever the console level is.

use anyhow::{Context, Result};
use console::style;
use log::LevelFilter;
use std::path::Path;

/// Console level for a `-v` count.
#[must_use]
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Returns the current local timestamp formatted as "YYYY-MM-DD HH:MM:SS.mmm".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn styled_level(level: log::Level) -> String {
    let label = format!("{level:<5}");
    match level {
        log::Level::Error => style(label).red().bold().to_string(),
        log::Level::Warn => style(label).yellow().to_string(),
        log::Level::Info => style(label).green().to_string(),
        log::Level::Debug => style(label).blue().to_string(),
        log::Level::Trace => style(label).magenta().to_string(),
    }
}

/// Installs the global logger. Must be called once, before any command runs.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let console_level = level_for_verbosity(verbosity);

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(|out, message, record| {
            out.finish(format_args!("{} {}", styled_level(record.level()), message))
        })
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new().chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let file_level = console_level.max(LevelFilter::Debug);
        root = root.chain(
            fern::Dispatch::new()
                .level(file_level)
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}: {}",
                        get_timestamp(),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    root.apply().context("Failed to install logger")?;
    log::debug!("Logger initialized: console level {console_level}");
    Ok(())
}
