//! Logger initialization.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

// Dependencies that log every connection at debug level
const NOISY_MODULES: &[(&str, LevelFilter)] = &[
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("h2", LevelFilter::Warn),
    ("rustls", LevelFilter::Warn),
];

fn level_marker(level: Level) -> (ColoredString, &'static str) {
    let name = level.to_string();
    match level {
        Level::Error => (name.red(), "❌"),
        Level::Warn => (name.yellow(), "⚠️"),
        Level::Info => (name.green(), "✔️"),
        Level::Debug => (name.blue(), "🔍"),
        Level::Trace => (name.purple(), "🔬"),
    }
}

/// One JSON object per log line.
fn json_line(ts_millis: i64, level: Level, target: &str, message: &str) -> String {
    let message = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".into());
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
        ts_millis, level, target, message
    )
}

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate and as the
/// global default, so `RUST_LOG=statcert=trace` still works for ad-hoc debugging
/// while `--log-level` stays authoritative.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for (module, filter) in NOISY_MODULES {
        builder.filter_module(module, (*filter).min(level));
    }
    builder.filter_module("statcert", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let (level, emoji) = level_marker(record.level());
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    emoji,
                    record.target().cyan(),
                    level,
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
