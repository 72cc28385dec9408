// src/logging.rs

//! Diagnostic logging for `monitored-cron` using `tracing` + `tracing-subscriber`.
//!
//! This is the wrapper's own chatter, not the job's output (that goes to the
//! [`crate::sink`]). Priority for determining the level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `MONITORED_CRON_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `warn`, since cron mails whatever lands on stderr
//!
//! The sink fallback target is always enabled, whatever the level.

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;
use crate::sink::FALLBACK_TARGET;

/// Env var consulted when no `--log-level` is given.
pub const LOG_ENV: &str = "MONITORED_CRON_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::WARN),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse(format!("{FALLBACK_TARGET}=trace"))?;

    // Send logs to stderr; stdout belongs to the test mirror.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)?;

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
