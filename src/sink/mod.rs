// src/sink/mod.rs

//! Destinations for job log events.
//!
//! Every event is a `(severity, message)` pair for a sink that is already
//! bound to the job's program tag (`cron-<job>`).
//!
//! - [`SyslogSink`] writes to the local syslog with the `cron` facility and
//!   degrades to the diagnostic `tracing` output when syslog is unreachable.
//! - [`ConsoleMirror`] wraps another sink and also prints every event to
//!   stdout. It backs the `MONITORED_CRON_TEST` hook.

pub mod console;
pub mod system_log;

use std::fmt;

use tracing::{debug, error, info, warn};

pub use console::ConsoleMirror;
pub use system_log::SyslogSink;

/// Env var that turns on [`ConsoleMirror`].
pub const TEST_MIRROR_ENV: &str = "MONITORED_CRON_TEST";

/// `tracing` target used when a sink cannot reach its backing store.
pub const FALLBACK_TARGET: &str = "monitored_cron::fallback";

/// Severity of a job log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Alert,
    Emergency,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Alert => "alert",
            Severity::Emergency => "emergency",
        }
    }

    /// RFC 5424 numeric severity.
    pub fn syslog_code(self) -> u8 {
        match self {
            Severity::Emergency => 0,
            Severity::Alert => 1,
            Severity::Error => 3,
            Severity::Warning => 4,
            Severity::Info => 6,
            Severity::Debug => 7,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the log events of one job.
///
/// Implementations must not fail: if the backing store is unavailable they
/// are expected to fall back to some other channel.
pub trait LogSink {
    /// `cron-<job>`.
    fn program_tag(&self) -> &str;

    fn log(&mut self, severity: Severity, message: &str);
}

/// The sink the binary uses: syslog, mirrored to stdout when asked for.
pub fn open_job_sink(program_tag: impl Into<String>, mirror_to_stdout: bool) -> Box<dyn LogSink> {
    let syslog = SyslogSink::new(program_tag);
    if mirror_to_stdout {
        Box::new(ConsoleMirror::new(syslog))
    } else {
        Box::new(syslog)
    }
}

/// Whether the `MONITORED_CRON_TEST` hook is set (to anything).
pub fn mirror_requested() -> bool {
    std::env::var_os(TEST_MIRROR_ENV).is_some()
}

/// Last-resort channel: the diagnostic log on stderr, which cron mails out.
pub(crate) fn emit_fallback(program_tag: &str, severity: Severity, message: &str) {
    match severity {
        Severity::Debug => debug!(target: FALLBACK_TARGET, tag = program_tag, "{message}"),
        Severity::Info => info!(target: FALLBACK_TARGET, tag = program_tag, "{message}"),
        Severity::Warning => warn!(target: FALLBACK_TARGET, tag = program_tag, "{message}"),
        Severity::Error | Severity::Alert | Severity::Emergency => {
            error!(
                target: FALLBACK_TARGET,
                tag = program_tag,
                severity = %severity,
                code = severity.syslog_code(),
                "{message}"
            )
        }
    }
}
