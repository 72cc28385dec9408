// src/sink/system_log.rs

use syslog::{Facility, Formatter3164, Logger, LoggerBackend};
use tracing::{debug, warn};

use super::{LogSink, Severity, emit_fallback};

type SyslogLogger = Logger<LoggerBackend, Formatter3164>;

/// Writes job events to the local syslog socket under the `cron` facility.
///
/// The connection is opened on the first event and reused afterwards. A
/// failed write drops the connection and retries once on a fresh one, which
/// covers syslogd having been restarted. If that fails too, or the socket
/// cannot be opened at all, the event goes to the fallback channel instead.
pub struct SyslogSink {
    program_tag: String,
    logger: Option<SyslogLogger>,
    unavailable: bool,
}

impl SyslogSink {
    pub fn new(program_tag: impl Into<String>) -> Self {
        Self {
            program_tag: program_tag.into(),
            logger: None,
            unavailable: false,
        }
    }

    fn connect(&mut self) -> Option<&mut SyslogLogger> {
        if self.logger.is_none() && !self.unavailable {
            let formatter = Formatter3164 {
                facility: Facility::LOG_CRON,
                hostname: None,
                process: self.program_tag.clone(),
                pid: std::process::id(),
            };

            match syslog::unix(formatter) {
                Ok(logger) => {
                    debug!(tag = %self.program_tag, "connected to syslog");
                    self.logger = Some(logger);
                }
                Err(e) => {
                    warn!(tag = %self.program_tag, error = %e, "syslog unavailable; using fallback");
                    self.unavailable = true;
                }
            }
        }

        self.logger.as_mut()
    }

    fn try_write(&mut self, severity: Severity, message: &str) -> bool {
        let Some(logger) = self.connect() else {
            return false;
        };

        match write(logger, severity, message) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "syslog write failed; dropping connection");
                self.logger = None;
                false
            }
        }
    }
}

impl LogSink for SyslogSink {
    fn program_tag(&self) -> &str {
        &self.program_tag
    }

    fn log(&mut self, severity: Severity, message: &str) {
        if self.try_write(severity, message) || self.try_write(severity, message) {
            return;
        }
        emit_fallback(&self.program_tag, severity, message);
    }
}

fn write(logger: &mut SyslogLogger, severity: Severity, message: &str) -> Result<(), syslog::Error> {
    match severity {
        Severity::Debug => logger.debug(message),
        Severity::Info => logger.info(message),
        Severity::Warning => logger.warning(message),
        Severity::Error => logger.err(message),
        Severity::Alert => logger.alert(message),
        Severity::Emergency => logger.emerg(message),
    }
}
