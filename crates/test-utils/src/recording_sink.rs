use monitored_cron::sink::{LogSink, Severity};

/// A sink that keeps every event in memory.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    program_tag: String,
    events: Vec<(Severity, String)>,
}

impl RecordingSink {
    pub fn new(program_tag: &str) -> Self {
        Self {
            program_tag: program_tag.to_string(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[(Severity, String)] {
        &self.events
    }

    /// Events rendered as `[severity] message`, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|(severity, message)| format!("[{severity}] {message}"))
            .collect()
    }

    /// Messages logged at exactly `severity`, in order.
    pub fn messages_at(&self, severity: Severity) -> Vec<String> {
        self.events
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// The most recent event, which for a finished run is the summary line.
    pub fn last(&self) -> Option<&(Severity, String)> {
        self.events.last()
    }
}

impl LogSink for RecordingSink {
    fn program_tag(&self) -> &str {
        &self.program_tag
    }

    fn log(&mut self, severity: Severity, message: &str) {
        self.events.push((severity, message.to_string()));
    }
}
