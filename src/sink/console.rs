// src/sink/console.rs

use std::io::{self, Write};

use super::{LogSink, Severity};

/// Passes events to `inner` and also prints `<tag>: [<severity>] <message>`
/// on stdout, so a black-box test can see what would reach syslog.
pub struct ConsoleMirror<S> {
    inner: S,
}

impl<S: LogSink> ConsoleMirror<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: LogSink> LogSink for ConsoleMirror<S> {
    fn program_tag(&self) -> &str {
        self.inner.program_tag()
    }

    fn log(&mut self, severity: Severity, message: &str) {
        self.inner.log(severity, message);

        let mut stdout = io::stdout().lock();
        // A closed stdout must not take the job down with it.
        let _ = writeln!(stdout, "{}: [{}] {}", self.inner.program_tag(), severity, message);
        let _ = stdout.flush();
    }
}
