// src/outcome.rs

//! Classification of a finished run.

use std::time::Duration;

use crate::sink::Severity;

/// What the supervisor observed for one run of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    /// True if any byte at all was read from the child's stderr.
    pub had_stderr_output: bool,
    /// From just before spawn until the child was seen to have exited.
    pub duration: Duration,
    pub stdout_lines: usize,
    pub stderr_lines: usize,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Duration rendered for log lines and notify URLs.
    pub fn runtime(&self) -> String {
        format_runtime(self.duration)
    }
}

/// Typed result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nonzero exit, whatever was written to stderr.
    Failed { exit_code: i32 },
    /// Exit 0 but something was written to stderr.
    SucceededWithStderr,
    /// Exit 0 and a silent stderr. The only outcome that notifies.
    SucceededClean,
}

impl Outcome {
    pub fn classify(execution: &ExecutionOutcome) -> Self {
        if !execution.success() {
            Outcome::Failed {
                exit_code: execution.exit_code,
            }
        } else if execution.had_stderr_output {
            Outcome::SucceededWithStderr
        } else {
            Outcome::SucceededClean
        }
    }

    pub fn should_notify(&self) -> bool {
        matches!(self, Outcome::SucceededClean)
    }

    pub fn severity(&self) -> Severity {
        match self {
            Outcome::SucceededClean => Severity::Info,
            Outcome::Failed { .. } | Outcome::SucceededWithStderr => Severity::Error,
        }
    }

    /// The final summary line for the run, `runtime` already formatted.
    pub fn summary(&self, runtime: &str) -> String {
        match self {
            Outcome::Failed { exit_code } => {
                format!("Failed with exit code {exit_code} after {runtime}s")
            }
            Outcome::SucceededWithStderr => format!("Displayed errors but exited 0 after {runtime}s"),
            Outcome::SucceededClean => format!("Ran successfully in {runtime}s"),
        }
    }
}

/// Seconds with exactly three decimals, e.g. `0.532`.
pub fn format_runtime(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}
