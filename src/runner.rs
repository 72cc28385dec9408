// src/runner.rs

//! One invocation of a job, from job file to summary line.
//!
//! [`run_job`] wires the pieces together:
//! - load and validate the job file
//! - build the (possibly lock-wrapped) command line
//! - supervise the command, streaming its output to the sink
//! - classify the outcome and log the summary
//! - ping the notify URL on a clean success
//!
//! Failures come back as a [`RunError`]; [`report_failure`] is the single
//! place that turns them into log lines. [`run_job_guarded`] also turns a
//! panic anywhere in the run into an unexpected error.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;

use tracing::{debug, info, warn};

use crate::config::{JobConfig, JobName, load_job_config};
use crate::errors::{RunError, SupervisorError};
use crate::exec::{ProcessSupervisor, SupervisorOptions, build_command};
use crate::notify::{Notifier, substitute_runtime};
use crate::outcome::{ExecutionOutcome, Outcome};
use crate::sink::{LogSink, Severity};

/// What a completed run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub command: String,
    pub execution: ExecutionOutcome,
    pub outcome: Outcome,
    /// The URL that was pinged, after `:runtime:` substitution.
    pub pinged: Option<String>,
}

/// Run the job described by `job_file`.
///
/// Every event of the run goes to `sink`, including the summary line. The
/// caller is responsible for reporting an `Err` (see [`report_failure`]).
pub fn run_job(
    job_file: &Path,
    sink: &mut dyn LogSink,
    notifier: &mut dyn Notifier,
    options: &SupervisorOptions,
) -> Result<RunReport, RunError> {
    let job = load_job_config(job_file)?;
    let name = JobName::from_job_file(job_file);
    run_loaded_job(&job, &name, sink, notifier, options)
}

thread_local! {
    static PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_LOCATOR: Once = Once::new();

/// Chain a panic hook that remembers where the current thread panicked.
///
/// The previous hook still runs, so the panic message keeps reaching stderr.
fn install_panic_locator() {
    PANIC_LOCATOR.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info.location().map(|l| l.to_string());
            PANIC_LOCATION.with(|slot| *slot.borrow_mut() = location);
            previous(info);
        }));
    });
}

/// [`run_job`], with panics caught and returned as [`RunError::Unexpected`].
///
/// This is what the binary calls, so a panic in the sink, the notifier or
/// the HTTP stack still ends in an emergency line on the job's tag.
pub fn run_job_guarded(
    job_file: &Path,
    sink: &mut dyn LogSink,
    notifier: &mut dyn Notifier,
    options: &SupervisorOptions,
) -> Result<RunReport, RunError> {
    install_panic_locator();

    panic::catch_unwind(AssertUnwindSafe(|| {
        run_job(job_file, sink, notifier, options)
    }))
    .unwrap_or_else(|payload| {
        let location = PANIC_LOCATION.with(|slot| slot.borrow_mut().take());
        warn!(?location, "job run panicked");
        Err(RunError::panicked(payload.as_ref(), location))
    })
}

/// Same as [`run_job`] for a job that is already loaded.
pub fn run_loaded_job(
    job: &JobConfig,
    name: &JobName,
    sink: &mut dyn LogSink,
    notifier: &mut dyn Notifier,
    options: &SupervisorOptions,
) -> Result<RunReport, RunError> {
    let command = build_command(job, name);
    info!(job = %name, command = %command, "starting job");

    let execution = ProcessSupervisor::new(sink, options.clone())
        .run(&command)
        .map_err(|err| match err {
            SupervisorError::Spawn(spawn) => RunError::Spawn(spawn),
            other => RunError::unexpected(other.kind(), other),
        })?;

    let outcome = Outcome::classify(&execution);
    let runtime = execution.runtime();
    sink.log(outcome.severity(), &outcome.summary(&runtime));

    let mut pinged = None;
    if let (true, Some(notify)) = (outcome.should_notify(), &job.notify) {
        let url = substitute_runtime(&notify.url, &runtime);
        notifier
            .ping(&url)
            .map_err(|err| RunError::unexpected(err.kind(), err))?;
        sink.log(Severity::Info, &format!("Pinged {url}"));
        pinged = Some(url);
    }

    debug!(job = %name, ?outcome, "job finished");

    Ok(RunReport {
        command,
        execution,
        outcome,
        pinged,
    })
}

/// Log a failed run at the severity its boundary calls for.
///
/// - config problems and spawn failures are alerts
/// - anything else is an emergency, with the place it was raised
pub fn report_failure(sink: &mut dyn LogSink, err: &RunError) {
    let severity = match err {
        RunError::Config(_) | RunError::Spawn(_) => Severity::Alert,
        RunError::Unexpected(_) => Severity::Emergency,
    };
    sink.log(severity, &err.to_string());
}
