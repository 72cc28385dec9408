// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod outcome;
pub mod runner;
pub mod sink;

use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{JobName, load_job_config};
use crate::exec::{SupervisorOptions, build_command};
use crate::notify::HttpNotifier;
use crate::runner::{report_failure, run_job_guarded};
use crate::sink::{mirror_requested, open_job_sink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the job's log sink (syslog, mirrored to stdout under `MONITORED_CRON_TEST`)
/// - the HTTP notifier
/// - the runner, and the reporting of whatever it returns
///
/// Outcomes are reported through the sink only, so this returns `Ok` for
/// every run, failed or not. `Err` is reserved for `--dry-run` problems.
pub fn run(args: CliArgs) -> Result<()> {
    let name = JobName::from_job_file(&args.job_file);

    if args.dry_run {
        return print_dry_run(&args, &name);
    }

    let mut sink = open_job_sink(name.program_tag(), mirror_requested());
    let mut notifier = HttpNotifier::new();
    let options = SupervisorOptions {
        read_timeout: Duration::from_secs(args.read_timeout),
        ..SupervisorOptions::default()
    };

    match run_job_guarded(&args.job_file, sink.as_mut(), &mut notifier, &options) {
        Ok(report) => debug!(
            job = %name,
            outcome = ?report.outcome,
            exit_code = report.execution.exit_code,
            "run complete"
        ),
        Err(err) => report_failure(sink.as_mut(), &err),
    }

    Ok(())
}

/// Simple dry-run output: job identity and the command that would run.
fn print_dry_run(args: &CliArgs, name: &JobName) -> Result<()> {
    let job = load_job_config(&args.job_file)?;

    println!("monitored-cron dry-run");
    println!("  job: {name}");
    println!("  tag: {}", name.program_tag());
    println!("  command: {}", build_command(&job, name));
    if let Some(notify) = &job.notify {
        println!("  notify: {}", notify.url);
    }
    println!("  config: {}", serde_json::to_string(&job)?);

    debug!("dry-run complete (no execution)");
    Ok(())
}
