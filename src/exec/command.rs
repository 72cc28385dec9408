// src/exec/command.rs

//! Builds the command line the supervisor actually runs.

use crate::config::{JobConfig, JobName, LockingConfig};

/// Produce the final shell command line for a job.
///
/// Without `locking` the configured command is returned untouched. With
/// `locking` the command is run inside `lockrun`:
///
/// ```text
/// <lockRunnerPath> --lockfile=<lockDir>/cron-<job>.lock [--retries=N --sleep=S] -- <command>
/// ```
pub fn build_command(job: &JobConfig, name: &JobName) -> String {
    let Some(locking) = &job.locking else {
        return job.command.clone();
    };

    let lockfile = format!("--lockfile={}", lockfile_path(locking, name));

    [
        Some(locking.lock_runner_path.clone()),
        Some(lockfile),
        retry_args(locking),
        Some("--".to_string()),
        Some(job.command.clone()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

/// `<lockDir>/cron-<job>.lock`, with trailing slashes stripped from the dir.
pub fn lockfile_path(locking: &LockingConfig, name: &JobName) -> String {
    let dir = locking.lock_dir.trim_end_matches('/');
    format!("{dir}/{}.lock", name.program_tag())
}

fn retry_args(locking: &LockingConfig) -> Option<String> {
    match (locking.retries, locking.sleep_seconds) {
        (Some(retries), Some(sleep)) => Some(format!("--retries={retries} --sleep={sleep}")),
        _ => None,
    }
}
