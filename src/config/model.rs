// src/config/model.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One job definition as read from a JSON job file.
///
/// Mirrors the files the provisioning side writes:
///
/// ```json
/// {
///   "command": "/path/to/script --flag",
///   "notify":  {"url": "https://example.org/ping?t=:runtime:"},
///   "locking": {"lockRunnerPath": "/usr/local/bin/lockrun", "lockDir": "/var/run/jobs",
///               "retries": 2, "sleepSeconds": 5}
/// }
/// ```
///
/// Instances only exist after validation (see `validate.rs`), so the
/// invariants documented on each field can be relied upon downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Shell command line to execute. Never empty.
    pub command: String,

    /// Optional success ping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,

    /// Optional `lockrun` wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locking: Option<LockingConfig>,
}

/// `notify` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Absolute http(s) URL. May contain `:runtime:` anywhere.
    pub url: String,
}

/// `locking` section.
///
/// The snake-case spellings (`lockrun`, `lock_dir`, `sleep`) are what older
/// provisioning writes, so they are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockingConfig {
    /// Path to the `lockrun` binary.
    #[serde(alias = "lockrun")]
    pub lock_runner_path: String,

    /// Directory the lockfile is created in.
    #[serde(alias = "lock_dir")]
    pub lock_dir: String,

    /// How many times lockrun retries acquiring the lock.
    ///
    /// When set, `sleep_seconds` is always set too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,

    /// Seconds lockrun sleeps between retries.
    #[serde(default, alias = "sleep", skip_serializing_if = "Option::is_none")]
    pub sleep_seconds: Option<i64>,
}

/// Logical job identifier: the job file's basename without extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> Self {
        JobName(name.into())
    }

    /// `/etc/monitored_cron/jobs/nightly-report.json` → `nightly-report`.
    pub fn from_job_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        JobName(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag used for every log line of this job, e.g. `cron-nightly-report`.
    pub fn program_tag(&self) -> String {
        format!("cron-{}", self.0)
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
