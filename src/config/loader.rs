// src/config/loader.rs

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::model::JobConfig;
use crate::errors::ConfigError;

/// Read a job file and parse it as JSON, without validating it.
pub fn load_raw(path: impl AsRef<Path>) -> Result<Value, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a job file and validate it.
///
/// This is the only way the rest of the crate obtains a [`JobConfig`]:
///
/// - Read failures (missing file, permissions) become `ConfigError::Read`.
/// - Malformed JSON becomes `ConfigError::Parse`.
/// - The first violated rule becomes `ConfigError::Validation`.
///
/// Nothing is spawned by this function; a failure here aborts the run.
pub fn load_job_config(path: impl AsRef<Path>) -> Result<JobConfig, ConfigError> {
    let path = path.as_ref();
    let raw = load_raw(path)?;

    let job = JobConfig::try_from(raw).map_err(|err| ConfigError::Validation {
        path: path.to_path_buf(),
        message: err.0,
    })?;

    debug!(
        job_file = %path.display(),
        locking = job.locking.is_some(),
        notify = job.notify.is_some(),
        "loaded job config"
    );

    Ok(job)
}
