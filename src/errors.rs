// src/errors.rs

//! Crate-wide error types.
//!
//! Each concern owns its own `thiserror` enum ([`ConfigError`],
//! [`SupervisorError`], [`NotifyError`]); [`RunError`] aggregates them into
//! the three recovery boundaries the runner dispatches on:
//!
//! - `Config` and `Spawn` abort the run and are logged at alert level.
//! - `Unexpected` covers everything else and is logged at emergency level
//!   together with the place it was raised.

use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error;

pub use crate::exec::supervisor::{SpawnError, SupervisorError};
pub use crate::notify::NotifyError;

/// The job file could not be read, parsed or validated.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid job config `{}`: [{:?}] {source}", .path.display(), .source.kind())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid job config `{}`: [{:?}] {source}", .path.display(), .source.classify())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid job config `{}`: [Validation] {message}", .path.display())]
    Validation { path: PathBuf, message: String },
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Read,
    Parse,
    Validation,
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::Read { .. } => ConfigErrorKind::Read,
            ConfigError::Parse { .. } => ConfigErrorKind::Parse,
            ConfigError::Validation { .. } => ConfigErrorKind::Validation,
        }
    }
}

/// A single violated job-file rule, before the file path is attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        ValidationError(message.to_string())
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        ValidationError(message)
    }
}

/// Anything that escaped the config and spawn boundaries.
///
/// `location` is captured with `#[track_caller]` where the error is wrapped,
/// or taken from the panic hook for a panic, so the emergency log line says
/// which step of the run blew up.
#[derive(Debug)]
pub struct UnexpectedError {
    pub kind: String,
    pub message: String,
    pub location: String,
}

impl fmt::Display for UnexpectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected error [{}] {} in {}",
            self.kind, self.message, self.location
        )
    }
}

impl std::error::Error for UnexpectedError {}

/// Error returned by [`crate::runner::run_job`].
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start: {0}")]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Unexpected(UnexpectedError),
}

impl RunError {
    /// Wrap an unanticipated failure, recording the caller's location.
    #[track_caller]
    pub fn unexpected(kind: impl Into<String>, err: impl fmt::Display) -> Self {
        RunError::Unexpected(UnexpectedError {
            kind: kind.into(),
            message: err.to_string(),
            location: Location::caller().to_string(),
        })
    }

    /// Turn a caught panic payload into an unexpected error of kind `Panic`.
    pub fn panicked(payload: &(dyn Any + Send), location: Option<String>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_string());

        RunError::Unexpected(UnexpectedError {
            kind: "Panic".to_string(),
            message,
            location: location.unwrap_or_else(|| "an unknown location".to_string()),
        })
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
