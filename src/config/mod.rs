// src/config/mod.rs

//! Job file loading and validation.
//!
//! Responsibilities:
//! - Define the JSON-backed job model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate the untyped document rule by rule before it becomes a
//!   [`JobConfig`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_job_config, load_raw};
pub use model::{JobConfig, JobName, LockingConfig, NotifyConfig};
pub use validate::validate_raw_job;
