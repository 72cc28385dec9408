// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the command line, wrapping it in `lockrun` when the
//!   job asks for locking.
//! - [`shell`] decides whether a command line needs `/bin/sh -c`.
//! - [`supervisor`] spawns the command and multiplexes its stdout/stderr into
//!   log events with `poll(2)` and non-blocking reads.
//! - [`lines`] splits drained output into log lines.

pub mod command;
pub mod lines;
pub mod shell;
pub mod supervisor;

pub use command::{build_command, lockfile_path};
pub use lines::split_lines;
pub use shell::Invocation;
pub use supervisor::{
    ProcessSupervisor, SpawnError, StreamKind, SupervisorError, SupervisorOptions,
};
