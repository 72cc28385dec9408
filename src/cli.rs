// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `monitored-cron`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "monitored-cron",
    version,
    about = "Run a cron job, sending its output and outcome to syslog.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the JSON job file.
    ///
    /// The job name, and with it the syslog tag `cron-<name>`, is the file's
    /// basename without extension.
    #[arg(value_name = "JOB_FILE")]
    pub job_file: PathBuf,

    /// Parse + validate, print the command that would run, but run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Longest single wait for output, in seconds. Must be at least 1.
    ///
    /// This only bounds how long the supervisor sleeps between checks on the
    /// child; it never kills the job.
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub read_timeout: u64,

    /// Diagnostic logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONITORED_CRON_LOG` or `warn` is used. Job output never
    /// goes through this channel.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
