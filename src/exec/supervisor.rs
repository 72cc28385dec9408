// src/exec/supervisor.rs

//! Runs one job command and streams its output into a [`LogSink`].
//!
//! The supervisor is single threaded. It multiplexes the child's stdout and
//! stderr with `poll(2)` and drains whichever pipe is ready using
//! non-blocking reads:
//!
//! 1. wait (bounded by `read_timeout`) until either pipe is readable;
//! 2. drain every ready pipe in `chunk_size` reads until it would block;
//! 3. split what was read into lines, stdout at debug and stderr at warning;
//! 4. repeat while the child is alive.
//!
//! Once the child has exited there is exactly one more drain pass, bounded by
//! `final_drain_timeout`, to pick up anything written just before exit.
//! The read timeout only bounds how long a single wait blocks. The child is
//! never killed.

use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::process::ExitStatusExt;
use std::process::{ChildStderr, ChildStdout, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::exec::lines::split_lines;
use crate::exec::shell::Invocation;
use crate::outcome::ExecutionOutcome;
use crate::sink::{LogSink, Severity};

/// Maximum bytes taken from a pipe per `read(2)`.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Default bound on a single readiness wait.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Bound on the wait of the drain pass after the child exited.
pub const DEFAULT_FINAL_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// The OS refused to start the command.
#[derive(Error, Debug)]
#[error("{source} - {program}")]
pub struct SpawnError {
    pub program: String,
    pub source: io::Error,
}

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("failed to switch {stream} pipe to non-blocking mode: {source}")]
    NonBlocking {
        stream: StreamKind,
        source: io::Error,
    },

    #[error("waiting for output failed: {0}")]
    Poll(#[source] io::Error),

    #[error("reading {stream} failed: {source}")]
    Read {
        stream: StreamKind,
        source: io::Error,
    },

    #[error("waiting for child process failed: {0}")]
    Wait(#[source] io::Error),

    #[error("Did not capture exit status from command ({0})")]
    MissingExitStatus(ExitStatus),
}

impl SupervisorError {
    /// Short variant name used in emergency log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SupervisorError::Spawn(_) => "SpawnError",
            SupervisorError::NonBlocking { .. } => "NonBlockingError",
            SupervisorError::Poll(_) => "PollError",
            SupervisorError::Read { .. } => "ReadError",
            SupervisorError::Wait(_) => "WaitError",
            SupervisorError::MissingExitStatus(_) => "MissingExitStatus",
        }
    }
}

/// Which of the child's output streams a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Stdout is chatter, stderr is a warning.
    pub fn severity(self) -> Severity {
        match self {
            StreamKind::Stdout => Severity::Debug,
            StreamKind::Stderr => Severity::Warning,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Tuning knobs for [`ProcessSupervisor`].
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub read_timeout: Duration,
    pub final_drain_timeout: Duration,
    pub chunk_size: usize,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            final_drain_timeout: DEFAULT_FINAL_DRAIN_TIMEOUT,
            chunk_size: READ_CHUNK_SIZE,
        }
    }
}

/// Running totals of what has been emitted so far.
#[derive(Debug, Default, Clone, Copy)]
struct OutputTally {
    stdout_lines: usize,
    stderr_lines: usize,
    had_stderr: bool,
}

/// One of the child's output pipes. `reader` is dropped once EOF is seen.
struct OutputPipe<R> {
    kind: StreamKind,
    reader: Option<R>,
}

impl<R: Read + AsFd> OutputPipe<R> {
    fn new(kind: StreamKind, reader: Option<R>) -> Result<Self, SupervisorError> {
        if let Some(reader) = &reader {
            set_nonblocking(reader.as_fd())
                .map_err(|source| SupervisorError::NonBlocking { stream: kind, source })?;
        }
        Ok(Self { kind, reader })
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn fd(&self) -> Option<BorrowedFd<'_>> {
        self.reader.as_ref().map(|r| r.as_fd())
    }

    /// Read everything currently buffered in the pipe.
    fn drain(&mut self, chunk_size: usize) -> Result<Vec<u8>, SupervisorError> {
        let mut drained = Vec::new();
        let mut chunk = vec![0u8; chunk_size];

        while let Some(reader) = self.reader.as_mut() {
            match reader.read(&mut chunk) {
                Ok(0) => {
                    trace!(stream = %self.kind, "pipe reached EOF");
                    self.reader = None;
                }
                Ok(n) => drained.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SupervisorError::Read {
                        stream: self.kind,
                        source,
                    });
                }
            }
        }

        Ok(drained)
    }
}

fn set_nonblocking(fd: BorrowedFd<'_>) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(raw, FcntlArg::F_GETFL)?);
    fcntl(raw, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

fn poll_timeout(timeout: Duration) -> PollTimeout {
    let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
    PollTimeout::try_from(millis).unwrap_or(PollTimeout::MAX)
}

/// Map an exit status to a single exit code.
///
/// Signal deaths follow the shell convention of `128 + signal`.
fn exit_code(status: ExitStatus) -> Option<i32> {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
}

/// Spawns a job command and turns its output into log events.
pub struct ProcessSupervisor<'a> {
    sink: &'a mut dyn LogSink,
    options: SupervisorOptions,
}

impl<'a> ProcessSupervisor<'a> {
    pub fn new(sink: &'a mut dyn LogSink, options: SupervisorOptions) -> Self {
        Self { sink, options }
    }

    /// Run `command_line` to completion.
    ///
    /// Returns [`SupervisorError::Spawn`] if the process could not be started
    /// at all; in that case nothing has been logged yet.
    pub fn run(&mut self, command_line: &str) -> Result<ExecutionOutcome, SupervisorError> {
        let invocation = Invocation::for_command_line(command_line);
        let mut command = invocation.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| SpawnError {
            program: invocation.program().to_string(),
            source,
        })?;

        info!(
            pid = child.id(),
            direct = matches!(invocation, Invocation::Direct { .. }),
            "spawned job command"
        );

        let mut stdout = OutputPipe::new(StreamKind::Stdout, child.stdout.take())?;
        let mut stderr = OutputPipe::new(StreamKind::Stderr, child.stderr.take())?;
        let mut tally = OutputTally::default();

        let status = loop {
            if let Some(status) = child.try_wait().map_err(SupervisorError::Wait)? {
                break status;
            }

            if !stdout.is_open() && !stderr.is_open() {
                // Both pipes closed but the child lives on; nothing left to read.
                debug!(pid = child.id(), "output closed; waiting for exit");
                break child.wait().map_err(SupervisorError::Wait)?;
            }

            self.pump(&mut stdout, &mut stderr, self.options.read_timeout, &mut tally)?;
        };
        let duration = started.elapsed();

        // Output written right before exit may still be sitting in the pipes.
        self.pump(
            &mut stdout,
            &mut stderr,
            self.options.final_drain_timeout,
            &mut tally,
        )?;

        let exit_code = exit_code(status).ok_or(SupervisorError::MissingExitStatus(status))?;

        info!(
            exit_code,
            duration_ms = duration.as_millis() as u64,
            stdout_lines = tally.stdout_lines,
            stderr_lines = tally.stderr_lines,
            "job command finished"
        );

        Ok(ExecutionOutcome {
            exit_code,
            had_stderr_output: tally.had_stderr,
            duration,
            stdout_lines: tally.stdout_lines,
            stderr_lines: tally.stderr_lines,
        })
    }

    /// One readiness wait followed by draining every ready pipe, stdout first.
    fn pump(
        &mut self,
        stdout: &mut OutputPipe<ChildStdout>,
        stderr: &mut OutputPipe<ChildStderr>,
        timeout: Duration,
        tally: &mut OutputTally,
    ) -> Result<(), SupervisorError> {
        let (stdout_ready, stderr_ready) = wait_ready(stdout, stderr, timeout)?;

        if stdout_ready {
            let bytes = stdout.drain(self.options.chunk_size)?;
            self.emit(StreamKind::Stdout, &bytes, tally);
        }

        if stderr_ready {
            let bytes = stderr.drain(self.options.chunk_size)?;
            self.emit(StreamKind::Stderr, &bytes, tally);
        }

        Ok(())
    }

    fn emit(&mut self, stream: StreamKind, bytes: &[u8], tally: &mut OutputTally) {
        if bytes.is_empty() {
            return;
        }

        let lines = split_lines(bytes);
        match stream {
            StreamKind::Stdout => tally.stdout_lines += lines.len(),
            StreamKind::Stderr => {
                tally.had_stderr = true;
                tally.stderr_lines += lines.len();
            }
        }

        for line in lines {
            self.sink.log(stream.severity(), &line);
        }
    }
}

/// Block until at least one open pipe is readable or `timeout` elapses.
///
/// EOF and errors count as readable so the following read can observe them.
/// An interrupted wait is retried with the full timeout.
fn wait_ready(
    stdout: &OutputPipe<ChildStdout>,
    stderr: &OutputPipe<ChildStderr>,
    timeout: Duration,
) -> Result<(bool, bool), SupervisorError> {
    let mut fds = Vec::with_capacity(2);
    let mut slots = [None, None];

    for (slot, fd) in slots.iter_mut().zip([stdout.fd(), stderr.fd()]) {
        if let Some(fd) = fd {
            *slot = Some(fds.len());
            fds.push(PollFd::new(fd, PollFlags::POLLIN));
        }
    }

    if fds.is_empty() {
        return Ok((false, false));
    }

    loop {
        match poll(&mut fds, poll_timeout(timeout)) {
            Ok(_) => break,
            Err(Errno::EINTR) => trace!("poll interrupted; retrying"),
            Err(errno) => return Err(SupervisorError::Poll(errno.into())),
        }
    }

    let readable = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
    let is_ready = |slot: Option<usize>| {
        slot.and_then(|i| fds[i].revents())
            .is_some_and(|events| events.intersects(readable))
    };

    Ok((is_ready(slots[0]), is_ready(slots[1])))
}
