//! Command execution.
//!
//! Every host mutation goes through an [`Executor`], which logs the exact
//! command line before running it and turns any failure into a fatal
//! [`SixrdError::CommandFailed`]. The process spawning itself sits behind the
//! [`CommandRunner`] trait so the orchestration can be driven without a real
//! network stack.

use std::io;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::SixrdError;
use crate::ip::{IpCommand, IP_PROGRAM};

/// Exit status `ip tunnel del` returns when the device does not exist.
pub const IP_NO_SUCH_DEVICE_STATUS: i32 = 1;

/// Result of a completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `None` if the process was killed by a signal.
    pub status: Option<i32>,

    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run.
    pub fn ok() -> Self {
        Self {
            status: Some(0),
            stderr: String::new(),
        }
    }

    /// A run that exited with `status`.
    pub fn exited(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Human-readable failure text: exit status plus stderr when present.
    pub fn describe(&self) -> String {
        let status = match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Runs a program to completion.
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// Returns `Err` only if the process could not be started.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runs commands on the host with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Mock runner for testing.
///
/// Records every command line and answers with scripted exit statuses.
#[derive(Debug, Default)]
pub struct MockRunner {
    log: Mutex<Vec<String>>,
    failures: Vec<(String, CommandOutput)>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command whose line (without the program) starts with `prefix`.
    pub fn fail_on(mut self, prefix: &str, status: i32, stderr: &str) -> Self {
        self.failures
            .push((prefix.to_string(), CommandOutput::exited(status, stderr)));
        self
    }

    /// Command lines run so far, including the program name.
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let line = args.join(" ");
        if let Ok(mut log) = self.log.lock() {
            log.push(format!("{} {}", program, line));
        }

        let output = self
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(CommandOutput::ok);
        Ok(output)
    }
}

/// What to do with a failed tunnel delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The device is already gone.
    Ignorable,
    /// Anything else.
    Fatal,
}

/// Classify a failed `ip tunnel del`.
///
/// iproute2 exits with status 1 when asked to delete a device that does not
/// exist, as happens after a reboot or an unclean shutdown already cleared the
/// kernel's tunnel state. Every other status, and termination by a signal, is
/// a real failure.
pub fn classify_delete_error(output: &CommandOutput) -> DeleteOutcome {
    match output.status {
        Some(IP_NO_SUCH_DEVICE_STATUS) => DeleteOutcome::Ignorable,
        _ => DeleteOutcome::Fatal,
    }
}

/// Logged, synchronous executor for [`IpCommand`]s.
#[derive(Debug)]
pub struct Executor<R> {
    runner: R,
}

impl<R: CommandRunner> Executor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a command; any failure is fatal.
    pub fn execute(&self, cmd: &IpCommand) -> Result<(), SixrdError> {
        let output = self.run(cmd)?;
        if output.success() {
            return Ok(());
        }
        Err(SixrdError::command_failed(cmd, output.describe()))
    }

    /// Run a command, treating failures the classifier marks
    /// [`DeleteOutcome::Ignorable`] as success.
    pub fn execute_tolerating(
        &self,
        cmd: &IpCommand,
        classify: fn(&CommandOutput) -> DeleteOutcome,
    ) -> Result<(), SixrdError> {
        let output = self.run(cmd)?;
        if output.success() {
            return Ok(());
        }

        match classify(&output) {
            DeleteOutcome::Ignorable => {
                warn!(
                    command = %cmd,
                    detail = %output.describe(),
                    "ignoring failure, nothing to remove"
                );
                Ok(())
            }
            DeleteOutcome::Fatal => Err(SixrdError::command_failed(cmd, output.describe())),
        }
    }

    fn run(&self, cmd: &IpCommand) -> Result<CommandOutput, SixrdError> {
        info!(command = %cmd, "executing");
        let output = self
            .runner
            .run(IP_PROGRAM, cmd.args())
            .map_err(|e| SixrdError::command_failed(cmd, e.to_string()))?;
        debug!(command = %cmd, status = ?output.status, "command finished");
        Ok(output)
    }
}
