//! Program Invocation
//!
//! A program under test is a path plus a fixed argument list. The test input
//! is always appended as the final positional argument. No shell is involved,
//! so paths with spaces or quotes need no escaping.

use crate::measure::time;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while launching a program
#[derive(Debug, Error)]
pub enum CommandError {
    /// The OS refused to start the program
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program path as given
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Everything a finished process wrote, plus how it exited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Raw standard error
    pub stderr: Vec<u8>,
    /// Exit code (`None` when terminated by a signal)
    pub exit_code: Option<i32>,
}

/// Program path plus fixed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProgramCommand {
    /// Create a command with no extra arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one fixed argument (placed before the test input)
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several fixed arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program path or name
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Fixed arguments
    pub fn fixed_args(&self) -> &[OsString] {
        &self.args
    }

    /// Build the `std::process::Command` for one test input
    pub fn command_for(&self, input: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(input).stdin(Stdio::null());
        command
    }

    /// Human-readable form for logs
    pub fn display_for(&self, input: &Path) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.push(input.display().to_string());
        parts.join(" ")
    }

    /// Run once with output discarded and return the wall-clock duration.
    ///
    /// A non-zero exit code is not an error here; only failure to launch is.
    pub fn run_timed(&self, input: &Path) -> Result<Duration, CommandError> {
        let mut command = self.command_for(input);
        command.stdout(Stdio::null()).stderr(Stdio::null());

        let (status, elapsed) = time(|| command.status());
        let status = status.map_err(|source| self.spawn_error(source))?;

        if !status.success() {
            tracing::debug!(
                command = %self.display_for(input),
                code = ?status.code(),
                "timed run exited unsuccessfully"
            );
        }
        Ok(elapsed)
    }

    /// Run once to completion, capturing stdout, stderr and exit code
    pub fn run_captured(&self, input: &Path) -> Result<CapturedOutput, CommandError> {
        let output = self
            .command_for(input)
            .output()
            .map_err(|source| self.spawn_error(source))?;

        Ok(CapturedOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }

    /// Bind this command to one test input
    pub fn bind<'a>(&'a self, input: &'a Path) -> BoundCommand<'a> {
        BoundCommand {
            command: self,
            input,
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        CommandError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

/// A command bound to a single test input, ready to be run repeatedly
#[derive(Debug, Clone, Copy)]
pub struct BoundCommand<'a> {
    command: &'a ProgramCommand,
    input: &'a Path,
}

impl BoundCommand<'_> {
    /// The test input this command runs on
    pub fn input(&self) -> &Path {
        self.input
    }

    /// Run once and return the elapsed time
    pub fn run_timed(&self) -> Result<Duration, CommandError> {
        self.command.run_timed(self.input)
    }
}
