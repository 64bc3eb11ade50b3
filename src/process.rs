//! External process execution
//!
//! Every external program the launcher touches goes through a
//! [`CommandRunner`]: diagnostics whose output is captured and embedded in
//! error messages, the WSL drive attachment, and the interactive veracrypt
//! session. Keeping this behind a trait lets the validation and launch
//! phases run against a scripted runner in tests.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Program used to look executables up on the search path
#[cfg(windows)]
const LOCATOR: &str = "where";
#[cfg(not(windows))]
const LOCATOR: &str = "which";

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Successful output carrying `stdout`
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Failed output carrying `stderr` and an exit code
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }
}

/// Exit status of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExit {
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
}

impl SessionExit {
    /// Whether the session exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external programs on behalf of the launcher.
pub trait CommandRunner {
    /// Run `program` to completion with stdout and stderr captured.
    ///
    /// A nonzero exit is reported through [`CommandOutput::success`], not as
    /// an error. Errors mean the program could not be started or waited on.
    fn capture(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Run `program` attached to the controlling terminal and block until it
    /// exits.
    ///
    /// Implementations must not log `args`: they may carry the volume password.
    fn run_interactive(&self, program: &str, args: &[String]) -> Result<SessionExit>;

    /// Whether `program` can be found, either as a path or on the search path.
    fn locate(&self, program: &str) -> bool;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn capture(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("capture: {} args={:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {}", program))?;

        let exit_code = output.status.code();
        tracing::debug!("{} exited with {:?}", program, exit_code);

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code,
            success: output.status.success(),
        })
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> Result<SessionExit> {
        tracing::debug!("run_interactive: {} ({} args)", program, args.len());

        // Inherited stdio gives the child the terminal directly; no shell is
        // involved, so the arguments are never re-parsed.
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to launch {}", program))?;

        let status = child
            .wait()
            .with_context(|| format!("Failed waiting for {}", program))?;

        Ok(SessionExit {
            exit_code: status.code(),
        })
    }

    fn locate(&self, program: &str) -> bool {
        let path = Path::new(program);
        if path.components().count() > 1 {
            return path.is_file();
        }

        Command::new(LOCATOR)
            .arg(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Run a read-only diagnostic and return its stdout for an error message.
///
/// Failure to start the diagnostic is folded into the returned text so the
/// configuration error it decorates is still reported.
pub fn diagnostic_listing(runner: &dyn CommandRunner, program: &str, args: &[String]) -> String {
    match runner.capture(program, args) {
        Ok(output) => output.stdout,
        Err(e) => {
            tracing::warn!("Diagnostic {} could not be run: {:#}", program, e);
            format!("(unable to run {}: {:#})\n", program, e)
        }
    }
}
