//! External process execution behind an injectable [`Executor`] trait.
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

impl ExecResult {
    /// The most useful diagnostic text: stderr when present, else stdout.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs external programs.
///
/// Calls block until the child exits; there is no timeout.
///
/// A non-zero exit is reported in [`ExecResult::success`], not as an error.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` in `dir`, returning the result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Whether `program` resolves on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        tracing::debug!("exec: {program} {} (in {})", args.join(" "), dir.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
