//! External system utilities (package manager, snapshot tooling).
//!
//! The orchestrator only ever asks two things of a tool: is it installed,
//! and run it. Output is captured for logging and for the few places that
//! need to count lines; exit codes are never treated as fatal.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Captured result of running a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Locates and runs external programs.
pub trait SystemTools: Debug {
    /// Absolute path of `program` if it is installed.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args` to completion.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput>;

    /// Convenience for `locate(..).is_some()`.
    fn is_installed(&self, program: &str) -> bool {
        self.locate(program).is_some()
    }
}

/// Tools found on the host `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostTools;

impl SystemTools for HostTools {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput> {
        debug!(program, ?args, "running tool");
        let output = Command::new(program).args(args).output()?;
        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
