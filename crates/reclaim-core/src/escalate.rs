//! Privilege escalation for targets owned by the system.
//!
//! Each call performs exactly one filesystem mutation with elevated rights.
//! Prompting for and caching credentials is left to `sudo` itself.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

/// Executes single filesystem mutations across the privilege boundary.
pub trait Escalator: Debug {
    /// Move `from` to `to` (the full destination path, not its parent).
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Permanently delete `path`, recursively if it is a directory.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

impl<T: Escalator + ?Sized> Escalator for std::sync::Arc<T> {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).relocate(from, to)
    }
    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }
}

impl<T: Escalator + ?Sized> Escalator for Box<T> {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).relocate(from, to)
    }
    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }
}

/// Runs `mv` and `rm` through `sudo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SudoEscalator;

impl SudoEscalator {
    fn sudo(args: &[&str], paths: &[&Path]) -> io::Result<()> {
        let status = Command::new("sudo")
            .args(args)
            .arg("--")
            .args(paths)
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("sudo {} exited with {status}", args.join(" ")),
            ))
        }
    }
}

impl Escalator for SudoEscalator {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        debug!(from = %from.display(), to = %to.display(), "sudo mv");
        Self::sudo(&["mv", "-f"], &[from, to])
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "sudo rm -rf");
        Self::sudo(&["rm", "-rf"], &[path])
    }
}

/// Performs the mutations in-process with the current user's rights.
///
/// Used when the process already runs as root, and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectEscalator;

impl Escalator for DirectEscalator {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}
