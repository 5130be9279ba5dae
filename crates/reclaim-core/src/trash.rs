//! Timestamped batch directories inside the recoverable trash.
//!
//! A batch is named `<label>_<YYYYMMDD_HHMMSS>` with path separators in the
//! label replaced by `_`. Two batches for the same label created within the
//! same second get a `-2`, `-3`, ... suffix rather than sharing a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use fs_extra::file;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ReclaimError, Result};

/// Timestamp format used in batch directory names.
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Upper bound on same-second suffixes tried before giving up.
const MAX_SUFFIX: u32 = 1000;

/// One batch directory owned by a single cleanup action.
#[derive(Debug, Clone)]
pub struct TrashBatch {
    path: PathBuf,
}

impl TrashBatch {
    /// Create a fresh batch under `root` for `label`, stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`ReclaimError::BatchCreate`] if the directory cannot be made.
    pub fn create(root: &Path, label: &str) -> Result<Self> {
        Self::create_at(root, label, Local::now())
    }

    /// Create a fresh batch stamped with `at`.
    ///
    /// Never reuses an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`ReclaimError::BatchCreate`] if the directory cannot be made.
    pub fn create_at(root: &Path, label: &str, at: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(root).map_err(|source| ReclaimError::BatchCreate {
            path: root.to_path_buf(),
            source,
        })?;

        let base = batch_dir_name(label, at);
        for attempt in 1..=MAX_SUFFIX {
            let name = if attempt == 1 {
                base.clone()
            } else {
                format!("{base}-{attempt}")
            };
            let candidate = root.join(&name);
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    debug!(batch = %candidate.display(), "created trash batch");
                    return Ok(Self { path: candidate });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(source) => {
                    return Err(ReclaimError::BatchCreate {
                        path: candidate,
                        source,
                    });
                }
            }
        }

        Err(ReclaimError::BatchCreate {
            path: root.join(base),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free batch name"),
        })
    }

    /// Directory holding the relocated entries.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where `entry` would land inside this batch, keeping its file name.
    ///
    /// A name already taken in the batch gets a numeric suffix.
    ///
    /// # Errors
    ///
    /// Fails if `entry` has no file name or every suffix is taken.
    pub fn destination_for(&self, entry: &Path) -> io::Result<PathBuf> {
        let name = entry.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", entry.display()),
            )
        })?;

        let first = self.path.join(name);
        if fs::symlink_metadata(&first).is_err() {
            return Ok(first);
        }
        let name = name.to_string_lossy();
        (2..=MAX_SUFFIX)
            .map(|n| self.path.join(format!("{name}-{n}")))
            .find(|p| fs::symlink_metadata(p).is_err())
            .ok_or_else(|| io::Error::new(io::ErrorKind::AlreadyExists, "no free entry name"))
    }

    /// Move `entry` into the batch, returning its new location.
    ///
    /// Same-volume moves are a rename. When the trash lives on another volume
    /// the entry is copied, symlinks as links, and then removed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the entry stays where it was.
    pub fn relocate(&self, entry: &Path) -> io::Result<PathBuf> {
        let dest = self.destination_for(entry)?;
        move_entry(entry, &dest)?;
        Ok(dest)
    }
}

/// Directory name for a batch: label with separators replaced, then the timestamp.
pub fn batch_dir_name(label: &str, at: DateTime<Local>) -> String {
    let label: String = label
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{label}_{}", at.format(BATCH_TIMESTAMP_FORMAT))
}

fn move_entry(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), "rename crosses volumes, copying instead");
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

/// Copy `from` to `to` without following any symlink, then remove `from`.
///
/// The source is only removed once the whole copy has succeeded. On failure
/// the partial copy is discarded and the source is left untouched.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = copy_tree(from, to) {
        if let Err(cleanup) = remove_entry(to) {
            debug!(path = %to.display(), error = %cleanup, "could not discard partial copy");
        }
        return Err(e);
    }
    remove_entry(from)
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from)
        .follow_links(false)
        .follow_root_links(false)
    {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let dest = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };

        let kind = entry.file_type();
        if kind.is_symlink() {
            copy_link(entry.path(), &dest)?;
        } else if kind.is_dir() {
            fs::create_dir(&dest)?;
        } else if kind.is_file() {
            file::copy(entry.path(), &dest, &file::CopyOptions::new())
                .map_err(|e| io::Error::other(e.to_string()))?;
        } else {
            let path = entry.path().display();
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{path} is not a file, directory, or symlink"),
            ));
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, dest)
}

#[cfg(not(unix))]
fn copy_link(link: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot recreate symlink {}", link.display()),
    ))
}

/// Remove a file, symlink, or directory tree. Symlinks are never followed.
fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
