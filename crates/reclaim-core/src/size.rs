//! Subtree size probing.
//!
//! [`measure`] reports allocated disk usage the way `du -sk` does: symlinks
//! are not followed, a hard-linked inode is counted once, and anything that
//! cannot be read is left out of the sum instead of failing the caller.

use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Allocated size in bytes of `path` and everything beneath it.
///
/// Returns 0 for a path that does not exist.
pub fn measure(path: &Path) -> u64 {
    let mut seen = HashSet::new();
    let mut total: u64 = 0;

    for entry in WalkDir::new(path).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // The root itself missing is the common case, not worth logging
                if e.depth() > 0 {
                    debug!(error = %e, "size probe skipped unreadable entry");
                }
                continue;
            }
        };
        let Ok(meta) = entry.metadata() else {
            debug!(path = %entry.path().display(), "size probe could not stat entry");
            continue;
        };
        if is_repeat_link(&meta, &mut seen) {
            continue;
        }
        total = total.saturating_add(allocated(&meta));
    }

    total
}

/// Immediate subdirectories of `root` whose allocated size is at least
/// `min_bytes`, largest first, at most `limit` of them.
///
/// Symlinked directories are not descended into. An unreadable or missing
/// `root` yields an empty list.
pub fn largest_children(root: &Path, min_bytes: u64, limit: usize) -> Vec<(PathBuf, u64)> {
    let Ok(read) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut found: Vec<(PathBuf, u64)> = read
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| {
            let path = e.path();
            let size = measure(&path);
            (path, size)
        })
        .filter(|(_, size)| *size > 0 && *size >= min_bytes)
        .collect();

    found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    found.truncate(limit);
    found
}

#[cfg(unix)]
fn allocated(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    // st_blocks is always in 512-byte units, independent of st_blksize
    meta.blocks().saturating_mul(512)
}

#[cfg(not(unix))]
fn allocated(meta: &Metadata) -> u64 {
    meta.len()
}

#[cfg(unix)]
fn is_repeat_link(meta: &Metadata, seen: &mut HashSet<(u64, u64)>) -> bool {
    use std::os::unix::fs::MetadataExt;
    if meta.is_dir() || meta.nlink() < 2 {
        return false;
    }
    !seen.insert((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn is_repeat_link(_meta: &Metadata, _seen: &mut HashSet<(u64, u64)>) -> bool {
    false
}
