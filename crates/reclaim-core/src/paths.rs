//! Well-known locations under the user's home.

use dirs::home_dir;
use std::path::{Path, PathBuf};

use crate::error::{ReclaimError, Result};

/// Returns the user's home directory, or None if it cannot be resolved.
pub fn try_home() -> Option<PathBuf> {
    home_dir()
}

/// Returns the user's home directory.
///
/// # Errors
///
/// Returns [`ReclaimError::NoHome`] if it cannot be resolved.
pub fn home() -> Result<PathBuf> {
    try_home().ok_or(ReclaimError::NoHome)
}

/// Per-user recoverable trash: ~/.Trash
///
/// # Errors
///
/// Fails when the home directory is unknown.
pub fn default_trash_root() -> Result<PathBuf> {
    Ok(home()?.join(".Trash"))
}

/// Expand a leading `~` or `~/` against `home`. Other paths are returned as-is.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = Path::new("/Users/alex");
        assert_eq!(
            expand_home("~/Library/Caches", home),
            PathBuf::from("/Users/alex/Library/Caches")
        );
        assert_eq!(expand_home("~", home), PathBuf::from("/Users/alex"));
        assert_eq!(
            expand_home("/Library/Caches", home),
            PathBuf::from("/Library/Caches")
        );
        // Only a leading tilde is special
        assert_eq!(expand_home("a/~/b", home), PathBuf::from("a/~/b"));
        assert_eq!(expand_home("~other", home), PathBuf::from("~other"));
    }
}
