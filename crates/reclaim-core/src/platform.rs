//! Host platform check, performed once before any mutation.

use crate::error::{ReclaimError, Result};

/// The only operating system the built-in catalog targets.
pub const SUPPORTED_OS: &str = "macos";

/// Fail unless running on macOS.
///
/// # Errors
///
/// Returns [`ReclaimError::UnsupportedPlatform`] on any other host.
pub fn ensure_supported() -> Result<()> {
    check(std::env::consts::OS)
}

fn check(os: &'static str) -> Result<()> {
    if os == SUPPORTED_OS {
        Ok(())
    } else {
        Err(ReclaimError::UnsupportedPlatform {
            found: os,
            expected: SUPPORTED_OS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_is_supported() {
        assert!(check("macos").is_ok());
    }

    #[test]
    fn test_other_os_rejected() {
        let err = check("linux").unwrap_err();
        assert!(matches!(
            err,
            ReclaimError::UnsupportedPlatform { found: "linux", .. }
        ));
        assert!(err.to_string().contains("macos"));
    }

    #[test]
    fn test_ensure_supported_matches_target() {
        assert_eq!(ensure_supported().is_ok(), cfg!(target_os = "macos"));
    }
}
