//! Error types for the reclamation engine.
//!
//! Almost every failure in this crate is swallowed per entry and surfaced
//! as a value in a report. The variants here cover the few that are not.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an operation instead of being recorded per entry.
#[derive(Error, Debug)]
pub enum ReclaimError {
    /// An I/O error outside of per-entry processing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog file could not be deserialized.
    #[error("Catalog parse error: {0}")]
    Catalog(#[from] toml::de::Error),

    /// The trash batch directory could not be created.
    #[error("Failed to create trash batch at {}: {source}", path.display())]
    BatchCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The host operating system is not supported.
    #[error("Unsupported platform: {found} (reclaim only runs on {expected})")]
    UnsupportedPlatform {
        /// OS the binary is running on.
        found: &'static str,
        /// OS required.
        expected: &'static str,
    },

    /// The user's home directory could not be resolved.
    #[error("Could not determine home directory")]
    NoHome,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReclaimError>;
