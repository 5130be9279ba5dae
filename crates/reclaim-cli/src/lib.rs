//! reclaim - disk space reclamation for macOS
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Empties well-known cache, log, and temporary directories into the
//! user's trash, sweeps leftovers out of Downloads, thins Time Machine
//! local snapshots, and asks Homebrew to drop its caches.
//!
//! # Layout
//!
//! - [`cmd`] - one module per subcommand
//! - [`ui`] - terminal output, theme, and tables
//!
//! The cleanup engine itself lives in `reclaim-core`; nothing in this crate
//! touches the filesystem except through it.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reclaim")]
#[command(
    author,
    version = env!("RECLAIM_VERSION"),
    about = "reclaim - free disk space on macOS"
)]
pub struct Cli {
    /// Skip the confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML file replacing the built-in target catalog
    #[arg(long, global = true, env = "RECLAIM_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Trash directory that receives relocated entries [default: ~/.Trash]
    #[arg(long, global = true, env = "RECLAIM_TRASH_DIR")]
    pub trash_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Measure every known location without changing anything
    Scan,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
