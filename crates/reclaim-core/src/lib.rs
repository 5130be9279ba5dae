//! reclaim-core - disk space reclamation engine
//!
//! Measures, relocates, and (where unavoidable) destroys the contents of
//! well-known cache, log, and temporary directories.
//!
//! # Pieces
//!
//! - [`size`] - allocated on-disk size of a subtree (`du` semantics)
//! - [`trash`] - timestamped batch directories inside the recoverable trash
//! - [`remover`] - relocate-into-batch with an elevated destructive fallback
//! - [`downloads`] - the Downloads folder heuristics
//! - [`orchestrator`] - the sequential driver that folds a run report
//!
//! Nothing here prints. Progress flows through the [`Reporter`] trait so the
//! same engine can be driven by the terminal UI or by tests.

pub mod catalog;
pub mod downloads;
pub mod error;
pub mod escalate;
pub mod orchestrator;
pub mod paths;
pub mod platform;
pub mod remover;
pub mod reporter;
pub mod size;
pub mod snapshots;
pub mod tools;
pub mod trash;

pub use catalog::{Catalog, CleanupTarget, TargetKind};
pub use downloads::{DownloadsSweep, MatchRule, SweepReport};
pub use error::{ReclaimError, Result};
pub use escalate::{DirectEscalator, Escalator, SudoEscalator};
pub use orchestrator::{Orchestrator, RunReport, StepKind, StepReport};
pub use paths::*;
pub use remover::{EntryOutcome, ReclaimReport, SafeRemover};
pub use reporter::{NullReporter, Reporter};
pub use size::{largest_children, measure};
pub use tools::{HostTools, SystemTools, ToolOutput};
pub use trash::TrashBatch;

/// Version of the cleanup engine, logged at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
