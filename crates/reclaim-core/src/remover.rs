//! Recoverable removal of directory contents.
//!
//! [`SafeRemover::reclaim`] moves every direct child of a target directory
//! into a fresh [`TrashBatch`]. For elevated targets a child that cannot be
//! moved across the privilege boundary is destroyed instead, and the outcome
//! is recorded as [`EntryOutcome::Destroyed`] so it can be audited.
//!
//! Per-entry failures never abort the call. The freed figure is sampled from
//! the target before and after, so it can under-report if something else is
//! writing into the directory at the same time.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::escalate::Escalator;
use crate::size::measure;
use crate::trash::TrashBatch;

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Moved into the trash batch; recoverable.
    Relocated {
        /// Original location.
        from: PathBuf,
        /// Location inside the batch.
        to: PathBuf,
    },
    /// Permanently deleted after relocation failed. Not recoverable.
    Destroyed {
        /// Original location.
        path: PathBuf,
        /// Why relocation was abandoned.
        relocate_error: String,
    },
    /// Left in place.
    Skipped {
        /// Entry that was not touched.
        path: PathBuf,
        /// Error that caused the skip.
        reason: String,
    },
}

impl EntryOutcome {
    /// True if the entry is gone from its original location.
    pub fn is_removed(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }
}

/// Result of one reclaim call.
#[derive(Debug, Clone, Default)]
pub struct ReclaimReport {
    /// Label of the cleanup action.
    pub label: String,
    /// Batch that was created, if any.
    pub batch: Option<PathBuf>,
    /// Size sampled before any entry was touched.
    pub before: u64,
    /// Size sampled after the last entry was processed.
    pub after: u64,
    /// One outcome per processed entry.
    pub outcomes: Vec<EntryOutcome>,
    /// Set when the batch could not be created and nothing was done.
    pub error: Option<String>,
}

impl ReclaimReport {
    fn untouched(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Self::default()
        }
    }

    /// Bytes freed; never negative even if the target grew meanwhile.
    pub fn bytes_freed(&self) -> u64 {
        self.before.saturating_sub(self.after)
    }

    /// Entries moved into the batch.
    pub fn relocated(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Relocated { .. }))
    }

    /// Entries permanently deleted.
    pub fn destroyed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Destroyed { .. }))
    }

    /// Entries left in place.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Moves entries into timestamped batches under a trash root.
#[derive(Debug)]
pub struct SafeRemover {
    trash_root: PathBuf,
    escalator: Box<dyn Escalator>,
}

impl SafeRemover {
    /// Create a remover that files batches under `trash_root`.
    pub fn new(trash_root: impl Into<PathBuf>, escalator: Box<dyn Escalator>) -> Self {
        Self {
            trash_root: trash_root.into(),
            escalator,
        }
    }

    /// Root directory that batches are created in.
    pub fn trash_root(&self) -> &Path {
        &self.trash_root
    }

    /// The privilege escalation collaborator.
    pub fn escalator(&self) -> &dyn Escalator {
        self.escalator.as_ref()
    }

    /// Empty `target` into a new batch labelled `label`.
    ///
    /// A missing, non-directory, or empty target returns a zero report and
    /// creates no batch.
    pub fn reclaim(&self, target: &Path, label: &str, elevated: bool) -> ReclaimReport {
        let children = list_children(target);
        if children.is_empty() {
            debug!(target = %target.display(), "nothing to reclaim");
            return ReclaimReport::untouched(label);
        }

        let before = measure(target);
        let mut report = self.process(&children, label, elevated);
        if report.error.is_some() {
            return report;
        }
        report.before = before;
        report.after = measure(target);

        info!(
            label,
            freed = report.bytes_freed(),
            relocated = report.relocated(),
            destroyed = report.destroyed(),
            skipped = report.skipped(),
            "reclaimed target"
        );
        report
    }

    /// Move an explicit list of entries into a new batch labelled `label`.
    ///
    /// Entries may live in different directories. Missing entries are
    /// skipped; an empty list creates no batch.
    pub fn reclaim_entries(
        &self,
        entries: &[PathBuf],
        label: &str,
        elevated: bool,
    ) -> ReclaimReport {
        let present: Vec<PathBuf> = entries
            .iter()
            .filter(|e| fs::symlink_metadata(e).is_ok())
            .cloned()
            .collect();
        if present.is_empty() {
            return ReclaimReport::untouched(label);
        }

        let before = present.iter().map(|e| measure(e)).sum();
        let mut report = self.process(&present, label, elevated);
        if report.error.is_some() {
            return report;
        }
        report.before = before;
        report.after = present.iter().map(|e| measure(e)).sum();
        report
    }

    fn process(&self, entries: &[PathBuf], label: &str, elevated: bool) -> ReclaimReport {
        let mut report = ReclaimReport::untouched(label);

        let batch = match TrashBatch::create(&self.trash_root, label) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(label, error = %e, "cannot create trash batch, leaving target untouched");
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.batch = Some(batch.path().to_path_buf());

        report.outcomes = entries
            .iter()
            .map(|entry| {
                if elevated {
                    self.relocate_elevated(&batch, entry)
                } else {
                    relocate(&batch, entry)
                }
            })
            .collect();
        report
    }

    fn relocate_elevated(&self, batch: &TrashBatch, entry: &Path) -> EntryOutcome {
        let attempt = batch
            .destination_for(entry)
            .and_then(|dest| self.escalator.relocate(entry, &dest).map(|()| dest));

        let relocate_error = match attempt {
            Ok(to) => {
                return EntryOutcome::Relocated {
                    from: entry.to_path_buf(),
                    to,
                };
            }
            Err(e) => e,
        };

        debug!(
            entry = %entry.display(),
            error = %relocate_error,
            "relocation refused across privilege boundary, destroying"
        );
        match self.escalator.remove(entry) {
            Ok(()) => {
                warn!(entry = %entry.display(), "permanently deleted (not recoverable)");
                EntryOutcome::Destroyed {
                    path: entry.to_path_buf(),
                    relocate_error: relocate_error.to_string(),
                }
            }
            Err(e) => skipped(entry, &e),
        }
    }
}

fn relocate(batch: &TrashBatch, entry: &Path) -> EntryOutcome {
    match batch.relocate(entry) {
        Ok(to) => EntryOutcome::Relocated {
            from: entry.to_path_buf(),
            to,
        },
        Err(e) => skipped(entry, &e),
    }
}

fn skipped(entry: &Path, e: &std::io::Error) -> EntryOutcome {
    warn!(entry = %entry.display(), error = %e, "skipping entry");
    EntryOutcome::Skipped {
        path: entry.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Direct children of `dir`, hidden entries included. Empty if `dir` is
/// missing, not a directory, or unreadable.
fn list_children(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(rd) => rd.flatten().map(|e| e.path()).collect(),
        Err(e) => {
            if dir.exists() {
                warn!(target = %dir.display(), error = %e, "cannot list target");
            }
            Vec::new()
        }
    }
}
