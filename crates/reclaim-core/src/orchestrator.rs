//! Sequential cleanup driver.
//!
//! Every step produces a [`StepReport`]; the run total is the sum of those
//! reports, folded at the end rather than accumulated in shared state.
//! Steps are independent: nothing one step does or fails to do changes
//! whether the next step runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::{Catalog, CleanupTarget, TargetKind};
use crate::downloads::{DOWNLOADS_LABEL, DownloadsSweep, SweepReport};
use crate::remover::{ReclaimReport, SafeRemover};
use crate::reporter::Reporter;
use crate::size::measure;
use crate::snapshots;
use crate::tools::SystemTools;

/// File name prefix of the OS-managed swap files.
pub const SWAPFILE_PREFIX: &str = "swapfile";

/// Which kind of step produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// SafeRemover over a catalog directory.
    Target,
    /// Swap files deleted outright.
    Swap,
    /// Downloads heuristics.
    Downloads,
    /// Local snapshot thinning, delegated to `tmutil`.
    Snapshots,
    /// Package manager cache cleanup, delegated to the tool.
    PackageManager,
}

/// Result of one step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Label shown to the operator.
    pub label: String,
    /// Step kind.
    pub kind: StepKind,
    /// Bytes freed, 0 for delegated steps.
    pub bytes_freed: u64,
    /// Entries moved into the trash.
    pub relocated: usize,
    /// Entries permanently deleted.
    pub destroyed: usize,
    /// Entries left in place.
    pub skipped: usize,
    /// Batch directory created by the step, if any.
    pub batch: Option<PathBuf>,
    /// False when the step could not run (tool absent, batch failure).
    pub ran: bool,
    /// Short remark for the operator.
    pub note: Option<String>,
}

impl StepReport {
    fn new(label: &str, kind: StepKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
            bytes_freed: 0,
            relocated: 0,
            destroyed: 0,
            skipped: 0,
            batch: None,
            ran: true,
            note: None,
        }
    }

    fn not_run(label: &str, kind: StepKind, note: impl Into<String>) -> Self {
        Self {
            ran: false,
            note: Some(note.into()),
            ..Self::new(label, kind)
        }
    }

    fn from_reclaim(kind: StepKind, report: &ReclaimReport) -> Self {
        Self {
            bytes_freed: report.bytes_freed(),
            relocated: report.relocated(),
            destroyed: report.destroyed(),
            skipped: report.skipped(),
            batch: report.batch.clone(),
            ran: report.error.is_none(),
            note: report.error.clone(),
            ..Self::new(&report.label, kind)
        }
    }

    fn from_sweep(report: &SweepReport) -> Self {
        Self {
            bytes_freed: report.bytes_freed(),
            relocated: report.relocated(),
            skipped: report.skipped(),
            batch: report.batch.clone(),
            ran: report.error.is_none(),
            note: report.error.clone(),
            ..Self::new(DOWNLOADS_LABEL, StepKind::Downloads)
        }
    }
}

/// Everything a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-step results in execution order.
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Total bytes freed across all steps.
    pub fn total(&self) -> u64 {
        self.steps.iter().map(|s| s.bytes_freed).sum()
    }

    /// Total entries left in place across all steps.
    pub fn skipped(&self) -> usize {
        self.steps.iter().map(|s| s.skipped).sum()
    }

    /// Total entries permanently deleted across all steps.
    pub fn destroyed(&self) -> usize {
        self.steps.iter().map(|s| s.destroyed).sum()
    }
}

/// Drives one cleanup run over a catalog.
#[derive(Debug)]
pub struct Orchestrator {
    catalog: Catalog,
    remover: SafeRemover,
    tools: Box<dyn SystemTools>,
}

impl Orchestrator {
    /// Build an orchestrator; nothing runs until [`Orchestrator::run`].
    pub fn new(catalog: Catalog, remover: SafeRemover, tools: Box<dyn SystemTools>) -> Self {
        Self {
            catalog,
            remover,
            tools,
        }
    }

    /// Run every step in order and return the folded report.
    pub fn run(&self, reporter: &dyn Reporter) -> RunReport {
        let mut steps = Vec::new();

        reporter.section("Cleaning caches and logs");
        for target in self.catalog.actionable() {
            reporter.step_started(&target.label);
            let step = match target.kind {
                TargetKind::Swap => self.swap_step(target),
                _ => self.target_step(target),
            };
            reporter.step_finished(&step);
            steps.push(step);
        }

        if let Some(downloads) = &self.catalog.downloads {
            reporter.section("Sweeping Downloads");
            reporter.step_started(DOWNLOADS_LABEL);
            let step = self.downloads_step(downloads);
            reporter.step_finished(&step);
            steps.push(step);
        }

        if self.catalog.snapshots {
            reporter.section("Local snapshots");
            let step = self.snapshot_step(reporter);
            reporter.step_finished(&step);
            steps.push(step);
        }

        if let Some(command) = &self.catalog.package_manager {
            reporter.section("Package manager");
            let step = self.package_manager_step(command, reporter);
            reporter.step_finished(&step);
            steps.push(step);
        }

        let report = RunReport { steps };
        info!(total = report.total(), steps = report.steps.len(), "run finished");
        report
    }

    fn target_step(&self, target: &CleanupTarget) -> StepReport {
        let report = self
            .remover
            .reclaim(&target.path, &target.label, target.elevated);
        StepReport::from_reclaim(StepKind::Target, &report)
    }

    fn swap_step(&self, target: &CleanupTarget) -> StepReport {
        let mut step = StepReport::new(&target.label, StepKind::Swap);
        let swapfiles = swapfiles_in(&target.path);
        if swapfiles.is_empty() {
            return step;
        }

        let before = measure(&target.path);
        for file in &swapfiles {
            match self.remover.escalator().remove(file) {
                Ok(()) => step.destroyed += 1,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "could not delete swap file");
                    step.skipped += 1;
                }
            }
        }
        step.bytes_freed = before.saturating_sub(measure(&target.path));
        step
    }

    fn downloads_step(&self, downloads: &Path) -> StepReport {
        let sweep = DownloadsSweep::new(self.remover.trash_root());
        StepReport::from_sweep(&sweep.sweep(downloads))
    }

    fn snapshot_step(&self, reporter: &dyn Reporter) -> StepReport {
        const LABEL: &str = "Time Machine Local Snapshots";
        reporter.step_started(LABEL);

        let count = match snapshots::count_local(self.tools.as_ref()) {
            Ok(Some(count)) => count,
            Ok(None) => {
                reporter.warning("tmutil not found, skipping snapshot thinning");
                return StepReport::not_run(LABEL, StepKind::Snapshots, "tmutil not found");
            }
            Err(e) => {
                reporter.warning(&format!("could not list local snapshots: {e}"));
                return StepReport::not_run(LABEL, StepKind::Snapshots, "snapshot listing failed");
            }
        };
        if count == 0 {
            let mut step = StepReport::new(LABEL, StepKind::Snapshots);
            step.note = Some("no local snapshots".to_string());
            return step;
        }

        let mut step = StepReport::new(LABEL, StepKind::Snapshots);
        let note = match snapshots::thin(self.tools.as_ref()) {
            Ok(true) => format!("thinning {count} snapshots, space is released by the OS"),
            Ok(false) => {
                reporter.warning("tmutil thinlocalsnapshots reported a failure");
                format!("{count} snapshots, thinning failed")
            }
            Err(e) => {
                reporter.warning(&format!("could not run tmutil: {e}"));
                step.ran = false;
                format!("{count} snapshots, tmutil did not run")
            }
        };
        step.note = Some(note);
        step
    }

    fn package_manager_step(&self, command: &[String], reporter: &dyn Reporter) -> StepReport {
        let Some((program, args)) = command.split_first() else {
            return StepReport::not_run(
                "Package manager",
                StepKind::PackageManager,
                "empty command",
            );
        };
        let label = format!("{program} cleanup");
        reporter.step_started(&label);

        if !self.tools.is_installed(program) {
            reporter.warning(&format!("{program} not found, skipping package manager cleanup"));
            let note = format!("{program} not found");
            return StepReport::not_run(&label, StepKind::PackageManager, note);
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut step = StepReport::new(&label, StepKind::PackageManager);
        match self.tools.run(program, &args) {
            Ok(out) => {
                info!(program, success = out.success, "package manager cleanup finished");
                step.note = Some("not measured".to_string());
            }
            Err(e) => {
                warn!(program, error = %e, "package manager cleanup did not run");
                step.ran = false;
                step.note = Some(e.to_string());
            }
        }
        step
    }
}

/// Regular files directly in `dir` whose names start with `swapfile`.
fn swapfiles_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(rd) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = rd
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with(SWAPFILE_PREFIX))
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}
