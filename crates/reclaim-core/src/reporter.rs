//! Reporter trait for dependency injection
//!
//! This trait allows the orchestrator to report progress and status without
//! being coupled to a specific terminal implementation.

use crate::orchestrator::StepReport;

/// Receives progress from a cleanup run.
pub trait Reporter: Send + Sync {
    /// Indicates a new section of the run has started (e.g. "Caches").
    fn section(&self, title: &str);

    /// A step is about to touch `label`.
    fn step_started(&self, label: &str);

    /// A step finished; `step` carries its freed bytes and entry counts.
    fn step_finished(&self, step: &StepReport);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn step_started(&self, label: &str) {
        (**self).step_started(label);
    }
    fn step_finished(&self, step: &StepReport) {
        (**self).step_finished(step);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn step_started(&self, _: &str) {}
    fn step_finished(&self, _: &StepReport) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
