//! Terminal output for commands.
//!
//! Everything is written synchronously in call order. `--quiet` drops
//! progress and informational lines; results, warnings, and errors are
//! always shown.

use std::fmt::Display;

use crossterm::style::Stylize;
use reclaim_core::{Reporter, StepReport};

use super::theme::{Theme, format_size};

/// Handle used by commands (and the orchestrator, through [`Reporter`]).
#[derive(Debug, Clone, Default)]
pub struct Output {
    theme: Theme,
    quiet: bool,
}

impl Output {
    /// Create a new output handle.
    pub fn new(quiet: bool) -> Self {
        Self {
            theme: Theme::default(),
            quiet,
        }
    }

    /// Prints a visual section header for an operation phase.
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!(
            "{} {}",
            title.bold(),
            "─".repeat(40).with(self.theme.colors.header)
        );
    }

    /// Prints a result block (tables, totals). Never suppressed.
    pub fn print(&self, content: impl Display) {
        println!("{content}");
    }

    /// Prints an informational message to the console.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {}", self.theme.icons.info, msg);
        }
    }

    /// Prints a success message to the console.
    pub fn success(&self, msg: &str) {
        println!(
            "{} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            msg.with(self.theme.colors.success)
        );
    }

    /// Prints a warning message to the console.
    pub fn warning(&self, msg: &str) {
        println!(
            "{} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        );
    }

    /// Prints an error message to the console.
    pub fn error(&self, msg: &str) {
        eprintln!(
            "{} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            msg.with(self.theme.colors.error)
        );
    }
}

/// One-line summary of a finished step, without styling.
pub fn step_line(step: &StepReport) -> String {
    if !step.ran {
        return match &step.note {
            Some(note) => format!("{}: {note}", step.label),
            None => format!("{}: skipped", step.label),
        };
    }
    let mut line = format!("{}: {} freed", step.label, format_size(step.bytes_freed));
    if step.destroyed > 0 {
        line.push_str(&format!(", {} deleted permanently", step.destroyed));
    }
    if step.skipped > 0 {
        line.push_str(&format!(", {} skipped", step.skipped));
    }
    line
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        self.section(title);
    }

    fn step_started(&self, label: &str) {
        if !self.quiet {
            println!(
                "  {} {}",
                self.theme.icons.active.with(self.theme.colors.secondary),
                label.with(self.theme.colors.label)
            );
        }
    }

    fn step_finished(&self, step: &StepReport) {
        if self.quiet {
            return;
        }
        let icon = if step.ran && step.skipped > 0 {
            self.theme.icons.warning.with(self.theme.colors.warning)
        } else if step.ran {
            self.theme.icons.success.with(self.theme.colors.success)
        } else {
            self.theme.icons.idle.with(self.theme.colors.secondary)
        };
        println!("  {icon} {}", step_line(step));
    }

    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn success(&self, msg: &str) {
        self.success(msg);
    }

    fn warning(&self, msg: &str) {
        self.warning(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }
}
