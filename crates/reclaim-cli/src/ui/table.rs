//! Result tables: plan, run report, scan, and Downloads claims.
//!
//! Borderless, header plus rows, sizes right-aligned.

use comfy_table::presets::NOTHING;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use reclaim_core::downloads::Claim;
use reclaim_core::{Catalog, RunReport, TargetKind};

use super::theme::format_size;
use crate::cmd::scan::ScanRow;

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn size_cell(bytes: u64) -> Cell {
    Cell::new(format_size(bytes)).set_alignment(CellAlignment::Right)
}

fn count_cell(n: usize) -> Cell {
    let text = if n == 0 { "-".to_string() } else { n.to_string() };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// What a bare `reclaim` is about to do.
pub fn plan_table(catalog: &Catalog) -> Table {
    let mut table = new_table(&["Target", "Path", "Cleanup"]);

    for target in catalog.actionable() {
        let mode = match (target.kind, target.is_recoverable()) {
            (TargetKind::Swap, _) => Cell::new("non-recoverable (swap files)").fg(Color::Yellow),
            (_, true) => Cell::new("recoverable (trash)"),
            (_, false) => Cell::new("non-recoverable if needed").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&target.label),
            Cell::new(target.path.display()),
            mode,
        ]);
    }
    if let Some(dir) = &catalog.downloads {
        table.add_row(vec![
            Cell::new(reclaim_core::downloads::DOWNLOADS_LABEL),
            Cell::new(dir.display()),
            Cell::new("recoverable (trash)"),
        ]);
    }
    if catalog.snapshots {
        table.add_row(vec![
            Cell::new("Time Machine Local Snapshots"),
            Cell::new("/"),
            Cell::new("thinned by tmutil"),
        ]);
    }
    if let Some(command) = &catalog.package_manager {
        table.add_row(vec![
            Cell::new(format!(
                "{} cleanup",
                command.first().map_or("package manager", String::as_str)
            )),
            Cell::new(command.join(" ")),
            Cell::new("delegated"),
        ]);
    }
    table
}

/// Per-step outcome of a run.
pub fn step_table(report: &RunReport) -> Table {
    let mut table = new_table(&["Step", "Freed", "Moved", "Deleted", "Skipped", "Note"]);
    for step in &report.steps {
        let skipped = if step.skipped > 0 {
            count_cell(step.skipped).fg(Color::Yellow)
        } else {
            count_cell(0)
        };
        table.add_row(vec![
            Cell::new(&step.label),
            size_cell(step.bytes_freed),
            count_cell(step.relocated),
            count_cell(step.destroyed),
            skipped,
            Cell::new(step.note.as_deref().unwrap_or("")),
        ]);
    }
    table
}

/// Read-only measurements, in the order given.
pub fn scan_table(rows: &[ScanRow]) -> Table {
    let mut table = new_table(&["Path", "Description", "Size", "Access"]);
    for row in rows {
        let access = if row.needs_sudo() {
            Cell::new("sudo needed").fg(Color::Yellow)
        } else {
            Cell::new("user access").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(row.path.display()),
            Cell::new(&row.label),
            size_cell(row.size),
            access,
        ]);
    }
    table
}

/// What the Downloads sweep would move.
pub fn claims_table(claims: &[Claim]) -> Table {
    let mut table = new_table(&["Entry", "Rule", "Size"]);
    for claim in claims {
        let names: Vec<String> = claim
            .parts
            .iter()
            .filter_map(|(p, _)| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        table.add_row(vec![
            Cell::new(names.join(" + ")),
            Cell::new(claim.rule.describe()),
            size_cell(claim.bytes()),
        ]);
    }
    table
}
