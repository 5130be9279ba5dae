//! Scan command: read-only report of where the space went

use std::path::{Path, PathBuf};

use anyhow::Result;
use reclaim_core::{
    Catalog, CleanupTarget, HostTools, downloads, largest_children, measure, snapshots,
};

use super::Settings;
use crate::ui::table::{claims_table, scan_table};
use crate::ui::{Output, format_size};

/// Subdirectories smaller than this are not listed.
pub const LARGE_DIR_BYTES: u64 = 512 * 1024 * 1024;

/// At most this many large subdirectories per location.
pub const LARGE_DIR_LIMIT: usize = 10;

/// One measured catalog location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRow {
    pub path: PathBuf,
    pub label: String,
    pub size: u64,
    pub elevated: bool,
}

impl ScanRow {
    pub fn measured(target: &CleanupTarget, size: u64) -> Self {
        Self {
            path: target.path.clone(),
            label: target.label.clone(),
            size,
            elevated: target.elevated,
        }
    }

    /// An elevated location that measured empty was most likely unreadable.
    pub fn needs_sudo(&self) -> bool {
        self.elevated && self.size == 0
    }
}

/// Measure every existing catalog location, largest first.
pub fn measure_catalog(catalog: &Catalog) -> Vec<ScanRow> {
    let mut rows: Vec<ScanRow> = catalog
        .targets
        .iter()
        .filter(|t| t.path.exists())
        .map(|t| ScanRow::measured(t, measure(&t.path)))
        .collect();
    rows.sort_by(|a, b| b.size.cmp(&a.size));
    rows
}

/// Parents whose immediate children are checked for bulk.
pub fn key_locations(home: &Path) -> Vec<(PathBuf, &'static str)> {
    vec![
        (home.join("Library"), "User Library"),
        (PathBuf::from("/Library"), "System Library"),
        (PathBuf::from("/private/var"), "System var"),
    ]
}

pub fn scan(settings: &Settings, output: &Output) -> Result<()> {
    let catalog = settings.load_catalog()?;

    output.section("Locations");
    let rows = measure_catalog(&catalog);
    if rows.is_empty() {
        output.warning("No known locations exist on this machine.");
    } else {
        output.print(scan_table(&rows));
        println!();
        let total: u64 = rows.iter().map(|r| r.size).sum();
        output.success(&format!("Total scanned: {}", format_size(total)));
    }

    output.section("Large subdirectories");
    for (root, desc) in key_locations(&settings.home) {
        if !root.is_dir() {
            continue;
        }
        output.info(&format!("Scanning {desc}..."));
        let found = largest_children(&root, LARGE_DIR_BYTES, LARGE_DIR_LIMIT);
        if found.is_empty() {
            continue;
        }
        output.print(format!("{desc}:"));
        for (dir, size) in found {
            output.print(format!("  {}: {}", dir.display(), format_size(size)));
        }
    }

    if let Some(dir) = &catalog.downloads {
        output.section("Downloads");
        let claims = downloads::plan(dir);
        if claims.is_empty() {
            output.info("Nothing in Downloads matches the sweep rules.");
        } else {
            output.print(claims_table(&claims));
            let total: u64 = claims.iter().map(downloads::Claim::bytes).sum();
            output.success(&format!("Sweep would move {}", format_size(total)));
        }
    }

    output.section("Time Machine local snapshots");
    match snapshots::count_local(&HostTools) {
        Ok(None) => output.warning("tmutil not found"),
        Ok(Some(0)) => output.success("No local snapshots"),
        Ok(Some(n)) => output.warning(&format!(
            "{n} local snapshots; a cleanup run asks tmutil to thin them"
        )),
        Err(e) => output.warning(&format!("Could not list local snapshots: {e}")),
    }
    Ok(())
}
