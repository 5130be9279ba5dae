//! Subcommand implementations

pub mod clean;
pub mod completions;
pub mod scan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use reclaim_core::Catalog;

use crate::Cli;

/// Everything a command needs that was decided by flags or environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub home: PathBuf,
    pub catalog: Option<PathBuf>,
    pub trash_root: PathBuf,
}

impl Settings {
    /// Resolve flags, environment, and defaults (in that order).
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let home = reclaim_core::home()?;
        let trash_root = match &cli.trash_dir {
            Some(dir) => dir.clone(),
            None => reclaim_core::default_trash_root()?,
        };
        Ok(Self {
            home,
            catalog: cli.catalog.clone(),
            trash_root,
        })
    }

    /// The operator's catalog, or the built-in macOS one.
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path, &self.home)
                .with_context(|| format!("Failed to load catalog {}", path.display())),
            None => Ok(Catalog::macos_default(&self.home)),
        }
    }
}
