//! The target catalog: which directories a run touches and how.
//!
//! The catalog is plain configuration. The built-in table covers macOS; any
//! other table can be supplied as TOML:
//!
//! ```toml
//! downloads = "~/Downloads"
//! snapshots = true
//! package_manager = ["brew", "cleanup", "-s"]
//!
//! [[target]]
//! path = "~/Library/Caches"
//! label = "User Caches"
//!
//! [[target]]
//! path = "/private/var/vm"
//! label = "Swap Files"
//! elevated = true
//! kind = "swap"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::paths::expand_home;

/// How the orchestrator treats a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Relocate the directory's children into the trash.
    #[default]
    Contents,
    /// Permanently delete `swapfile*` files in the directory.
    Swap,
    /// Measured by `scan`, never cleaned.
    Report,
}

/// One directory the run knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTarget {
    /// Directory on disk, home already expanded.
    pub path: PathBuf,
    /// Human description, also used to name the trash batch.
    pub label: String,
    /// Needs administrator rights; cleanup may be non-recoverable.
    pub elevated: bool,
    /// What to do with it.
    pub kind: TargetKind,
}

impl CleanupTarget {
    /// Whether anything removed from this target may be gone for good.
    pub fn is_recoverable(&self) -> bool {
        !self.elevated && self.kind == TargetKind::Contents
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    path: String,
    label: String,
    #[serde(default)]
    elevated: bool,
    #[serde(default)]
    kind: TargetKind,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default, rename = "target")]
    targets: Vec<RawTarget>,
    #[serde(default)]
    downloads: Option<String>,
    #[serde(default)]
    snapshots: bool,
    #[serde(default)]
    package_manager: Option<Vec<String>>,
}

/// The full set of work for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Directories in presentation order.
    pub targets: Vec<CleanupTarget>,
    /// Downloads folder to sweep, if any.
    pub downloads: Option<PathBuf>,
    /// Thin Time Machine local snapshots.
    pub snapshots: bool,
    /// Package manager cache cleanup command line, program first.
    pub package_manager: Option<Vec<String>>,
}

impl Catalog {
    /// Parse a TOML catalog, expanding `~/` against `home`.
    ///
    /// # Errors
    ///
    /// Returns [`ReclaimError::Catalog`] on malformed TOML or unknown keys.
    pub fn parse(text: &str, home: &Path) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(text)?;
        Ok(Self {
            targets: raw
                .targets
                .into_iter()
                .map(|t| CleanupTarget {
                    path: expand_home(&t.path, home),
                    label: t.label,
                    elevated: t.elevated,
                    kind: t.kind,
                })
                .collect(),
            downloads: raw.downloads.map(|d| expand_home(&d, home)),
            snapshots: raw.snapshots,
            package_manager: raw.package_manager.filter(|cmd| !cmd.is_empty()),
        })
    }

    /// Load a TOML catalog from disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path, home: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, home)
    }

    /// The built-in macOS catalog.
    pub fn macos_default(home: &Path) -> Self {
        use TargetKind::{Contents, Report, Swap};

        let user = |rel: &str, label: &str, kind: TargetKind| CleanupTarget {
            path: home.join(rel),
            label: label.to_string(),
            elevated: false,
            kind,
        };
        let system = |path: &str, label: &str, kind: TargetKind| CleanupTarget {
            path: PathBuf::from(path),
            label: label.to_string(),
            elevated: true,
            kind,
        };

        Self {
            targets: vec![
                user("Library/Caches", "User Caches", Contents),
                user("Library/Logs", "User Logs", Contents),
                user("Library/Developer/Xcode/DerivedData", "Xcode DerivedData", Contents),
                user("Library/Developer/Xcode/Archives", "Xcode Archives", Contents),
                user("Library/Developer/Xcode/iOS DeviceSupport", "iOS DeviceSupport", Contents),
                user("Library/Developer/CoreSimulator/Caches", "Simulator Caches", Contents),
                user(".npm/_cacache", "npm Cache", Contents),
                user(".gradle/caches", "Gradle Caches", Contents),
                user(".cargo/registry/cache", "Cargo Registry Cache", Contents),
                system("/Library/Caches", "System Caches", Contents),
                system("/Library/Logs", "System Library Logs", Contents),
                system("/private/var/log", "System Logs", Contents),
                system("/private/var/tmp", "System Temporary Files", Contents),
                system("/private/var/vm", "Virtual Memory Swap Files", Swap),
                user("Library/Application Support", "User Application Support", Report),
                user("Library/Containers", "User App Containers", Report),
                user("Library/Mail", "Mail Data", Report),
                user(
                    "Library/Application Support/MobileSync/Backup",
                    "iOS Device Backups",
                    Report,
                ),
                user("Library/Containers/com.docker.docker", "Docker Data", Report),
                user(".Trash", "Trash", Report),
                system("/private/var/db", "System Databases", Report),
                system("/System/Library/Caches", "System Library Caches", Report),
            ],
            downloads: Some(home.join("Downloads")),
            snapshots: true,
            package_manager: Some(["brew", "cleanup", "-s"].map(String::from).to_vec()),
        }
    }

    /// Targets that a run actually cleans.
    pub fn actionable(&self) -> impl Iterator<Item = &CleanupTarget> {
        self.targets.iter().filter(|t| t.kind != TargetKind::Report)
    }
}
