//! Downloads folder heuristics.
//!
//! Only direct children of the folder are considered. Rules run in a fixed
//! order and the first rule to match an entry claims it; later rules never
//! see a claimed entry, so nothing is moved or counted twice. Every claim is
//! relocated into one shared batch, never deleted.
//!
//! Anything no rule names is protected by default. In particular `.jpeg`
//! and every other photo format besides `png` and `jpg` stay in place.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::remover::EntryOutcome;
use crate::size::measure;
use crate::trash::TrashBatch;

/// Files strictly smaller than this (and non-empty) are claimed as stray.
pub const SMALL_FILE_LIMIT: u64 = 100 * 1024;

/// Directory extensions that mark an extracted build project.
pub const PROJECT_MARKERS: &[&str] = &["xcodeproj", "xcworkspace"];

/// Label used for the sweep's trash batch.
pub const DOWNLOADS_LABEL: &str = "Downloads";

/// Selection rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// `X.zip` next to a directory `X`; both claimed together.
    ZipWithFolder,
    /// Any other `*.zip`.
    StandaloneZip,
    /// `*.txt`.
    Text,
    /// Regular file with `0 < len < 100 KiB`.
    SmallFile,
    /// Directory containing an Xcode project or workspace anywhere below it.
    EmbeddedProject,
    /// `*.png` or `*.jpg`, nothing else.
    Image,
}

impl MatchRule {
    /// All rules in the order they are applied.
    pub const ALL: [Self; 6] = [
        Self::ZipWithFolder,
        Self::StandaloneZip,
        Self::Text,
        Self::SmallFile,
        Self::EmbeddedProject,
        Self::Image,
    ];

    /// Short human description.
    pub fn describe(self) -> &'static str {
        match self {
            Self::ZipWithFolder => "archive + extracted folder",
            Self::StandaloneZip => "archive",
            Self::Text => "text note",
            Self::SmallFile => "small file",
            Self::EmbeddedProject => "project folder",
            Self::Image => "image",
        }
    }

    /// Whether this rule selects `entry`. For [`MatchRule::ZipWithFolder`]
    /// the sibling folder must also be present in `listing`.
    pub fn matches(self, entry: &Entry, listing: &Listing) -> bool {
        match self {
            Self::ZipWithFolder => entry.is_file() && listing.extracted_folder(entry).is_some(),
            Self::StandaloneZip => entry.is_file() && has_extension(&entry.path, &["zip"]),
            Self::Text => entry.is_file() && has_extension(&entry.path, &["txt"]),
            Self::SmallFile => entry.len.is_some_and(|len| len > 0 && len < SMALL_FILE_LIMIT),
            Self::EmbeddedProject => entry.is_dir && contains_project(&entry.path),
            Self::Image => entry.is_file() && has_extension(&entry.path, &["png", "jpg"]),
        }
    }
}

/// A direct child of the Downloads folder.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path.
    pub path: PathBuf,
    /// File length for regular files, None otherwise.
    pub len: Option<u64>,
    /// True for real directories (symlinks excluded).
    pub is_dir: bool,
}

impl Entry {
    /// True for regular files (symlinks excluded).
    pub fn is_file(&self) -> bool {
        self.len.is_some()
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Pre-move size: file length for files, allocated size for directories.
    pub fn size(&self) -> u64 {
        self.len.unwrap_or_else(|| measure(&self.path))
    }
}

/// Depth-1 listing of a directory, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl Listing {
    /// Read the direct children of `dir`. Missing or unreadable → empty.
    pub fn read(dir: &Path) -> Self {
        let mut entries: Vec<Entry> = match fs::read_dir(dir) {
            Ok(rd) => rd
                .flatten()
                .filter_map(|e| {
                    let meta = e.metadata().ok()?;
                    Some(Entry {
                        path: e.path(),
                        len: meta.is_file().then(|| meta.len()),
                        is_dir: meta.is_dir(),
                    })
                })
                .collect(),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "downloads folder not readable");
                Vec::new()
            }
        };
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name(), i))
            .collect();
        Self { entries, by_name }
    }

    /// All entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The directory a zip archive was extracted into, if it sits alongside it.
    pub fn extracted_folder(&self, archive: &Entry) -> Option<&Entry> {
        if !has_extension(&archive.path, &["zip"]) {
            return None;
        }
        let stem = archive.path.file_stem()?.to_string_lossy();
        self.by_name
            .get(&*stem)
            .map(|&i| &self.entries[i])
            .filter(|e| e.is_dir)
    }
}

/// One claimed unit: a single entry, or an archive with its folder.
#[derive(Debug, Clone)]
pub struct Claim {
    /// Rule that claimed the unit.
    pub rule: MatchRule,
    /// Paths in the unit with their pre-move sizes.
    pub parts: Vec<(PathBuf, u64)>,
}

impl Claim {
    /// Combined pre-move size of the unit.
    pub fn bytes(&self) -> u64 {
        self.parts.iter().map(|(_, b)| b).sum()
    }
}

/// Apply every rule to `dir` without moving anything.
pub fn plan(dir: &Path) -> Vec<Claim> {
    let listing = Listing::read(dir);
    let mut taken: HashSet<&Path> = HashSet::new();
    let mut claims = Vec::new();

    for rule in MatchRule::ALL {
        for entry in listing.entries() {
            if taken.contains(entry.path.as_path()) || !rule.matches(entry, &listing) {
                continue;
            }

            let mut unit = vec![entry];
            if rule == MatchRule::ZipWithFolder {
                match listing.extracted_folder(entry) {
                    Some(folder) if !taken.contains(folder.path.as_path()) => unit.push(folder),
                    // Folder already paired with another archive
                    _ => continue,
                }
            }

            for e in &unit {
                taken.insert(e.path.as_path());
            }
            claims.push(Claim {
                rule,
                parts: unit.iter().map(|e| (e.path.clone(), e.size())).collect(),
            });
        }
    }

    claims
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Batch holding the relocated entries, if one was needed.
    pub batch: Option<PathBuf>,
    /// Everything the rules selected.
    pub claims: Vec<Claim>,
    /// One outcome per claimed path.
    pub outcomes: Vec<EntryOutcome>,
    /// Sum of pre-move sizes of the paths that were relocated.
    pub freed: u64,
    /// Set when the batch could not be created and nothing was moved.
    pub error: Option<String>,
}

impl SweepReport {
    /// Bytes freed by the sweep.
    pub fn bytes_freed(&self) -> u64 {
        self.freed
    }

    /// Paths moved into the batch.
    pub fn relocated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_removed()).count()
    }

    /// Paths left in place after a failed move.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.relocated()
    }
}

/// Runs the Downloads heuristics against a trash root.
#[derive(Debug, Clone)]
pub struct DownloadsSweep {
    trash_root: PathBuf,
}

impl DownloadsSweep {
    /// Sweep into batches under `trash_root`.
    pub fn new(trash_root: impl Into<PathBuf>) -> Self {
        Self {
            trash_root: trash_root.into(),
        }
    }

    /// Relocate every claimed entry of `dir` into one shared batch.
    pub fn sweep(&self, dir: &Path) -> SweepReport {
        let claims = plan(dir);
        if claims.is_empty() {
            debug!(dir = %dir.display(), "downloads sweep found nothing");
            return SweepReport::default();
        }

        let mut report = SweepReport {
            claims,
            ..SweepReport::default()
        };

        let batch = match TrashBatch::create(&self.trash_root, DOWNLOADS_LABEL) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "cannot create downloads batch, leaving folder untouched");
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.batch = Some(batch.path().to_path_buf());

        for claim in &report.claims {
            for (path, bytes) in &claim.parts {
                let outcome = match batch.relocate(path) {
                    Ok(to) => {
                        report.freed += bytes;
                        EntryOutcome::Relocated {
                            from: path.clone(),
                            to,
                        }
                    }
                    Err(e) => {
                        warn!(entry = %path.display(), error = %e, "skipping download");
                        EntryOutcome::Skipped {
                            path: path.clone(),
                            reason: e.to_string(),
                        }
                    }
                };
                report.outcomes.push(outcome);
            }
        }

        info!(
            claims = report.claims.len(),
            freed = report.freed,
            "downloads sweep finished"
        );
        report
    }
}

/// Whole-extension, ASCII case-insensitive comparison.
fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

fn contains_project(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .flatten()
        .any(|e| e.file_type().is_dir() && has_extension(e.path(), PROJECT_MARKERS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file(dir: &Path, name: &str, len: u64) -> PathBuf {
        let path = dir.join(name);
        let f = fs::File::create(&path).unwrap();
        f.set_len(len).unwrap();
        path
    }

    fn claimed_names(claims: &[Claim]) -> Vec<(MatchRule, Vec<String>)> {
        claims
            .iter()
            .map(|c| {
                let names = c
                    .parts
                    .iter()
                    .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
                    .collect();
                (c.rule, names)
            })
            .collect()
    }

    fn rule_for(claims: &[Claim], name: &str) -> Option<MatchRule> {
        claims
            .iter()
            .find(|c| c.parts.iter().any(|(p, _)| p.file_name().unwrap() == name))
            .map(|c| c.rule)
    }

    #[test]
    fn test_image_rule_exact_extensions() {
        let tmp = TempDir::new().unwrap();
        // Large enough that the small-file rule cannot claim them
        let big = SMALL_FILE_LIMIT * 3;
        file(tmp.path(), "photo.JPEG", big);
        file(tmp.path(), "photo.JPG", big);
        file(tmp.path(), "photo.jpg.jpeg", big);
        file(tmp.path(), "icon.Png", big);

        let claims = plan(tmp.path());
        assert_eq!(rule_for(&claims, "photo.JPG"), Some(MatchRule::Image));
        assert_eq!(rule_for(&claims, "icon.Png"), Some(MatchRule::Image));
        assert_eq!(rule_for(&claims, "photo.JPEG"), None);
        assert_eq!(rule_for(&claims, "photo.jpg.jpeg"), None);
    }

    #[test]
    fn test_zip_paired_with_folder() {
        let tmp = TempDir::new().unwrap();
        file(tmp.path(), "archive.zip", 500_000);
        fs::create_dir(tmp.path().join("archive")).unwrap();
        file(&tmp.path().join("archive"), "payload.bin", 700_000);
        file(tmp.path(), "lonely.zip", 500_000);

        let claims = plan(tmp.path());
        let names = claimed_names(&claims);
        assert_eq!(names.len(), 2);
        assert_eq!(
            names[0],
            (
                MatchRule::ZipWithFolder,
                vec!["archive.zip".to_string(), "archive".to_string()]
            )
        );
        assert_eq!(
            names[1],
            (MatchRule::StandaloneZip, vec!["lonely.zip".to_string()])
        );
    }

    #[test]
    fn test_zip_pair_size_is_sum() {
        let tmp = TempDir::new().unwrap();
        file(tmp.path(), "build.zip", 400_000);
        let folder = tmp.path().join("build");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("a.o"), vec![9u8; 300_000]).unwrap();

        let claims = plan(tmp.path());
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].bytes(), 400_000 + measure(&folder));
    }

    #[test]
    fn test_zip_with_same_named_file_is_standalone() {
        let tmp = TempDir::new().unwrap();
        file(tmp.path(), "data.zip", 500_000);
        file(tmp.path(), "data", 500_000);

        let claims = plan(tmp.path());
        assert_eq!(rule_for(&claims, "data.zip"), Some(MatchRule::StandaloneZip));
        assert_eq!(rule_for(&claims, "data"), None);
    }

    #[test]
    fn test_small_file_bounds() {
        let tmp = TempDir::new().unwrap();
        file(tmp.path(), "empty.bin", 0);
        file(tmp.path(), "k99.bin", 99 * 1024);
        file(tmp.path(), "k100.bin", 100 * 1024);
        file(tmp.path(), "k101.bin", 101 * 1024);

        let claims = plan(tmp.path());
        assert_eq!(rule_for(&claims, "k99.bin"), Some(MatchRule::SmallFile));
        assert_eq!(rule_for(&claims, "empty.bin"), None);
        assert_eq!(rule_for(&claims, "k100.bin"), None);
        assert_eq!(rule_for(&claims, "k101.bin"), None);
    }

    #[test]
    fn test_text_claimed_before_small_file() {
        let tmp = TempDir::new().unwrap();
        file(tmp.path(), "notes.TXT", 2048);
        file(tmp.path(), "empty.txt", 0);

        let claims = plan(tmp.path());
        assert_eq!(rule_for(&claims, "notes.TXT"), Some(MatchRule::Text));
        // Zero-byte exemption is only for the small-file rule
        assert_eq!(rule_for(&claims, "empty.txt"), Some(MatchRule::Text));
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn test_embedded_project_anywhere_in_subtree() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("MyApp-main/src/ios/MyApp.xcodeproj");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir_all(tmp.path().join("Photos/2023")).unwrap();
        // A file with the marker extension is not a project descriptor
        fs::create_dir_all(tmp.path().join("Decoy")).unwrap();
        file(&tmp.path().join("Decoy"), "fake.xcodeproj", 10);

        let claims = plan(tmp.path());
        assert_eq!(
            rule_for(&claims, "MyApp-main"),
            Some(MatchRule::EmbeddedProject)
        );
        assert_eq!(rule_for(&claims, "Photos"), None);
        assert_eq!(rule_for(&claims, "Decoy"), None);
    }

    #[test]
    fn test_nested_files_not_considered() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("folder");
        fs::create_dir(&sub).unwrap();
        file(&sub, "inner.txt", 10);
        file(&sub, "inner.zip", 10);

        assert!(plan(tmp.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_never_claimed() {
        let tmp = TempDir::new().unwrap();
        let real = file(tmp.path(), "real.bin", 1_000_000);
        std::os::unix::fs::symlink(&real, tmp.path().join("link.txt")).unwrap();

        assert!(plan(tmp.path()).is_empty());
    }

    #[test]
    fn test_each_entry_claimed_once() {
        let tmp = TempDir::new().unwrap();
        // Small, text, and zip all at once
        file(tmp.path(), "tiny.zip", 10);
        file(tmp.path(), "tiny.txt", 10);
        file(tmp.path(), "tiny.png", 10);

        let claims = plan(tmp.path());
        assert_eq!(claims.len(), 3);
        assert_eq!(rule_for(&claims, "tiny.zip"), Some(MatchRule::StandaloneZip));
        assert_eq!(rule_for(&claims, "tiny.txt"), Some(MatchRule::Text));
        assert_eq!(rule_for(&claims, "tiny.png"), Some(MatchRule::SmallFile));
    }

    #[test]
    fn test_sweep_missing_folder() {
        let tmp = TempDir::new().unwrap();
        let sweep = DownloadsSweep::new(tmp.path().join("trash"));
        let report = sweep.sweep(&tmp.path().join("Downloads"));
        assert_eq!(report.bytes_freed(), 0);
        assert!(report.batch.is_none());
        assert!(!tmp.path().join("trash").exists());
    }

    #[test]
    fn test_sweep_nothing_claimed_creates_no_batch() {
        let tmp = TempDir::new().unwrap();
        let downloads = tmp.path().join("Downloads");
        fs::create_dir(&downloads).unwrap();
        file(&downloads, "cover.jpeg", 3_000_000);

        let report = DownloadsSweep::new(tmp.path().join("trash")).sweep(&downloads);
        assert!(report.batch.is_none());
        assert!(downloads.join("cover.jpeg").exists());
    }
}
