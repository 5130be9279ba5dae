//! End-to-end cleanup scenarios against temporary directory trees.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reclaim_core::downloads::{self, MatchRule};
use reclaim_core::{
    Catalog, CleanupTarget, DirectEscalator, DownloadsSweep, EntryOutcome, Escalator,
    NullReporter, Orchestrator, SafeRemover, StepKind, SystemTools, TargetKind, ToolOutput,
    measure,
};
use tempfile::TempDir;

fn sized_file(dir: &Path, name: &str, len: u64) -> PathBuf {
    let path = dir.join(name);
    fs::File::create(&path).unwrap().set_len(len).unwrap();
    path
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug)]
struct NoTools;

impl SystemTools for NoTools {
    fn locate(&self, _: &str) -> Option<PathBuf> {
        None
    }
    fn run(&self, program: &str, _: &[&str]) -> io::Result<ToolOutput> {
        Err(io::Error::new(io::ErrorKind::NotFound, program.to_string()))
    }
}

/// Relocation is refused across the privilege boundary; deletion works.
#[derive(Debug)]
struct PrivilegeBoundary;

impl Escalator for PrivilegeBoundary {
    fn relocate(&self, _: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "Operation not permitted",
        ))
    }
    fn remove(&self, path: &Path) -> io::Result<()> {
        DirectEscalator.remove(path)
    }
}

#[test]
fn downloads_sweep_relocates_everything_but_jpeg() {
    let tmp = TempDir::new().unwrap();
    let dl = tmp.path().join("Downloads");
    let trash = tmp.path().join(".Trash");
    fs::create_dir(&dl).unwrap();

    let notes = sized_file(&dl, "notes.txt", 2_000);
    let zip = sized_file(&dl, "build.zip", 20_000_000);
    let build = dl.join("build");
    fs::create_dir_all(build.join("obj")).unwrap();
    sized_file(&build, "app.bin", 25_000_000);
    sized_file(&build.join("obj"), "main.o", 5_000_000);
    let tiny = sized_file(&dl, "tiny.bin", 10);
    sized_file(&dl, "cover.jpeg", 3_000_000);
    let icon = sized_file(&dl, "icon.png", 200 * 1024);

    let expected = fs::metadata(&notes).unwrap().len()
        + fs::metadata(&zip).unwrap().len()
        + measure(&build)
        + fs::metadata(&tiny).unwrap().len()
        + fs::metadata(&icon).unwrap().len();

    let report = DownloadsSweep::new(&trash).sweep(&dl);

    assert_eq!(report.bytes_freed(), expected);
    assert_eq!(names_in(&dl), vec!["cover.jpeg"]);
    assert_eq!(report.skipped(), 0);

    let batch = report.batch.expect("a batch is created");
    assert_eq!(
        names_in(&batch),
        vec!["build", "build.zip", "icon.png", "notes.txt", "tiny.bin"]
    );
    // One batch for the whole sweep
    assert_eq!(names_in(&trash).len(), 1);

    let rules: Vec<MatchRule> = report.claims.iter().map(|c| c.rule).collect();
    assert_eq!(
        rules,
        vec![
            MatchRule::ZipWithFolder,
            MatchRule::Text,
            MatchRule::SmallFile,
            MatchRule::Image,
        ]
    );
}

#[test]
fn downloads_plan_does_not_move_anything() {
    let tmp = TempDir::new().unwrap();
    sized_file(tmp.path(), "lonely.zip", 1_000_000);
    sized_file(tmp.path(), "photo.JPG", 1_000_000);

    let claims = downloads::plan(tmp.path());
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].rule, MatchRule::StandaloneZip);
    assert_eq!(claims[0].bytes(), 1_000_000);
    assert_eq!(names_in(tmp.path()), vec!["lonely.zip", "photo.JPG"]);
}

#[test]
fn reclaim_leaves_target_empty_and_batch_holds_children() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("Caches");
    let trash = tmp.path().join(".Trash");
    fs::create_dir_all(target.join("com.example.app/fsCachedData")).unwrap();
    fs::write(target.join("com.example.app/fsCachedData/blob"), vec![5u8; 90_000]).unwrap();
    fs::write(target.join(".DS_Store"), vec![0u8; 6_148]).unwrap();
    fs::write(target.join("index.db"), vec![1u8; 30_000]).unwrap();
    let before = names_in(&target);

    let remover = SafeRemover::new(&trash, Box::new(DirectEscalator));
    let report = remover.reclaim(&target, "User Caches", false);

    assert!(report.bytes_freed() > 0);
    assert!(target.is_dir());
    assert!(names_in(&target).is_empty());
    assert_eq!(names_in(&trash).len(), 1);
    assert_eq!(names_in(report.batch.as_ref().unwrap()), before);
    assert!(
        report
            .batch
            .as_ref()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("User Caches_")
    );

    let again = remover.reclaim(&target, "User Caches", false);
    assert_eq!(again.bytes_freed(), 0);
    assert_eq!(names_in(&trash).len(), 1);
}

#[test]
fn elevated_target_falls_back_to_destruction() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("Library/Caches");
    let trash = tmp.path().join(".Trash");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("com.apple.iconservices.store"), vec![3u8; 128 * 1024]).unwrap();

    let remover = SafeRemover::new(&trash, Box::new(PrivilegeBoundary));
    let report = remover.reclaim(&target, "System Caches", true);

    assert!(report.bytes_freed() > 0);
    assert!(names_in(&target).is_empty());
    assert!(names_in(report.batch.as_ref().unwrap()).is_empty());
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(report.outcomes[0], EntryOutcome::Destroyed { .. }));
}

#[test]
fn full_run_folds_totals_and_isolates_failures() {
    let tmp = TempDir::new().unwrap();
    let home = tmp.path();
    let trash = home.join(".Trash");

    let caches = home.join("Library/Caches");
    let logs = home.join("Library/Logs");
    let dl = home.join("Downloads");
    fs::create_dir_all(&caches).unwrap();
    fs::create_dir_all(&logs).unwrap();
    fs::create_dir_all(&dl).unwrap();
    fs::write(caches.join("a.cache"), vec![1u8; 50_000]).unwrap();
    fs::write(logs.join("system.log"), vec![2u8; 70_000]).unwrap();
    sized_file(&dl, "readme.txt", 1_024);

    let catalog_text = r#"
downloads = "~/Downloads"
snapshots = true
package_manager = ["brew", "cleanup", "-s"]

[[target]]
path = "~/Library/Caches"
label = "User Caches"

[[target]]
path = "~/Library/Missing"
label = "Missing"

[[target]]
path = "~/Library/Logs"
label = "User Logs"
"#;
    let catalog = Catalog::parse(catalog_text, home).unwrap();
    let orch = Orchestrator::new(
        catalog,
        SafeRemover::new(&trash, Box::new(DirectEscalator)),
        Box::new(NoTools),
    );

    let report = orch.run(&NullReporter);

    let kinds: Vec<StepKind> = report.steps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::Target,
            StepKind::Target,
            StepKind::Target,
            StepKind::Downloads,
            StepKind::Snapshots,
            StepKind::PackageManager,
        ]
    );
    assert_eq!(report.steps[1].bytes_freed, 0);
    assert!(report.steps[1].batch.is_none());
    assert!(report.steps[0].bytes_freed > 0);
    assert!(report.steps[2].bytes_freed > 0);
    assert_eq!(report.steps[3].bytes_freed, 1_024);
    assert!(!report.steps[4].ran);
    assert!(!report.steps[5].ran);
    assert_eq!(
        report.total(),
        report.steps.iter().map(|s| s.bytes_freed).sum::<u64>()
    );
    // Caches, Logs, Downloads
    assert_eq!(names_in(&trash).len(), 3);
}

#[test]
fn swap_target_in_catalog_bypasses_trash() {
    let tmp = TempDir::new().unwrap();
    let vm = tmp.path().join("vm");
    let trash = tmp.path().join(".Trash");
    fs::create_dir(&vm).unwrap();
    fs::write(vm.join("swapfile0"), vec![4u8; 96 * 1024]).unwrap();

    let catalog = Catalog {
        targets: vec![CleanupTarget {
            path: vm.clone(),
            label: "Virtual Memory Swap Files".to_string(),
            elevated: true,
            kind: TargetKind::Swap,
        }],
        ..Catalog::default()
    };
    let orch = Orchestrator::new(
        catalog,
        SafeRemover::new(&trash, Box::new(DirectEscalator)),
        Box::new(NoTools),
    );

    let report = orch.run(&NullReporter);
    assert_eq!(report.destroyed(), 1);
    assert!(report.total() > 0);
    assert!(names_in(&vm).is_empty());
    assert!(!trash.exists());
}
