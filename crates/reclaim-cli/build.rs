//! Stamps `RECLAIM_VERSION` for `reclaim --version`.
//!
//! A checkout sitting on a `v*` tag reports that tag. Any other checkout
//! reports the crate version with the abbreviated commit as build metadata,
//! and a tree without git reports the crate version alone.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    let crate_version = env!("CARGO_PKG_VERSION");
    let tag = git(&["describe", "--tags", "--exact-match", "--match", "v*"]);
    let version = if let Some(tag) = tag {
        tag.trim_start_matches('v').to_string()
    } else if let Some(commit) = git(&["rev-parse", "--short", "HEAD"]) {
        format!("{crate_version}+{commit}")
    } else {
        crate_version.to_string()
    };

    println!("cargo:rustc-env=RECLAIM_VERSION={version}");
}
