//! Time Machine local snapshots, driven through `tmutil`.

use std::io;

use crate::tools::SystemTools;

/// Snapshot management utility.
pub const TMUTIL: &str = "tmutil";

/// Prefix of every local snapshot name in `tmutil listlocalsnapshots` output.
pub const SNAPSHOT_PREFIX: &str = "com.apple.TimeMachine";

/// Bytes `tmutil` is asked to reclaim when thinning.
pub const THIN_PURGE_BYTES: u64 = 10_000_000_000;

/// Urgency passed to `tmutil thinlocalsnapshots` (1-4, 4 is most aggressive).
pub const THIN_URGENCY: u8 = 4;

/// Count snapshot names in `tmutil listlocalsnapshots` output.
pub fn count_in_listing(listing: &str) -> usize {
    listing
        .lines()
        .filter(|line| line.trim_start().starts_with(SNAPSHOT_PREFIX))
        .count()
}

/// Number of local snapshots on `/`, or `Ok(None)` if `tmutil` is not installed.
///
/// # Errors
///
/// Returns an error if `tmutil` cannot be spawned or exits unsuccessfully.
pub fn count_local(tools: &dyn SystemTools) -> io::Result<Option<usize>> {
    if !tools.is_installed(TMUTIL) {
        return Ok(None);
    }
    let out = tools.run(TMUTIL, &["listlocalsnapshots", "/"])?;
    if !out.success {
        let stderr = out.stderr.trim();
        return Err(io::Error::other(format!("tmutil listlocalsnapshots failed: {stderr}")));
    }
    Ok(Some(count_in_listing(&out.stdout)))
}

/// Ask `tmutil` (via `sudo`) to thin local snapshots on `/`.
///
/// Returns once `tmutil` does; the OS may keep reclaiming afterwards.
///
/// # Errors
///
/// Returns an error if `sudo` cannot be spawned.
pub fn thin(tools: &dyn SystemTools) -> io::Result<bool> {
    let purge = THIN_PURGE_BYTES.to_string();
    let urgency = THIN_URGENCY.to_string();
    let out = tools.run(
        "sudo",
        &[TMUTIL, "thinlocalsnapshots", "/", &purge, &urgency],
    )?;
    Ok(out.success)
}
