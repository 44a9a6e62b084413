//! Age-based cleanup of temporary directories.
//!
//! Independent of duplicate detection: a file here is removed purely
//! because its modification time is older than the cutoff, whether or
//! not it has duplicates anywhere. Directories are never removed,
//! symlinks are never followed, and excluded prefixes are pruned
//! without descending into them — the quarantine tree sits under the
//! system temp dir by default, and moved files keep their old mtimes,
//! so sweeping it would invalidate the restore script.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::report::RunReport;

/// Parameters for one aging pass.
#[derive(Debug, Clone)]
pub struct AgingConfig {
    /// Directories to sweep
    pub dirs: Vec<PathBuf>,
    /// Path prefixes never swept (the quarantine tree among them)
    pub excludes: Vec<PathBuf>,
    /// Files modified more than this many days ago are removed
    pub max_age_days: u64,
    /// Report what would be removed without removing it
    pub dry_run: bool,
}

/// What an aging pass did.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgingStats {
    /// Regular files examined
    pub scanned: usize,
    /// Files older than the cutoff
    pub matched: usize,
    /// Files actually removed (zero under dry-run)
    pub removed: usize,
    /// Bytes freed (or freeable under dry-run)
    pub bytes_reclaimed: u64,
    /// Files that could not be inspected or removed
    pub failures: usize,
}

/// Sweep the configured directories, removing files older than the
/// cutoff. Missing directories and unreadable entries are skipped
/// with a warning; nothing here is fatal.
pub fn clean_aged(config: &AgingConfig, report: &mut RunReport) -> AgingStats {
    let cutoff = age_cutoff(config.max_age_days);
    let mut stats = AgingStats::default();

    for dir in &config.dirs {
        if !dir.is_dir() {
            log::debug!("aging: skipping missing directory {}", dir.display());
            continue;
        }
        log::info!(
            "aging: sweeping {} (older than {} days)",
            dir.display(),
            config.max_age_days
        );
        sweep_dir(dir, cutoff, config, report, &mut stats);
    }

    stats
}

/// Modification-time cutoff for the given threshold.
///
/// Thresholds too large to represent clamp to the epoch, which makes
/// every file younger than the cutoff.
fn age_cutoff(max_age_days: u64) -> SystemTime {
    let age = max_age_days
        .checked_mul(86_400)
        .map(Duration::from_secs)
        .unwrap_or(Duration::MAX);
    SystemTime::now()
        .checked_sub(age)
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn sweep_dir(
    dir: &Path,
    cutoff: SystemTime,
    config: &AgingConfig,
    report: &mut RunReport,
    stats: &mut AgingStats,
) {
    let walk = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !config
                .excludes
                .iter()
                .any(|prefix| entry.path().starts_with(prefix))
        });

    for entry in walk {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("aging: {}", e);
                report.warn(&format!("aging: {e}"));
                stats.failures += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.scanned += 1;

        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("aging: metadata for {}: {}", entry.path().display(), e);
                stats.failures += 1;
                continue;
            }
        };
        let modified = match meta.modified() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("aging: mtime for {}: {}", entry.path().display(), e);
                stats.failures += 1;
                continue;
            }
        };
        if modified >= cutoff {
            continue;
        }
        stats.matched += 1;

        if config.dry_run {
            log::info!("aging: would remove {}", entry.path().display());
            report.aged(entry.path(), true);
            stats.bytes_reclaimed += meta.len();
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                log::info!("aging: removed {}", entry.path().display());
                report.aged(entry.path(), false);
                stats.removed += 1;
                stats.bytes_reclaimed += meta.len();
            }
            Err(e) => {
                log::warn!("aging: remove {}: {}", entry.path().display(), e);
                report.error(&format!("aging remove failed: {}: {e}", entry.path().display()));
                stats.failures += 1;
            }
        }
    }
}
