//! Immutable run configuration.
//!
//! A [`RunConfig`] is snapshotted once from the parsed CLI at startup
//! and never mutated afterwards; every stage reads from the same
//! snapshot, which is what guarantees that dry-run and real-run make
//! identical decisions for identical filesystem state.

use std::env;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::duplicates::KeepPolicy;

/// What happens to redundant files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupMode {
    /// Relocate into the given quarantine root, recording a restore
    /// ledger.
    Quarantine(PathBuf),
    /// Permanent removal; no ledger, no restore script.
    Delete,
}

/// Immutable configuration snapshot for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Scan roots, absolutized where possible
    pub roots: Vec<PathBuf>,
    /// Path prefixes pruned from the scan
    pub excludes: Vec<PathBuf>,
    /// Minimum candidate file size in bytes
    pub min_size: u64,
    /// Hashing worker count
    pub parallel: usize,
    /// Keeper policy per duplicate group
    pub keep: KeepPolicy,
    /// Quarantine or delete
    pub mode: CleanupMode,
    /// When true, nothing on disk is touched
    pub dry_run: bool,
    /// Whether the aging pass runs at all
    pub temp_clean: bool,
    /// Aging pass target directories
    pub temp_dirs: Vec<PathBuf>,
    /// Aging threshold in days
    pub temp_age_days: u64,
    /// Where the run log and restore script are written
    pub report_dir: PathBuf,
    /// Timestamp shared by this run's artifacts
    pub run_stamp: String,
}

impl RunConfig {
    /// Build the snapshot from parsed CLI arguments.
    ///
    /// Defaults: scan roots are the home directory plus the system
    /// temp dir; the quarantine root, aging target and report
    /// directory all default to locations under the system temp dir.
    /// `--delete` takes precedence when both it and `--quarantine`
    /// are given.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let run_stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let temp = env::temp_dir();

        let roots = if cli.paths.is_empty() {
            default_roots(&temp)
        } else {
            cli.paths.iter().map(|p| absolutize(p.clone())).collect()
        };

        let mode = if cli.delete {
            if cli.quarantine.is_some() {
                log::warn!("--delete takes precedence over --quarantine");
            }
            CleanupMode::Delete
        } else {
            let root = cli
                .quarantine
                .clone()
                .unwrap_or_else(|| temp.join(format!("dupclean_quarantine_{run_stamp}")));
            CleanupMode::Quarantine(absolutize(root))
        };

        // Never scan into the quarantine tree; with default roots it
        // sits under temp, which is itself scanned.
        let mut excludes = cli.excludes.clone();
        if let CleanupMode::Quarantine(root) = &mode {
            excludes.push(root.clone());
        }

        Self {
            roots,
            excludes,
            min_size: cli.min_size,
            parallel: cli.parallel.max(1),
            keep: KeepPolicy::parse(&cli.keep),
            mode,
            dry_run: !cli.no_dry_run,
            temp_clean: !cli.no_temp_clean,
            temp_dirs: if cli.temp_dirs.is_empty() {
                vec![temp.clone()]
            } else {
                cli.temp_dirs.clone()
            },
            temp_age_days: cli.temp_age_days,
            report_dir: cli.report_dir.clone().unwrap_or(temp),
            run_stamp,
        }
    }
}

/// Default scan roots: home directory plus system temp.
fn default_roots(temp: &std::path::Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    match dirs::home_dir() {
        Some(home) => roots.push(home),
        None => log::warn!("cannot determine home directory, scanning temp only"),
    }
    roots.push(temp.to_path_buf());
    roots
}

/// Make a path absolute so quarantine destinations map cleanly.
///
/// Canonicalization fails for paths that do not exist yet (the
/// default quarantine root, for one); those are joined onto the
/// current directory instead.
fn absolutize(path: PathBuf) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        path
    } else {
        env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
    }
}
