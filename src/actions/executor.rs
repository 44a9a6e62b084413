//! Delete and quarantine-move execution.
//!
//! # Overview
//!
//! [`execute`] walks every duplicate group, asks the policy selector
//! for the keeper, and performs (or, under dry-run, only reports) one
//! action per redundant member. The keeper itself is never modified,
//! moved, or deleted.
//!
//! Quarantine destinations mirror the source tree:
//! `/data/photos/a.jpg` lands at `<root>/data/photos/a.jpg`, so the
//! mapping back to origin is computable from the path alone, and two
//! distinct sources can never collide on a destination.
//!
//! Per-file failures (permissions, disk full) are recorded on the
//! [`Action`] and the batch continues. The only fatal error is an
//! uncreatable quarantine root, raised before any mutation.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::{CleanupMode, RunConfig};
use crate::duplicates::{select_keeper, DuplicateGroup};
use crate::report::RunReport;

use super::{Action, ActionError, ActionKind, ActionOutcome, RestoreLedger};

/// Everything the action stage produced.
#[derive(Debug)]
pub struct ExecOutcome {
    /// One action per redundant file, in group order
    pub actions: Vec<Action>,
    /// Ledger of applied moves; `None` in delete mode
    pub ledger: Option<RestoreLedger>,
    /// Files actually removed from the scan roots
    pub files_removed: usize,
    /// Files a dry-run would have removed
    pub would_remove: usize,
    /// Bytes reclaimed (or reclaimable under dry-run)
    pub bytes_reclaimed: u64,
    /// Actions that failed
    pub failures: usize,
}

/// Map a source path to its quarantine destination.
///
/// The source's root (and, on Windows, prefix) components are
/// stripped and the remainder re-rooted under the quarantine root.
#[must_use]
pub fn quarantine_dest(root: &Path, source: &Path) -> PathBuf {
    let mut dest = root.to_path_buf();
    for component in source.components() {
        match component {
            Component::Normal(part) => dest.push(part),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            // Scan roots are absolutized before walking, so parent
            // components do not appear in practice; never let one
            // escape the quarantine root.
            Component::ParentDir => {}
        }
    }
    dest
}

/// Execute (or dry-run) cleanup actions over all duplicate groups.
///
/// # Errors
///
/// Returns [`ActionError::QuarantineSetup`] if the quarantine root
/// cannot be created; this aborts before any file is touched.
pub fn execute(
    groups: &[DuplicateGroup],
    config: &RunConfig,
    report: &mut RunReport,
) -> Result<ExecOutcome, ActionError> {
    let redundant_total: usize = groups.iter().map(DuplicateGroup::redundant_count).sum();

    let mut ledger = match &config.mode {
        CleanupMode::Quarantine(root) => {
            if !config.dry_run && redundant_total > 0 {
                fs::create_dir_all(root).map_err(|e| ActionError::QuarantineSetup {
                    path: root.clone(),
                    source: e,
                })?;
            }
            Some(RestoreLedger::new(root.clone()))
        }
        CleanupMode::Delete => None,
    };

    let mut outcome = ExecOutcome {
        actions: Vec::with_capacity(redundant_total),
        ledger: None,
        files_removed: 0,
        would_remove: 0,
        bytes_reclaimed: 0,
        failures: 0,
    };

    for group in groups {
        let keeper = select_keeper(&group.members, config.keep);
        log::debug!(
            "group {}: keeping {}",
            group.digest_hex(),
            group.members[keeper].path.display()
        );

        for (i, member) in group.members.iter().enumerate() {
            if i == keeper {
                continue;
            }

            let action = match (&config.mode, &mut ledger) {
                (CleanupMode::Delete, _) => delete_one(&member.path, config.dry_run, report),
                (CleanupMode::Quarantine(root), Some(ledger)) => {
                    quarantine_one(&member.path, root, config.dry_run, report, ledger)
                }
                // A ledger is created whenever the mode is quarantine
                (CleanupMode::Quarantine(_), None) => unreachable!(),
            };

            match action.outcome {
                ActionOutcome::Applied => {
                    outcome.files_removed += 1;
                    outcome.bytes_reclaimed += member.size;
                }
                ActionOutcome::WouldApply => {
                    outcome.would_remove += 1;
                    outcome.bytes_reclaimed += member.size;
                }
                ActionOutcome::Failed => outcome.failures += 1,
            }
            outcome.actions.push(action);
        }
    }

    outcome.ledger = ledger;
    Ok(outcome)
}

/// Delete (or report) one redundant file.
fn delete_one(source: &Path, dry_run: bool, report: &mut RunReport) -> Action {
    if dry_run {
        log::info!("would delete {}", source.display());
        report.would_delete(source);
        return Action {
            kind: ActionKind::Delete,
            source: source.to_path_buf(),
            dest: None,
            outcome: ActionOutcome::WouldApply,
        };
    }

    match fs::remove_file(source) {
        Ok(()) => {
            log::info!("deleted {}", source.display());
            report.deleted(source);
            Action {
                kind: ActionKind::Delete,
                source: source.to_path_buf(),
                dest: None,
                outcome: ActionOutcome::Applied,
            }
        }
        Err(e) => {
            log::warn!("failed to delete {}: {}", source.display(), e);
            report.error(&format!("delete failed: {}: {}", source.display(), e));
            Action {
                kind: ActionKind::Delete,
                source: source.to_path_buf(),
                dest: None,
                outcome: ActionOutcome::Failed,
            }
        }
    }
}

/// Quarantine-move (or report) one redundant file.
fn quarantine_one(
    source: &Path,
    root: &Path,
    dry_run: bool,
    report: &mut RunReport,
    ledger: &mut RestoreLedger,
) -> Action {
    let dest = quarantine_dest(root, source);

    if dry_run {
        log::info!("would move {} -> {}", source.display(), dest.display());
        report.would_move(source, &dest);
        return Action {
            kind: ActionKind::Move,
            source: source.to_path_buf(),
            dest: Some(dest),
            outcome: ActionOutcome::WouldApply,
        };
    }

    match move_file(source, &dest) {
        Ok(()) => {
            log::info!("moved {} -> {}", source.display(), dest.display());
            report.moved(source, &dest);
            ledger.push(dest.clone(), source.to_path_buf());
            Action {
                kind: ActionKind::Move,
                source: source.to_path_buf(),
                dest: Some(dest),
                outcome: ActionOutcome::Applied,
            }
        }
        Err(e) => {
            log::warn!("failed to move {}: {}", source.display(), e);
            report.error(&format!("move failed: {}: {}", source.display(), e));
            Action {
                kind: ActionKind::Move,
                source: source.to_path_buf(),
                dest: Some(dest),
                outcome: ActionOutcome::Failed,
            }
        }
    }
}

/// Move a file, creating destination parents as needed.
///
/// Rename fails across filesystem boundaries; fall back to
/// copy-then-remove in that case.
fn move_file(source: &Path, dest: &Path) -> Result<(), ActionError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ActionError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    if let Err(e) = fs::copy(source, dest) {
        // A copy that dies mid-write (disk full) leaves a truncated
        // file in the quarantine tree
        let _ = fs::remove_file(dest);
        return Err(ActionError::Io {
            path: source.to_path_buf(),
            source: e,
        });
    }
    fs::remove_file(source).map_err(|e| ActionError::Io {
        path: source.to_path_buf(),
        source: e,
    })
}
