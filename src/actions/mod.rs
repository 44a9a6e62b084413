//! Cleanup actions for redundant files.
//!
//! This module provides functionality for:
//! - Executing delete or quarantine-move actions per redundant file,
//!   honoring dry-run ([`executor`])
//! - Recording applied quarantine moves as an executable inverse
//!   script ([`restore`])
//!
//! One [`Action`] is produced per redundant file per run; per-file
//! failures never abort the batch.

pub mod executor;
pub mod restore;

use std::path::PathBuf;

pub use executor::{execute, quarantine_dest, ExecOutcome};
pub use restore::{RestoreEntry, RestoreLedger};

/// What was (or would be) done to one redundant file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Relocate into the quarantine tree.
    Move,
    /// Permanent removal, no restore entry.
    Delete,
}

/// Whether an action took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The filesystem was mutated.
    Applied,
    /// Dry-run: the same decision was made but nothing was touched.
    WouldApply,
    /// The action failed; the file was left in place.
    Failed,
}

/// One decision about one redundant file.
#[derive(Debug, Clone)]
pub struct Action {
    /// Delete or quarantine-move
    pub kind: ActionKind,
    /// The redundant file
    pub source: PathBuf,
    /// Quarantine destination for moves
    pub dest: Option<PathBuf>,
    /// What happened
    pub outcome: ActionOutcome,
}

/// Errors raised by the action executor.
///
/// Only [`QuarantineSetup`](ActionError::QuarantineSetup) is fatal;
/// per-file failures are recorded on the [`Action`] and the batch
/// continues.
#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    /// The quarantine root could not be created. Fatal, raised before
    /// any mutation.
    #[error("cannot create quarantine root {path}: {source}")]
    QuarantineSetup {
        /// The quarantine root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A single move or delete failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
