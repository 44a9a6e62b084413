//! Keeper selection within a duplicate group.
//!
//! # Overview
//!
//! Every duplicate group keeps exactly one member; the rest are
//! redundant. [`select_keeper`] applies a [`KeepPolicy`] to one group
//! at a time and breaks ties on the lexically smallest path, so
//! repeated runs over an unchanged file set always pick the same
//! keeper.

use std::fmt;

use crate::scanner::FileRecord;

/// Which member of a duplicate group survives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepPolicy {
    /// Keep the member with the earliest modification time.
    #[default]
    Oldest,
    /// Keep the member with the latest modification time.
    Newest,
    /// Keep the member with the largest size.
    Largest,
}

impl KeepPolicy {
    /// Parse a policy name, falling back to `Oldest` for anything
    /// unrecognized.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => Self::Oldest,
            "newest" => Self::Newest,
            "largest" => Self::Largest,
            other => {
                log::warn!("unknown keep policy '{}', falling back to oldest", other);
                Self::Oldest
            }
        }
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oldest => write!(f, "oldest"),
            Self::Newest => write!(f, "newest"),
            Self::Largest => write!(f, "largest"),
        }
    }
}

/// Select the keeper index within one group's members.
///
/// Ties between equally extreme candidates (identical modification
/// time, or identical size under `Largest`) resolve to the lexically
/// smallest path.
///
/// # Panics
///
/// Panics if `members` is empty; groups always have at least two
/// members.
#[must_use]
pub fn select_keeper(members: &[FileRecord], policy: KeepPolicy) -> usize {
    assert!(!members.is_empty(), "keeper selection on empty group");

    let mut best = 0;
    for (i, candidate) in members.iter().enumerate().skip(1) {
        if beats(candidate, &members[best], policy) {
            best = i;
        }
    }
    best
}

/// Whether `candidate` should replace the current best keeper.
fn beats(candidate: &FileRecord, current: &FileRecord, policy: KeepPolicy) -> bool {
    match policy {
        KeepPolicy::Oldest => match candidate.modified.cmp(&current.modified) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => candidate.path < current.path,
            std::cmp::Ordering::Greater => false,
        },
        KeepPolicy::Newest => match candidate.modified.cmp(&current.modified) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => candidate.path < current.path,
            std::cmp::Ordering::Less => false,
        },
        KeepPolicy::Largest => match candidate.size.cmp(&current.size) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => candidate.path < current.path,
            std::cmp::Ordering::Less => false,
        },
    }
}
