//! Digest-keyed grouping of hashed file records.
//!
//! # Overview
//!
//! The [`GroupIndex`] owns the only digest-to-records mapping of a run.
//! Records flow in from the hashing stage in whatever order workers
//! complete; [`GroupIndex::into_groups`] then yields the digests that
//! mapped to two or more records as [`DuplicateGroup`]s, with members
//! sorted by path and groups sorted by digest, so identical inputs
//! always produce identical groups regardless of arrival order.
//!
//! # Example
//!
//! ```
//! use dupclean::duplicates::GroupIndex;
//! use dupclean::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let mut index = GroupIndex::new();
//! let now = SystemTime::now();
//! index.insert(FileRecord::new(PathBuf::from("/a"), 10, now).with_digest([1u8; 32]));
//! index.insert(FileRecord::new(PathBuf::from("/b"), 10, now).with_digest([1u8; 32]));
//! index.insert(FileRecord::new(PathBuf::from("/c"), 20, now).with_digest([2u8; 32]));
//!
//! let groups = index.into_groups();
//! assert_eq!(groups.len(), 1); // the [2; 32] digest was unique
//! assert_eq!(groups[0].members.len(), 2);
//! ```

use std::collections::HashMap;

use crate::scanner::{digest_to_hex, Digest, FileRecord};

/// A group of byte-identical files sharing one content digest.
///
/// Only exists with two or more members; all members share the same
/// digest and therefore the same size.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// BLAKE3 digest shared by every member
    pub digest: Digest,
    /// File size shared by every member
    pub size: u64,
    /// Member records, sorted by path
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of redundant copies (all members minus the keeper).
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Bytes reclaimed by removing every redundant copy.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * self.redundant_count() as u64
    }

    /// Digest as a hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }
}

/// Accumulates digest-to-record associations for one run.
///
/// The index is the sole owner of the mapping; it is consumed by
/// [`into_groups`](Self::into_groups) when hashing finishes.
#[derive(Debug, Default)]
pub struct GroupIndex {
    by_digest: HashMap<Digest, Vec<FileRecord>>,
}

impl GroupIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hashed record.
    ///
    /// Records without a digest cannot be judged duplicates of anything
    /// and are dropped with a debug assertion.
    pub fn insert(&mut self, record: FileRecord) {
        let Some(digest) = record.digest else {
            debug_assert!(false, "record inserted without digest");
            log::warn!("dropping unhashed record: {}", record.path.display());
            return;
        };
        self.by_digest.entry(digest).or_default().push(record);
    }

    /// Number of distinct digests seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    /// Finalize the index into duplicate groups.
    ///
    /// Only digests with two or more records become groups. Members are
    /// sorted by path and groups by digest, making the result a pure
    /// function of the input set.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .by_digest
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(digest, mut members)| {
                members.sort_by(|a, b| a.path.cmp(&b.path));
                let size = members[0].size;
                debug_assert!(members.iter().all(|m| m.size == size));
                DuplicateGroup {
                    digest,
                    size,
                    members,
                }
            })
            .collect();

        groups.sort_by(|a, b| a.digest.cmp(&b.digest));

        log::info!(
            "grouping complete: {} duplicate group(s), {} redundant file(s)",
            groups.len(),
            groups.iter().map(DuplicateGroup::redundant_count).sum::<usize>()
        );

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn record(path: &str, size: u64, digest: [u8; 32]) -> FileRecord {
        FileRecord::new(PathBuf::from(path), size, SystemTime::now()).with_digest(digest)
    }

    #[test]
    fn test_index_empty() {
        let index = GroupIndex::new();
        assert!(index.is_empty());
        assert!(index.into_groups().is_empty());
    }

    #[test]
    fn test_unique_digests_form_no_groups() {
        let mut index = GroupIndex::new();
        index.insert(record("/a", 10, [1u8; 32]));
        index.insert(record("/b", 20, [2u8; 32]));

        assert_eq!(index.len(), 2);
        assert!(index.into_groups().is_empty());
    }

    #[test]
    fn test_shared_digest_forms_group() {
        let mut index = GroupIndex::new();
        index.insert(record("/a", 10, [1u8; 32]));
        index.insert(record("/b", 10, [1u8; 32]));
        index.insert(record("/c", 10, [1u8; 32]));
        index.insert(record("/unique", 20, [2u8; 32]));

        let groups = index.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].size, 10);
        assert_eq!(groups[0].redundant_count(), 2);
        assert_eq!(groups[0].reclaimable_bytes(), 20);
    }

    #[test]
    fn test_groups_deterministic_regardless_of_arrival_order() {
        let build = |order: &[&str]| {
            let mut index = GroupIndex::new();
            for path in order {
                index.insert(record(path, 10, [1u8; 32]));
            }
            index.insert(record("/x1", 5, [9u8; 32]));
            index.insert(record("/x2", 5, [9u8; 32]));
            index.into_groups()
        };

        let forward = build(&["/a", "/b", "/c"]);
        let reverse = build(&["/c", "/b", "/a"]);

        assert_eq!(forward.len(), reverse.len());
        for (f, r) in forward.iter().zip(reverse.iter()) {
            assert_eq!(f.digest, r.digest);
            let f_paths: Vec<_> = f.members.iter().map(|m| &m.path).collect();
            let r_paths: Vec<_> = r.members.iter().map(|m| &m.path).collect();
            assert_eq!(f_paths, r_paths);
        }
    }

    #[test]
    fn test_members_sorted_by_path() {
        let mut index = GroupIndex::new();
        index.insert(record("/z", 10, [1u8; 32]));
        index.insert(record("/a", 10, [1u8; 32]));
        index.insert(record("/m", 10, [1u8; 32]));

        let groups = index.into_groups();
        let paths: Vec<_> = groups[0]
            .members
            .iter()
            .map(|m| m.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["/a", "/m", "/z"]);
    }

    #[test]
    fn test_groups_sorted_by_digest() {
        let mut index = GroupIndex::new();
        index.insert(record("/b1", 10, [5u8; 32]));
        index.insert(record("/b2", 10, [5u8; 32]));
        index.insert(record("/a1", 20, [1u8; 32]));
        index.insert(record("/a2", 20, [1u8; 32]));

        let groups = index.into_groups();
        assert_eq!(groups[0].digest, [1u8; 32]);
        assert_eq!(groups[1].digest, [5u8; 32]);
    }

    #[test]
    fn test_digest_hex() {
        let mut index = GroupIndex::new();
        let mut digest = [0u8; 32];
        digest[0] = 0xCD;
        index.insert(record("/a", 10, digest));
        index.insert(record("/b", 10, digest));

        let groups = index.into_groups();
        assert!(groups[0].digest_hex().starts_with("cd00"));
        assert_eq!(groups[0].digest_hex().len(), 64);
    }
}
