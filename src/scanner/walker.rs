//! Directory walker for candidate file discovery.
//!
//! # Overview
//!
//! This module provides the [`Scanner`] struct for traversing the
//! configured scan roots and producing [`FileRecord`] values for every
//! regular file that passes the filters. Traversal is single-threaded
//! (the hashing stage is where parallelism lives), symbolic links are
//! never followed, and excluded prefixes are pruned without descending
//! into them.
//!
//! Entries that cannot be read or statted are yielded as [`ScanError`]
//! values rather than stopping the walk; the caller logs and counts
//! them. Traversal order is unspecified and downstream stages never
//! depend on it.
//!
//! # Example
//!
//! ```no_run
//! use dupclean::scanner::{ScanConfig, Scanner};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig {
//!     min_size: 1024, // skip files under 1KiB
//!     ..Default::default()
//! };
//!
//! let scanner = Scanner::new(vec![PathBuf::from("/home/user")], config);
//! let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();
//! println!("Found {} candidate files", files.len());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FileRecord, ScanConfig, ScanError};

/// Walks the scan roots and yields candidate file records.
#[derive(Debug)]
pub struct Scanner {
    /// Root directories to traverse
    roots: Vec<PathBuf>,
    /// Scan configuration (exclusions, minimum size)
    config: ScanConfig,
}

impl Scanner {
    /// Create a new scanner over the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: ScanConfig) -> Self {
        Self { roots, config }
    }

    /// Check whether a path falls under one of the exclusion prefixes.
    fn is_excluded(&self, path: &Path) -> bool {
        self.config
            .excludes
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }

    /// Walk all roots, yielding file records and per-entry errors.
    ///
    /// Directories are pruned as soon as they match an exclusion
    /// prefix, so the walk never descends into them. Symlinks are
    /// skipped without being resolved.
    pub fn scan(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        self.roots.iter().flat_map(move |root| {
            WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_entry(move |entry| !self.is_excluded(entry.path()))
                .filter_map(move |entry_result| self.process_entry(entry_result))
        })
    }

    /// Turn one walkdir entry into a record, an error, or nothing.
    fn process_entry(
        &self,
        entry_result: walkdir::Result<walkdir::DirEntry>,
    ) -> Option<Result<FileRecord, ScanError>> {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => return Some(Err(walk_error(e))),
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            return None;
        }
        if file_type.is_symlink() {
            log::trace!("skipping symlink: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(walk_error(e))),
        };

        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if size < self.config.min_size {
            log::trace!(
                "skipping file below minimum size ({}): {}",
                size,
                entry.path().display()
            );
            return None;
        }

        let modified = match metadata.modified() {
            Ok(m) => m,
            Err(e) => {
                return Some(Err(ScanError::Io {
                    path: entry.into_path(),
                    source: e,
                }))
            }
        };

        Some(Ok(FileRecord::new(entry.into_path(), size, modified)))
    }
}

/// Convert a walkdir error to a [`ScanError`].
fn walk_error(e: walkdir::Error) -> ScanError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    match e.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
        Some(io::ErrorKind::NotFound) => ScanError::NotFound(path),
        _ => {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("directory walk error"));
            ScanError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with a few files and a subdirectory.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.txt")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    #[test]
    fn test_scanner_finds_files() {
        let dir = create_test_dir();
        let scanner = Scanner::new(vec![dir.path().to_path_buf()], ScanConfig::default());

        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        for record in &files {
            assert!(record.size > 0);
            assert!(record.path.exists());
            assert!(record.digest.is_none());
        }
    }

    #[test]
    fn test_scanner_multiple_roots() {
        let dir1 = create_test_dir();
        let dir2 = create_test_dir();
        let scanner = Scanner::new(
            vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()],
            ScanConfig::default(),
        );

        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();
        assert_eq!(files.len(), 6);
    }

    #[test]
    fn test_scanner_min_size_filter() {
        let dir = create_test_dir();

        let mut f = File::create(dir.path().join("tiny.txt")).unwrap();
        f.write_all(b"X").unwrap();

        let config = ScanConfig {
            min_size: 10,
            ..Default::default()
        };
        let scanner = Scanner::new(vec![dir.path().to_path_buf()], config);

        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();
        for record in &files {
            assert!(
                record.size >= 10,
                "file {} has size {}",
                record.path.display(),
                record.size
            );
        }
    }

    #[test]
    fn test_scanner_skips_empty_files() {
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let scanner = Scanner::new(vec![dir.path().to_path_buf()], ScanConfig::default());
        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();

        // Default min_size of 1 excludes zero-byte files
        for record in &files {
            assert!(record.size > 0);
        }
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_scanner_prunes_excluded_prefix() {
        let dir = create_test_dir();
        let excluded = dir.path().join("subdir");

        let config = ScanConfig {
            excludes: vec![excluded.clone()],
            ..Default::default()
        };
        let scanner = Scanner::new(vec![dir.path().to_path_buf()], config);

        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();
        assert_eq!(files.len(), 2);
        for record in &files {
            assert!(!record.path.starts_with(&excluded));
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_scanner_never_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = create_test_dir();
        let target_dir = TempDir::new().unwrap();
        let mut f = File::create(target_dir.path().join("outside.txt")).unwrap();
        writeln!(f, "outside content").unwrap();

        symlink(target_dir.path(), dir.path().join("link-dir")).unwrap();
        symlink(
            target_dir.path().join("outside.txt"),
            dir.path().join("link-file.txt"),
        )
        .unwrap();

        let scanner = Scanner::new(vec![dir.path().to_path_buf()], ScanConfig::default());
        let files: Vec<_> = scanner.scan().filter_map(Result::ok).collect();

        // Neither the linked directory's contents nor the linked file appear
        assert_eq!(files.len(), 3);
        for record in &files {
            assert!(!record.path.starts_with(target_dir.path()));
        }
    }

    #[test]
    fn test_scanner_nonexistent_root_yields_errors() {
        let scanner = Scanner::new(
            vec![PathBuf::from("/nonexistent/path/12345")],
            ScanConfig::default(),
        );

        let results: Vec<_> = scanner.scan().collect();
        assert!(!results.is_empty());
        assert!(results.iter().all(Result::is_err));
    }
}
