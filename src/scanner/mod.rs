//! Scanner module for file discovery and content hashing.
//!
//! This module provides functionality for:
//! - Directory traversal with exclusion prefixes and a minimum-size filter
//! - BLAKE3 content hashing with a bounded worker pool
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupclean::scanner::{ScanConfig, Scanner};
//! use std::path::PathBuf;
//!
//! let scanner = Scanner::new(vec![PathBuf::from("/data")], ScanConfig::default());
//! for entry in scanner.scan() {
//!     match entry {
//!         Ok(record) => println!("{}: {} bytes", record.path.display(), record.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use hasher::{digest_to_hex, hash_file, hash_files, Digest};
pub use walker::Scanner;

/// Metadata for a discovered candidate file.
///
/// Created by the [`Scanner`]; the digest is filled in by the hashing
/// stage. Records are rebuilt fresh every run and never persisted.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// BLAKE3 content digest, present once the file has been hashed
    pub digest: Option<Digest>,
}

impl FileRecord {
    /// Create a new record for a discovered file (not yet hashed).
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            digest: None,
        }
    }

    /// Return this record with its content digest filled in.
    #[must_use]
    pub fn with_digest(mut self, digest: Digest) -> Self {
        self.digest = Some(digest);
        self
    }
}

/// Configuration for the scanning stage.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Absolute path prefixes to prune from traversal.
    pub excludes: Vec<PathBuf>,

    /// Minimum file size in bytes. Files below this are never hashed
    /// or grouped.
    pub min_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excludes: Vec::new(),
            min_size: 1,
        }
    }
}

impl ScanConfig {
    /// Create a scan configuration from resolved CLI settings.
    #[must_use]
    pub fn new(excludes: Vec<PathBuf>, min_size: u64) -> Self {
        Self { excludes, min_size }
    }
}

/// Errors that can occur during directory scanning.
///
/// All scan errors are local to one entry; the run continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished between enumeration and stat.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while hashing file content.
///
/// A file that fails to hash is excluded from all duplicate groups.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished before it could be read.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_new() {
        let record = FileRecord::new(PathBuf::from("/test/file.txt"), 1024, SystemTime::now());

        assert_eq!(record.path, PathBuf::from("/test/file.txt"));
        assert_eq!(record.size, 1024);
        assert!(record.digest.is_none());
    }

    #[test]
    fn test_file_record_with_digest() {
        let record = FileRecord::new(PathBuf::from("/a"), 10, SystemTime::now());
        let record = record.with_digest([7u8; 32]);
        assert_eq!(record.digest, Some([7u8; 32]));
    }

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert!(config.excludes.is_empty());
        assert_eq!(config.min_size, 1);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "path not found: /missing");
    }

    #[test]
    fn test_hash_error_display() {
        let err = HashError::NotFound(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "file not found: /test");

        let err = HashError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "permission denied: /secret");
    }
}
