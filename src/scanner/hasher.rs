//! BLAKE3 content hashing with a bounded worker pool.
//!
//! # Overview
//!
//! This module computes the full-content BLAKE3 digest of each
//! candidate file. Hashing is the only parallel stage of the pipeline:
//! [`hash_files`] runs on a dedicated rayon pool sized by the
//! `--parallel` setting so disk thrashing stays bounded regardless of
//! the machine's core count.
//!
//! Digest equality is taken as content equality; no secondary
//! byte-compare is performed. A file whose content cannot be read to
//! completion yields a [`HashError`] and is excluded from grouping.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use indicatif::ProgressBar;
use rayon::prelude::*;

use super::{FileRecord, HashError};

/// 256-bit BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Read buffer size for streaming hashing.
const HASH_BUF_SIZE: usize = 64 * 1024;

/// Render a digest as a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    blake3::Hash::from_bytes(*digest).to_hex().to_string()
}

/// Hash the full content of a single file.
///
/// Streams the file through BLAKE3 in 64 KiB chunks, so memory use is
/// constant regardless of file size.
///
/// # Errors
///
/// Returns a [`HashError`] if the file cannot be opened or read to
/// completion.
pub fn hash_file(path: &Path) -> Result<Digest, HashError> {
    let mut file = File::open(path).map_err(|e| read_error(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; HASH_BUF_SIZE];

    loop {
        let n = file.read(&mut buf).map_err(|e| read_error(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Hash a batch of file records on a bounded worker pool.
///
/// Workers share no mutable state; each record maps to a
/// `(record, digest-or-error)` pair and completion order is irrelevant
/// to the grouping stage. Failures are logged here and returned to the
/// caller for counting.
///
/// # Arguments
///
/// * `records` - Candidate files from the scanner
/// * `workers` - Worker count (values below 1 are clamped to 1)
/// * `progress` - Optional progress bar, ticked once per file
#[must_use]
pub fn hash_files(
    records: Vec<FileRecord>,
    workers: usize,
    progress: Option<&ProgressBar>,
) -> Vec<(FileRecord, Result<Digest, HashError>)> {
    if records.is_empty() {
        return Vec::new();
    }

    log::info!(
        "hashing {} file(s) with {} worker(s)",
        records.len(),
        workers.max(1)
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "failed to create hashing pool, falling back to {} global threads",
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        });

    pool.install(|| {
        records
            .into_par_iter()
            .map(|record| {
                let result = hash_file(&record.path);
                if let Err(ref e) = result {
                    log::warn!("failed to hash {}: {}", record.path.display(), e);
                }
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (record, result)
            })
            .collect()
    })
}

/// Classify a read failure for one file.
fn read_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        io::ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn record_for(path: &Path) -> FileRecord {
        let meta = fs::metadata(path).unwrap();
        FileRecord::new(path.to_path_buf(), meta.len(), meta.modified().unwrap())
    }

    #[test]
    fn test_hash_file_identical_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same content");
        let b = write_file(&dir, "b.txt", b"same content");

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_hash_file_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"content one");
        let b = write_file(&dir, "b.txt", b"content two");

        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_hash_file_reads_entire_content() {
        // Two files sharing a long common prefix must still differ
        let dir = TempDir::new().unwrap();
        let mut base = vec![0xAAu8; 3 * HASH_BUF_SIZE];
        let a = write_file(&dir, "a.bin", &base);
        *base.last_mut().unwrap() = 0xBB;
        let b = write_file(&dir, "b.bin", &base);

        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_hash_file_matches_reference() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ref.txt", b"reference data");

        let expected = *blake3::hash(b"reference data").as_bytes();
        assert_eq!(hash_file(&path).unwrap(), expected);
    }

    #[test]
    fn test_hash_file_missing() {
        let err = hash_file(Path::new("/nonexistent/file-12345")).unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_hash_files_batch() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"dup");
        let b = write_file(&dir, "b.txt", b"dup");
        let c = write_file(&dir, "c.txt", b"unique");

        let records = vec![record_for(&a), record_for(&b), record_for(&c)];
        let results = hash_files(records, 2, None);

        assert_eq!(results.len(), 3);
        let digest_of = |p: &Path| {
            results
                .iter()
                .find(|(r, _)| r.path == p)
                .and_then(|(_, d)| d.as_ref().ok())
                .copied()
                .unwrap()
        };
        assert_eq!(digest_of(&a), digest_of(&b));
        assert_ne!(digest_of(&a), digest_of(&c));
    }

    #[test]
    fn test_hash_files_reports_failures() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"exists");
        let missing = FileRecord::new(PathBuf::from("/nonexistent/gone"), 5, SystemTime::now());

        let results = hash_files(vec![record_for(&a), missing], 2, None);

        let failures = results.iter().filter(|(_, d)| d.is_err()).count();
        assert_eq!(failures, 1);
        let successes = results.iter().filter(|(_, d)| d.is_ok()).count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn test_hash_files_empty_input() {
        assert!(hash_files(Vec::new(), 4, None).is_empty());
    }

    #[test]
    fn test_digest_to_hex() {
        let mut digest = [0u8; 32];
        digest[0] = 0xAB;
        digest[31] = 0xEF;

        let hex = digest_to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("ef"));
    }
}
