//! Timestamped run log and end-of-run summary.
//!
//! # Overview
//!
//! Every run writes an audit log recording each decision and action in
//! a pipe-separated, line-oriented format meant for human review and
//! grepping:
//!
//! ```text
//! MOVED|/data/b.txt|/tmp/quarantine/data/b.txt
//! DEL|/data/c.txt
//! WOULD-MOVE|/data/d.txt|/tmp/quarantine/data/d.txt
//! AGE-DEL|/tmp/stale.tmp
//! WARN|permission denied: /data/locked
//! ```
//!
//! The log ends with a summary block of counters that is written
//! regardless of outcome. Log write failures are logged and otherwise
//! ignored; the audit trail never takes the run down.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;

/// Counters accumulated over a run, written at the end of the log.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Candidate files produced by the scanner
    pub files_scanned: usize,
    /// Entries the scanner could not read or stat
    pub scan_errors: usize,
    /// Files whose digest was computed
    pub files_hashed: usize,
    /// Files whose content could not be read to completion
    pub hash_failures: usize,
    /// Duplicate groups found
    pub duplicate_groups: usize,
    /// Redundant files across all groups
    pub redundant_files: usize,
    /// Files relocated into quarantine
    pub files_quarantined: usize,
    /// Files permanently deleted
    pub files_deleted: usize,
    /// Files a dry-run would have removed
    pub would_remove: usize,
    /// Bytes reclaimed (or reclaimable under dry-run)
    pub bytes_reclaimed: u64,
    /// Move/delete attempts that failed
    pub action_failures: usize,
    /// Files removed by the aging pass
    pub aged_files_removed: usize,
}

impl RunSummary {
    /// Render the summary as display lines.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "files scanned: {}\nscan errors: {}\nfiles hashed: {}\nhash failures: {}\nduplicate groups: {}\nredundant files: {}\nquarantined: {}\ndeleted: {}\nwould remove (dry-run): {}\nspace reclaimed: {}\naction failures: {}\naged files removed: {}",
            self.files_scanned,
            self.scan_errors,
            self.files_hashed,
            self.hash_failures,
            self.duplicate_groups,
            self.redundant_files,
            self.files_quarantined,
            self.files_deleted,
            self.would_remove,
            ByteSize::b(self.bytes_reclaimed),
            self.action_failures,
            self.aged_files_removed,
        )
    }
}

/// Append-only writer for the run's audit log.
#[derive(Debug)]
pub struct RunReport {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RunReport {
    /// Create the log file `dupclean_<stamp>.log` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created;
    /// this is a fatal setup failure.
    pub fn create(dir: &Path, stamp: &str) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("dupclean_{stamp}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one raw line, best-effort.
    pub fn record(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}") {
            log::warn!("run log write failed: {e}");
        }
    }

    /// Record an applied quarantine-move.
    pub fn moved(&mut self, source: &Path, dest: &Path) {
        self.record(&format!("MOVED|{}|{}", source.display(), dest.display()));
    }

    /// Record an applied permanent delete.
    pub fn deleted(&mut self, source: &Path) {
        self.record(&format!("DEL|{}", source.display()));
    }

    /// Record a dry-run move decision.
    pub fn would_move(&mut self, source: &Path, dest: &Path) {
        self.record(&format!(
            "WOULD-MOVE|{}|{}",
            source.display(),
            dest.display()
        ));
    }

    /// Record a dry-run delete decision.
    pub fn would_delete(&mut self, source: &Path) {
        self.record(&format!("WOULD-DEL|{}", source.display()));
    }

    /// Record an aging-pass delete (or dry-run decision).
    pub fn aged(&mut self, source: &Path, dry_run: bool) {
        if dry_run {
            self.record(&format!("AGE-WOULD-DEL|{}", source.display()));
        } else {
            self.record(&format!("AGE-DEL|{}", source.display()));
        }
    }

    /// Record a non-fatal warning.
    pub fn warn(&mut self, message: &str) {
        self.record(&format!("WARN|{message}"));
    }

    /// Record a per-file action failure.
    pub fn error(&mut self, message: &str) {
        self.record(&format!("ERR|{message}"));
    }

    /// Write the summary block and flush the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn finish(mut self, summary: &RunSummary) -> std::io::Result<PathBuf> {
        self.record("---");
        for line in summary.render().lines() {
            self.record(&format!("SUMMARY|{line}"));
        }
        self.writer.flush()?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_creates_timestamped_file() {
        let dir = TempDir::new().unwrap();
        let report = RunReport::create(dir.path(), "20260101_120000").unwrap();
        assert_eq!(
            report.path().file_name().unwrap(),
            "dupclean_20260101_120000.log"
        );
        assert!(report.path().exists());
    }

    #[test]
    fn test_report_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs/run");
        let report = RunReport::create(&nested, "stamp").unwrap();
        assert!(report.path().starts_with(&nested));
    }

    #[test]
    fn test_report_line_formats() {
        let dir = TempDir::new().unwrap();
        let mut report = RunReport::create(dir.path(), "t").unwrap();
        report.moved(Path::new("/src/a"), Path::new("/q/src/a"));
        report.deleted(Path::new("/src/b"));
        report.would_move(Path::new("/src/c"), Path::new("/q/src/c"));
        report.would_delete(Path::new("/src/d"));
        report.aged(Path::new("/tmp/old"), false);
        report.aged(Path::new("/tmp/older"), true);
        report.warn("something odd");
        report.error("move failed");
        let path = report.finish(&RunSummary::default()).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("MOVED|/src/a|/q/src/a"));
        assert!(content.contains("DEL|/src/b"));
        assert!(content.contains("WOULD-MOVE|/src/c|/q/src/c"));
        assert!(content.contains("WOULD-DEL|/src/d"));
        assert!(content.contains("AGE-DEL|/tmp/old"));
        assert!(content.contains("AGE-WOULD-DEL|/tmp/older"));
        assert!(content.contains("WARN|something odd"));
        assert!(content.contains("ERR|move failed"));
        assert!(content.contains("SUMMARY|files scanned: 0"));
    }

    #[test]
    fn test_summary_render_counts() {
        let summary = RunSummary {
            files_scanned: 10,
            files_hashed: 9,
            hash_failures: 1,
            duplicate_groups: 2,
            redundant_files: 3,
            files_quarantined: 3,
            bytes_reclaimed: 2048,
            ..Default::default()
        };
        let rendered = summary.render();
        assert!(rendered.contains("files scanned: 10"));
        assert!(rendered.contains("hash failures: 1"));
        assert!(rendered.contains("duplicate groups: 2"));
        assert!(rendered.contains("quarantined: 3"));
    }
}
