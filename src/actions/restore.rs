//! Restore ledger and inverse-script generation.
//!
//! # Overview
//!
//! Every successfully applied quarantine-move appends one
//! [`RestoreEntry`] to the [`RestoreLedger`], in application order. At
//! the end of a run the ledger is materialized as a self-contained
//! POSIX shell script that moves each quarantined file back to its
//! recorded original path and then removes the directories the run
//! left empty under the quarantine root.
//!
//! The script is written only when at least one move was actually
//! applied (never in dry-run, never in delete mode), and a partial
//! ledger from an interrupted run is still valid to replay. Replaying
//! twice is only safe while the quarantine paths still exist; the
//! script itself reports per-entry failures instead of stopping.
//!
//! Paths are single-quote escaped the same way for every entry, so
//! spaces and shell metacharacters in file names survive the round
//! trip.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One applied quarantine-move, invertible by a single `mv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreEntry {
    /// Where the file now sits under the quarantine root
    pub quarantine_path: PathBuf,
    /// Where it must be moved back to
    pub original_path: PathBuf,
}

/// Ordered record of a run's quarantine moves.
#[derive(Debug)]
pub struct RestoreLedger {
    quarantine_root: PathBuf,
    entries: Vec<RestoreEntry>,
}

impl RestoreLedger {
    /// Create an empty ledger for the given quarantine root.
    #[must_use]
    pub fn new(quarantine_root: PathBuf) -> Self {
        Self {
            quarantine_root,
            entries: Vec::new(),
        }
    }

    /// Append one applied move.
    pub fn push(&mut self, quarantine_path: PathBuf, original_path: PathBuf) {
        self.entries.push(RestoreEntry {
            quarantine_path,
            original_path,
        });
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any move was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[RestoreEntry] {
        &self.entries
    }

    /// Write the inverse script to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_script<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "#!/bin/sh")?;
        writeln!(writer, "# dupclean restore script")?;
        writeln!(
            writer,
            "# Generated on: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(writer, "#")?;
        writeln!(
            writer,
            "# Moves {} quarantined file(s) back to their original locations.",
            self.entries.len()
        )?;
        writeln!(
            writer,
            "# Run with sufficient privileges if the original paths are not writable."
        )?;
        writeln!(writer)?;
        writeln!(writer, "RESTORED=0")?;
        writeln!(writer, "FAILED=0")?;
        writeln!(writer)?;

        for entry in &self.entries {
            let src = escape_posix(&entry.quarantine_path);
            let dest = escape_posix(&entry.original_path);
            if let Some(parent) = entry.original_path.parent() {
                writeln!(writer, "mkdir -p {}", escape_posix(parent))?;
            }
            writeln!(writer, "if mv {} {}; then", src, dest)?;
            writeln!(writer, "    RESTORED=$((RESTORED + 1))")?;
            writeln!(writer, "else")?;
            writeln!(writer, "    echo \"failed to restore: {}\" >&2", dest)?;
            writeln!(writer, "    FAILED=$((FAILED + 1))")?;
            writeln!(writer, "fi")?;
        }

        writeln!(writer)?;
        writeln!(writer, "# Drop the directories this run left empty")?;
        writeln!(
            writer,
            "find {} -depth -type d -empty -delete 2>/dev/null || true",
            escape_posix(&self.quarantine_root)
        )?;
        writeln!(writer)?;
        writeln!(
            writer,
            "echo \"Restored $RESTORED file(s), $FAILED failure(s).\""
        )?;

        Ok(())
    }

    /// Write the inverse script to a file and mark it executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_script_file(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_script(&mut writer)?;
        writer.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }
}

/// Single-quote a path for POSIX shell, escaping embedded quotes.
fn escape_posix(path: &Path) -> String {
    let s = path.to_string_lossy();
    format!("'{}'", s.replace('\'', "'\\''"))
}
