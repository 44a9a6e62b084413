//! Command-line interface definitions for dupclean.
//!
//! All flags are defined with the clap derive API. The surface is
//! deliberately flat: one invocation runs one dedup pass plus,
//! unless disabled, one temp-directory aging pass.
//!
//! # Example
//!
//! ```bash
//! # Dry-run over the defaults (home + temp), report only
//! dupclean
//!
//! # Quarantine duplicates under /var/quarantine, keeping newest copies
//! dupclean --paths /data --keep newest --quarantine /var/quarantine --no-dry-run
//!
//! # Permanent deletion, no temp cleaning, files of 1 MiB and up
//! dupclean --paths /data --delete --min-size 1MiB --no-temp-clean --no-dry-run
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Duplicate file cleanup engine.
///
/// Finds byte-identical files via BLAKE3 content hashing, keeps one
/// canonical copy per group, and quarantines (or deletes) the rest.
/// Quarantine runs produce an executable restore script that inverts
/// the run exactly. Dry-run is the default; nothing is touched until
/// `--no-dry-run` is given.
#[derive(Debug, Parser)]
#[command(name = "dupclean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan (default: home directory and system temp)
    #[arg(long = "paths", value_name = "ROOT", num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Minimum file size to consider (e.g. 4k, 10M, 1GiB)
    #[arg(long, value_name = "SIZE", default_value = "1", value_parser = parse_size)]
    pub min_size: u64,

    /// Number of hashing workers
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub parallel: usize,

    /// Keeper policy: oldest, newest or largest
    ///
    /// Unrecognized values fall back to "oldest".
    #[arg(long, value_name = "POLICY", default_value = "oldest")]
    pub keep: String,

    /// Quarantine root for redundant copies (default: under system temp)
    #[arg(long, value_name = "DIR")]
    pub quarantine: Option<PathBuf>,

    /// Permanently delete redundant copies instead of quarantining
    ///
    /// Takes precedence over --quarantine; no restore script is written.
    #[arg(long)]
    pub delete: bool,

    /// Compute and report all decisions without touching the filesystem (default)
    #[arg(long, conflicts_with = "no_dry_run")]
    pub dry_run: bool,

    /// Actually apply quarantine moves / deletions
    #[arg(long)]
    pub no_dry_run: bool,

    /// Path prefix to prune from the scan (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    pub excludes: Vec<PathBuf>,

    /// Skip the temp-directory aging pass
    #[arg(long)]
    pub no_temp_clean: bool,

    /// Directory for the aging pass (repeatable; default: system temp)
    #[arg(long = "temp-dir", value_name = "DIR")]
    pub temp_dirs: Vec<PathBuf>,

    /// Age threshold in days for the aging pass
    #[arg(long, value_name = "DAYS", default_value_t = 7)]
    pub temp_age_days: u64,

    /// Directory for the run log and restore script (default: system temp)
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports decimal (k/M/G/T) and binary (KiB/MiB/GiB/TiB) suffixes,
/// case-insensitive; bare numbers are bytes.
///
/// # Errors
///
/// Returns an error for empty input, malformed numbers, negative
/// values, or unknown suffixes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("invalid number: '{num_str}'"))?;
    if num < 0.0 {
        return Err("size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1_000,
        "KIB" => 1_024,
        "M" | "MB" => 1_000_000,
        "MIB" => 1_048_576,
        "G" | "GB" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "T" | "TB" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
