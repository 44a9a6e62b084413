//! dupclean - Content-Addressable Duplicate File Cleaner
//!
//! A Rust CLI application for finding duplicate files by content hash
//! (BLAKE3), removing the redundant copies by policy, and generating a
//! restore script for every quarantine run. An independent aging pass
//! sweeps stale files out of temporary directories.

pub mod actions;
pub mod aging;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod report;
pub mod scanner;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use crate::actions::execute;
use crate::aging::{clean_aged, AgingConfig};
use crate::cli::Cli;
use crate::config::{CleanupMode, RunConfig};
use crate::duplicates::GroupIndex;
use crate::error::ExitCode;
use crate::report::{RunReport, RunSummary};
use crate::scanner::{hash_files, ScanConfig, Scanner};

/// Run the full pipeline: scan, hash, group, act, age, report.
///
/// # Errors
///
/// Returns an error only for setup failures (report file, quarantine
/// root, restore script). Per-file failures are counted, written to
/// the run report, and never abort the run.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = RunConfig::from_cli(&cli);
    log::debug!("run configuration: {config:?}");

    let mut report = RunReport::create(&config.report_dir, &config.run_stamp)
        .with_context(|| {
            format!(
                "failed to create run report in {}",
                config.report_dir.display()
            )
        })?;
    log::info!("run report: {}", report.path().display());

    if config.dry_run {
        log::info!("dry-run mode: no files will be modified");
    }

    let mut summary = RunSummary::default();

    // Stage 1: discover candidate files.
    let scanner = Scanner::new(
        config.roots.clone(),
        ScanConfig::new(config.excludes.clone(), config.min_size),
    );
    let mut records = Vec::new();
    for result in scanner.scan() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("scan: {e}");
                report.warn(&format!("scan: {e}"));
                summary.scan_errors += 1;
            }
        }
    }
    summary.files_scanned = records.len();
    log::info!(
        "scanned {} candidate files ({} errors)",
        summary.files_scanned,
        summary.scan_errors
    );

    // Stage 2: hash file contents in parallel.
    let progress = hash_progress(records.len() as u64, cli.quiet);
    let hashed = hash_files(records, config.parallel, progress.as_ref());
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    // Stage 3: group by digest.
    let mut index = GroupIndex::new();
    for (record, result) in hashed {
        match result {
            Ok(digest) => {
                index.insert(record.with_digest(digest));
                summary.files_hashed += 1;
            }
            Err(e) => {
                log::warn!("hash: {e}");
                report.warn(&format!("hash: {e}"));
                summary.hash_failures += 1;
            }
        }
    }
    let groups = index.into_groups();
    summary.duplicate_groups = groups.len();
    summary.redundant_files = groups
        .iter()
        .map(duplicates::DuplicateGroup::redundant_count)
        .sum();
    log::info!(
        "{} duplicate groups, {} redundant files",
        summary.duplicate_groups,
        summary.redundant_files
    );

    // Stage 4: delete or quarantine redundant copies.
    let outcome = execute(&groups, &config, &mut report)?;
    match config.mode {
        CleanupMode::Quarantine(_) => summary.files_quarantined = outcome.files_removed,
        CleanupMode::Delete => summary.files_deleted = outcome.files_removed,
    }
    summary.would_remove = outcome.would_remove;
    summary.bytes_reclaimed = outcome.bytes_reclaimed;
    summary.action_failures = outcome.failures;

    // Stage 5: write the restore script for applied moves.
    if let Some(ledger) = &outcome.ledger {
        if !ledger.is_empty() {
            let script_path = config
                .report_dir
                .join(format!("dupclean_restore_{}.sh", config.run_stamp));
            ledger.write_script_file(&script_path).with_context(|| {
                format!("failed to write restore script {}", script_path.display())
            })?;
            log::info!("restore script: {}", script_path.display());
        }
    }

    // Stage 6: independent aging pass over temporary directories.
    if config.temp_clean {
        let aging_config = AgingConfig {
            dirs: config.temp_dirs.clone(),
            // The quarantine root is among the excludes; files moved
            // there keep their old mtimes and must outlive the sweep
            // for the restore script to work.
            excludes: config.excludes.clone(),
            max_age_days: config.temp_age_days,
            dry_run: config.dry_run,
        };
        let stats = clean_aged(&aging_config, &mut report);
        summary.aged_files_removed = stats.removed;
        log::info!(
            "aging: {} matched, {} removed, {} failures",
            stats.matched,
            stats.removed,
            stats.failures
        );
    }

    let report_path = report
        .finish(&summary)
        .context("failed to finalize run report")?;

    if !cli.quiet {
        println!("{}", summary.render());
        println!("Full report: {}", report_path.display());
    }

    Ok(ExitCode::Success)
}

/// Build the hashing progress bar, or `None` under `--quiet`.
fn hash_progress(total: u64, quiet: bool) -> Option<ProgressBar> {
    if quiet || total == 0 {
        return None;
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    Some(bar)
}
