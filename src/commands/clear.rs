use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use retention::{Bucket, CandidateFile, RetentionResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Context as AppContext;
use crate::cli::Cli;
use crate::config::Settings;
use crate::error::Error;
use crate::prune::{self, PruneReport};
use crate::scanner::{self, ScanOptions};
use crate::ui;

/// Fully resolved options for one clear run.
#[derive(Debug, Clone)]
pub struct ClearOptions {
    pub directory: PathBuf,
    pub prefix: Option<String>,
    pub recursive: bool,
    /// Only report what would be removed
    pub dry_run: bool,
    pub json: bool,
    /// Reference instant all ages are measured from
    pub now: DateTime<Utc>,
}

impl ClearOptions {
    /// Merge command-line flags over file settings. Flags win: `--recursive`
    /// and `--no-recursive` both override the file's `recursive`.
    pub fn resolve(cli: &Cli, settings: Settings) -> Self {
        let directory = cli
            .directory
            .clone()
            .or_else(|| settings.directory_path())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            directory,
            prefix: cli.prefix.clone().or(settings.prefix),
            recursive: if cli.no_recursive {
                false
            } else {
                cli.recursive || settings.recursive
            },
            dry_run: cli.test,
            json: cli.json,
            now: cli.now.unwrap_or_else(Utc::now),
        }
    }
}

/// Everything one clear run produced.
#[derive(Debug)]
pub struct ClearOutcome {
    /// Entries skipped because they could not be read
    pub warnings: Vec<Error>,
    /// Entries that were not candidates (prefix mismatch, not a regular file)
    pub ignored: usize,
    pub result: RetentionResult,
    pub report: PruneReport,
}

/// Scan the directory, select the keep set and prune the rest.
///
/// Only a bad target directory is an error; unreadable entries and failed
/// removals are collected in the outcome.
pub fn execute(options: &ClearOptions) -> Result<ClearOutcome> {
    let scan_options = ScanOptions {
        prefix: options.prefix.clone(),
        recursive: options.recursive,
    };
    let scan = scanner::scan(&options.directory, &scan_options)
        .with_context(|| format!("Cannot clear {}", options.directory.display()))?;

    let result = retention::select(scan.candidates, options.now);
    log::info!(
        "Keeping {} file(s), removing {}",
        result.keep.len(),
        result.delete.len()
    );

    let report = prune::prune(&result.delete, options.dry_run);

    Ok(ClearOutcome {
        warnings: scan.warnings,
        ignored: scan.ignored,
        result,
        report,
    })
}

/// Run the clear command and print its report.
///
/// Fails when any selected file could not be removed, after every removal
/// has been attempted.
pub fn run(ctx: &AppContext, options: ClearOptions) -> Result<()> {
    let outcome = execute(&options)?;

    if options.json {
        print_json(&options, &outcome)?;
    } else {
        print_report(ctx, &options, &outcome);
    }

    if !outcome.report.is_success() {
        bail!(
            "{} of {} file(s) could not be removed",
            outcome.report.failed(),
            outcome.report.total()
        );
    }

    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_report(ctx: &AppContext, options: &ClearOptions, outcome: &ClearOutcome) {
    let result = &outcome.result;

    if !ctx.quiet {
        ui::header(&format!("Clearing {}", options.directory.display()));
        ui::kv(
            "Prefix",
            options.prefix.as_deref().unwrap_or("(all files)"),
        );
        ui::kv("Reference time", &options.now.to_rfc3339());
        if options.recursive {
            ui::kv("Mode", "recursive");
        }

        ui::section("Keeping:");
        for bucket in Bucket::ALL {
            match result.keep.get(&bucket) {
                Some(file) => println!(
                    "  {} {:<8} {} {}",
                    "✓".green(),
                    bucket.label(),
                    file.path.display(),
                    format!("({})", ui::format_age(file.age(options.now))).dimmed()
                ),
                None => ui::dim(&format!("{:<10} no candidate", bucket.label())),
            }
        }
    }

    if !result.delete.is_empty() {
        if !ctx.quiet {
            ui::section(if outcome.report.dry_run {
                "Would remove:"
            } else {
                "Removing:"
            });
        }
        let failed: Vec<&Path> = outcome.report.errors.iter().map(Error::path).collect();
        for file in &result.delete {
            if failed.contains(&file.path.as_path()) {
                continue;
            }
            print_removed(ctx, options, file);
        }
    }

    for warning in &outcome.warnings {
        ui::warn(&format!("Skipped: {warning}"));
    }
    for error in &outcome.report.errors {
        ui::error(&error.to_string());
    }

    println!();
    let removed = outcome.report.removed.len();
    let size = ui::format_size(outcome.report.bytes);
    let skipped = outcome.warnings.len();
    if result.total() == 0 {
        ui::info(&with_skipped("No matching files found".to_string(), skipped));
    } else if outcome.report.dry_run {
        ui::warn(&with_skipped(
            format!("Dry run - no files removed ({removed} would be removed, {size})"),
            skipped,
        ));
    } else if outcome.report.is_success() && skipped == 0 {
        ui::success(&format!(
            "Removed {removed} file(s), kept {}, freed {size}",
            result.keep.len()
        ));
    } else {
        ui::warn(&with_skipped(
            format!(
                "Removed {removed} file(s), {} failed, kept {}",
                outcome.report.failed(),
                result.keep.len()
            ),
            skipped,
        ));
    }

    if ctx.verbose > 0 && outcome.ignored > 0 {
        ui::dim(&format!("{} entries ignored", outcome.ignored));
    }
}

/// Append the number of unreadable entries to a summary line.
fn with_skipped(summary: String, skipped: usize) -> String {
    if skipped == 0 {
        summary
    } else {
        format!("{summary}, {skipped} skipped")
    }
}

fn print_removed(ctx: &AppContext, options: &ClearOptions, file: &CandidateFile) {
    let marker = if options.dry_run {
        "→".cyan()
    } else {
        "-".red()
    };
    if ctx.verbose > 0 {
        println!(
            "  {} {} {}",
            marker,
            file.path.display(),
            format!("({})", ui::format_age(file.age(options.now))).dimmed()
        );
    } else {
        println!("  {} {}", marker, file.path.display());
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    directory: &'a Path,
    prefix: Option<&'a str>,
    now: DateTime<Utc>,
    dry_run: bool,
    keep: &'a BTreeMap<Bucket, CandidateFile>,
    delete: &'a [CandidateFile],
    removed: &'a [PathBuf],
    bytes: u64,
    warnings: Vec<String>,
    errors: Vec<String>,
}

fn print_json(options: &ClearOptions, outcome: &ClearOutcome) -> Result<()> {
    let report = JsonReport {
        directory: &options.directory,
        prefix: options.prefix.as_deref(),
        now: options.now,
        dry_run: options.dry_run,
        keep: &outcome.result.keep,
        delete: &outcome.result.delete,
        removed: &outcome.report.removed,
        bytes: outcome.report.bytes,
        warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        errors: outcome.report.errors.iter().map(ToString::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use clap::Parser;
    use filetime::FileTime;
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn backup(dir: &Path, name: &str, age: TimeDelta) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        let mtime = FileTime::from_unix_time((now() - age).timestamp(), 0);
        filetime::set_file_mtime(&path, mtime).unwrap();
        path
    }

    fn options(dir: &Path, prefix: Option<&str>, dry_run: bool) -> ClearOptions {
        ClearOptions {
            directory: dir.to_path_buf(),
            prefix: prefix.map(str::to_string),
            recursive: false,
            dry_run,
            json: false,
            now: now(),
        }
    }

    fn remaining(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn populate(dir: &Path) {
        backup(dir, "backup_12h", TimeDelta::hours(12));
        backup(dir, "backup_36h", TimeDelta::hours(36));
        backup(dir, "backup_6d", TimeDelta::days(6));
        backup(dir, "backup_10d", TimeDelta::days(10));
        backup(dir, "backup_3mo", TimeDelta::days(90));
        backup(dir, "backup_13mo", TimeDelta::days(395));
        backup(dir, "backup_25mo", TimeDelta::days(760));
    }

    #[test]
    fn test_execute_removes_unselected_files() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let outcome = execute(&options(temp_dir.path(), None, false)).unwrap();

        assert!(outcome.report.is_success());
        assert_eq!(outcome.report.removed.len(), 2);
        assert_eq!(
            remaining(temp_dir.path()),
            vec![
                "backup_10d",
                "backup_13mo",
                "backup_25mo",
                "backup_36h",
                "backup_3mo"
            ]
        );
    }

    #[test]
    fn test_execute_dry_run_removes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let outcome = execute(&options(temp_dir.path(), None, true)).unwrap();

        assert_eq!(outcome.report.removed.len(), 2);
        assert_eq!(remaining(temp_dir.path()).len(), 7);
    }

    #[test]
    fn test_execute_prefix_leaves_other_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());
        backup(temp_dir.path(), "notes.txt", TimeDelta::days(8));

        let outcome = execute(&options(temp_dir.path(), Some("backup_"), false)).unwrap();

        assert!(!outcome.result.is_kept(&temp_dir.path().join("notes.txt")));
        assert!(
            outcome
                .result
                .delete
                .iter()
                .all(|f| !f.path.ends_with("notes.txt"))
        );
        assert!(remaining(temp_dir.path()).contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_execute_second_run_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        execute(&options(temp_dir.path(), None, false)).unwrap();
        let second = execute(&options(temp_dir.path(), None, false)).unwrap();

        assert!(second.result.is_noop());
        assert_eq!(second.result.keep.len(), 5);
    }

    #[test]
    fn test_execute_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = execute(&options(&missing, None, false)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_run_json_dry_run_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());
        let ctx = AppContext {
            verbose: 0,
            quiet: true,
        };
        let mut opts = options(temp_dir.path(), None, true);
        opts.json = true;

        run(&ctx, opts).unwrap();

        assert_eq!(remaining(temp_dir.path()).len(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_fails_after_attempting_every_removal() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate(root);
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        let stuck = backup(&locked, "backup_stuck", TimeDelta::hours(3));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users can still write into read-only directories
        let writable = fs::write(locked.join("check"), "x").is_ok();
        if writable {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let ctx = AppContext {
            verbose: 0,
            quiet: true,
        };
        let mut opts = options(root, None, false);
        opts.recursive = true;

        let result = run(&ctx, opts);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(result.is_err());
        assert!(stuck.exists());
        assert!(!root.join("backup_12h").exists());
        assert!(!root.join("backup_6d").exists());
    }

    #[test]
    fn test_with_skipped() {
        assert_eq!(with_skipped("Removed 2 file(s)".to_string(), 0), "Removed 2 file(s)");
        assert_eq!(
            with_skipped("Removed 2 file(s)".to_string(), 3),
            "Removed 2 file(s), 3 skipped"
        );
    }

    #[test]
    fn test_resolve_no_recursive_overrides_settings() {
        let cli = Cli::try_parse_from(["autoclear", "--no-recursive"]).unwrap();
        let settings = Settings {
            recursive: true,
            ..Settings::default()
        };

        let resolved = ClearOptions::resolve(&cli, settings);

        assert!(!resolved.recursive);
    }

    #[test]
    fn test_resolve_prefers_cli_over_settings() {
        let cli = Cli::try_parse_from(["autoclear", "-p", "cli_", "/from/cli"]).unwrap();
        let settings = Settings {
            prefix: Some("file_".to_string()),
            directory: Some("/from/file".to_string()),
            recursive: true,
        };

        let resolved = ClearOptions::resolve(&cli, settings);

        assert_eq!(resolved.prefix.as_deref(), Some("cli_"));
        assert_eq!(resolved.directory, PathBuf::from("/from/cli"));
        assert!(resolved.recursive);
        assert!(!resolved.dry_run);
    }

    #[test]
    fn test_resolve_falls_back_to_settings() {
        let cli = Cli::try_parse_from(["autoclear", "--now", "2026-01-15T12:00:00Z"]).unwrap();
        let settings = Settings {
            prefix: None,
            directory: Some("/from/file".to_string()),
            recursive: false,
        };

        let resolved = ClearOptions::resolve(&cli, settings);

        assert_eq!(resolved.directory, PathBuf::from("/from/file"));
        assert_eq!(resolved.now, now());
    }
}
