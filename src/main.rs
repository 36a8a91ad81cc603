//! `spm-licenses`: collect license texts for SwiftPM dependencies into a
//! JSON report.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging ([`logging`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Locate `Package.resolved` and the checkouts directory ([`discovery`]).
//! 4. Parse the lockfile ([`lockfile`]) and scan the checkouts ([`scanner`]).
//! 5. Join both by repository name ([`merge`]).
//! 6. Write the JSON report ([`report::json`]) and print a summary
//!    ([`report::terminal`]).
//!
//! Any fatal error exits with code `1` and a message naming the failed path.

mod cli;
mod config;
mod discovery;
mod error;
mod lockfile;
mod logging;
mod merge;
mod models;
mod report;
mod scanner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use cli::Cli;
use config::{load_config, ScanPolicy};
use discovery::{DiscoveryRequest, ResolvedPaths};
use models::MergedReport;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let config = load_config(&discovery::project_dir(&cli.project), cli.config.as_deref())
        .context("failed to load config")?;

    let paths = discovery::resolve(&DiscoveryRequest {
        project: cli.project.clone(),
        build_dir: cli.custom_build_path.clone(),
        lockfile: cli.lockfile.clone(),
        checkouts: cli.checkouts.clone(),
        derived_data: discovery::default_derived_data(),
    })?;

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} checkouts")?
                .progress_chars("#>-"),
        );
        pb
    };

    let merged = build_report(&paths, &config.scan, &progress)?;
    progress.finish_and_clear();

    let output = cli
        .output_json_file
        .or(config.output.path)
        .unwrap_or_else(|| PathBuf::from("licenses.json"));

    report::json::write(&merged, &output)?;
    info!(path = %output.display(), dependencies = merged.len(), "wrote license report");

    report::terminal::render(&merged, &output, cli.quiet);
    Ok(())
}

/// Parse the lockfile, scan the checkouts and merge the two.
fn build_report(
    paths: &ResolvedPaths,
    policy: &ScanPolicy,
    progress: &ProgressBar,
) -> Result<MergedReport> {
    let dependencies = lockfile::load(&paths.lockfile)?;
    info!(count = dependencies.len(), "parsed lockfile");

    let licenses = scanner::scan_with_progress(&paths.checkouts, policy, progress)?;

    Ok(merge::merge(dependencies, &licenses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    /// Run the whole pipeline and return the serialized report.
    fn generate(lockfile: &Path, checkouts: &Path) -> Result<Vec<u8>> {
        let paths = ResolvedPaths {
            lockfile: lockfile.to_path_buf(),
            checkouts: checkouts.to_path_buf(),
        };
        let merged = build_report(&paths, &ScanPolicy::default(), &ProgressBar::hidden())?;
        Ok(report::json::serialize(&merged)?)
    }

    fn fixture(root: &Path) -> (PathBuf, PathBuf) {
        let lockfile = root.join("Package.resolved");
        fs::write(
            &lockfile,
            r#"{
  "pins" : [
    {
      "identity" : "swift-algorithms",
      "kind" : "remoteSourceControl",
      "location" : "https://github.com/apple/swift-algorithms.git",
      "state" : { "revision" : "b14b7f4c528c942f121c8b860b9410b2bf57825e", "version" : "1.0.0" }
    }
  ],
  "version" : 2
}"#,
        )
        .unwrap();

        let checkouts = root.join("checkouts");
        fs::create_dir_all(checkouts.join("swift-algorithms")).unwrap();
        fs::write(
            checkouts.join("swift-algorithms").join("LICENSE.txt"),
            "MIT License...",
        )
        .unwrap();

        (lockfile, checkouts)
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (lockfile, checkouts) = fixture(dir.path());

        let bytes = generate(&lockfile, &checkouts).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "name": "swift-algorithms",
                "url": "https://github.com/apple/swift-algorithms.git",
                "version": "1.0.0",
                "license": "MIT License..."
            }])
        );
    }

    #[test]
    fn test_output_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (lockfile, checkouts) = fixture(dir.path());

        let first = generate(&lockfile, &checkouts).unwrap();
        let second = generate(&lockfile, &checkouts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_lockfile_gives_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let (_, checkouts) = fixture(dir.path());

        let bytes = generate(&dir.path().join("absent.resolved"), &checkouts).unwrap();
        assert_eq!(bytes, b"[]\n");
    }

    #[test]
    fn test_missing_checkouts_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (lockfile, _) = fixture(dir.path());

        let err = generate(&lockfile, &dir.path().join("nowhere")).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_malformed_lockfile_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (lockfile, checkouts) = fixture(dir.path());
        fs::write(&lockfile, "{ \"version\": 2 }").unwrap();

        let err = generate(&lockfile, &checkouts).unwrap_err();
        assert!(err.to_string().contains("Package.resolved"));
    }
}
