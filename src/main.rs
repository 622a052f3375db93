// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Args;
use msi_inspector::package::Package;
use msi_inspector::report::{summarize_report, InstalledPaths, Report};

fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();
    let package = open_package(&args.package, Duration::from_secs(args.timeout))?;
    let installed_paths = create_installed_paths(args.installed_paths.as_ref())?;
    let report = Report::new(&package, &installed_paths)
        .with_context(|| format!("Failed to analyze package: {}", args.package.display()))?;
    write_report_to_file(&report, &args.report)?;
    summarize_report(&report);
    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "msi_inspector=info";

/// Log to stderr so the summary on stdout stays clean.
fn init_logging() -> Result<()> {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Build the log filter from `RUST_LOG` directives, falling back to `info` for this crate.
fn log_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid {} directives: {directives}", EnvFilter::DEFAULT_ENV)),
        None => Ok(EnvFilter::try_new(DEFAULT_LOG_FILTER)?),
    }
}

/// Open the package and read its tables.
///
/// # Errors
/// Returns an error if the package type is unsupported or its tables cannot be read.
fn open_package(path: &Path, timeout: Duration) -> Result<Package> {
    info!(package = %path.display(), "Opening package");

    let package = Package::with_timeout(path.to_path_buf(), timeout)
        .with_context(|| format!("Failed to open package: {}", path.display()))?;

    info!(
        package = %path.display(),
        files = package.tables().files().len(),
        components = package.tables().components().len(),
        "Package opened"
    );
    Ok(package)
}

fn create_installed_paths(path: Option<&PathBuf>) -> Result<InstalledPaths> {
    if let Some(installed_paths) = path {
        Ok(InstalledPaths::from_file(installed_paths)
            .with_context(|| "Failed to read installed paths file")?)
    } else {
        Ok(InstalledPaths::empty())
    }
}

/// Write the report to a file.
///
/// # Errors
/// Returns an error if the report cannot be serialized to JSON or if the file cannot be created.
fn write_report_to_file(report: &Report<'_>, dest: &Path) -> Result<()> {
    info!(file = %dest.display(), "Writing report");
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to serialize report to JSON: {}", dest.display()))?;
    Ok(())
}
