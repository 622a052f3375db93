// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines the `PackageExtractor` trait for exporting package tables with external tools.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use wait_timeout::ChildExt;

use super::idt::{IdtDatabase, IdtError};
use super::tables::TableError;

/// Default timeout for table export commands (30 seconds).
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for package operations.
pub type PackageResult<T> = std::result::Result<T, PackageError>;

/// Errors that can occur during package operations.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to create/delete temporary directory")]
    TempDirFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Command not found: {command} (package: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (package: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command} (package: {path:?})")]
    CommandTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },
    #[error("Extraction failed for package {path:?}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
    #[error("Unsupported package type: {extension}")]
    UnsupportedPackageType { extension: String },
    #[error("Table archive error: {0}")]
    IdtError(#[from] IdtError),
    #[error("Table error: {0}")]
    TableError(#[from] TableError),
}

/// Wait for `msidump` or another export command to exit, killing it once `timeout` elapses.
///
/// Unix only: a process ended by a signal is reported with the signal number.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process completed within the timeout
/// - `Err(PackageError::CommandTimeout)` if the process timed out
/// - `Err(PackageError::CommandFailed)` if there was an error waiting for the process
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
    package_path: &Path,
) -> PackageResult<std::process::ExitStatus> {
    let status = child
        .wait_timeout(timeout)
        .map_err(|e| PackageError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: e,
        })?;

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(PackageError::CommandTimeout {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            timeout,
        });
    };

    if status.code().is_some() {
        return Ok(status);
    }
    let reason = match status.signal() {
        Some(signal) => format!("Process terminated by signal: {signal}"),
        None => "Unknown process termination".to_string(),
    };
    Err(PackageError::CommandFailed {
        command: command.to_string(),
        path: package_path.to_path_buf(),
        source: std::io::Error::other(reason),
    })
}

/// Trait for package extractors that export the package tables to IDT archives.
pub(crate) trait PackageExtractor {
    const EXTENSION: &'static str; // Packages are identified by their extension.

    /// Export the package tables into a destination directory and load them.
    ///
    /// # Errors
    /// Returns an error if the export fails or takes longer than `timeout`.
    fn extract(package: &Path, dest: &TempDir, timeout: Duration) -> PackageResult<IdtDatabase>;

    /// Load the exported archives.
    ///
    /// # Errors
    /// Returns an error if an archive cannot be parsed or no archives were exported.
    fn process(dest: &TempDir, package: &Path) -> PackageResult<IdtDatabase> {
        let database = IdtDatabase::load_dir(dest.path())?;
        if database.is_empty() {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: "Extraction completed but no tables were found".to_string(),
            })
        } else {
            Ok(database)
        }
    }
}
