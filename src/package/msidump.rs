// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Implements installer package table export using `msidump` from msitools.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tracing::debug;

use super::extractor::{wait_with_timeout, PackageError, PackageExtractor, PackageResult};
use super::idt::IdtDatabase;

const MSIDUMP: &str = "msidump";

pub(crate) struct MsiDumpExtractor;

impl PackageExtractor for MsiDumpExtractor {
    const EXTENSION: &'static str = "msi";

    /// Export all tables of an installer package into a temporary directory.
    ///
    /// # Errors
    /// Returns an error if the package cannot be exported.
    ///
    /// # Timeout
    /// If `msidump` runs longer than `timeout`, the process is killed and a `CommandTimeout`
    /// error is returned.
    fn extract(package: &Path, dest: &TempDir, timeout: Duration) -> PackageResult<IdtDatabase> {
        debug!(package = %package.display(), dest = %dest.path().display(), "Running {MSIDUMP}");
        let mut child = match std::process::Command::new(MSIDUMP)
            .arg("--tables")
            .arg("--directory")
            .arg(dest.path())
            .arg(package)
            .stdout(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    return Err(PackageError::CommandNotFound {
                        command: MSIDUMP.to_string(),
                        path: package.to_path_buf(),
                    });
                }
                return Err(PackageError::CommandFailed {
                    command: MSIDUMP.to_string(),
                    path: package.to_path_buf(),
                    source: e,
                });
            }
        };

        let exit_status = wait_with_timeout(&mut child, timeout, MSIDUMP, package)?;

        if exit_status.success() {
            Self::process(dest, package)
        } else {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: format!(
                    "{MSIDUMP} exited with non-zero status: {}",
                    exit_status.code().unwrap_or(-1)
                ),
            })
        }
    }
}
