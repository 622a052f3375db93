// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Opens installer packages and decodes their tables. Provides the row model, the table index and
//! the name and custom action decoders used by the report.

mod action;
mod extractor;
mod idt;
mod index;
mod msidump;
mod name;
mod row;
mod tables;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::info;

pub use action::{ActionFlags, ActionKind};
pub use extractor::{PackageError, PackageResult, DEFAULT_EXTRACTION_TIMEOUT};
use extractor::PackageExtractor;
pub use idt::{Column, ColumnKind, IdtDatabase, IdtError, IdtTable};
pub use index::{IndexedTable, LookupError};
use msidump::MsiDumpExtractor;
pub use name::decode_name;
pub use row::{FetchError, Row, RowError, RowFetcher, Value, NULL_INTEGER};
pub use tables::{
    ComponentRecord, CustomActionRecord, DirectoryRecord, FeatureRecord, FileRecord,
    PackageTables, ProductProperties, RegistryRecord, RegistryRoot, TableError, TableResult,
};

/// An installer package whose tables have been read into memory.
pub struct Package {
    path: PathBuf,
    tables: PackageTables,
}

impl Package {
    /// Open a package with the default extraction timeout.
    ///
    /// `path` is either an installer package or a directory of exported IDT archives.
    ///
    /// # Errors
    /// Returns an error if the package type is unsupported, the tables cannot be exported, or a
    /// table is missing or malformed.
    pub fn new(path: PathBuf) -> PackageResult<Self> {
        Self::with_timeout(path, DEFAULT_EXTRACTION_TIMEOUT)
    }

    /// Open a package, killing the export tool after `timeout`.
    ///
    /// # Errors
    /// See [`Package::new`].
    pub fn with_timeout(path: PathBuf, timeout: Duration) -> PackageResult<Self> {
        let database = Self::extract(&path, timeout)?;
        info!(package = %path.display(), tables = database.len(), "Loaded package tables");
        let tables = PackageTables::load(&database)?;
        Ok(Self { path, tables })
    }

    /// Build a package from any row source.
    ///
    /// # Errors
    /// Returns an error if a table is missing or malformed.
    pub fn from_fetcher(path: PathBuf, fetcher: &impl RowFetcher) -> PackageResult<Self> {
        let tables = PackageTables::load(fetcher)?;
        Ok(Self { path, tables })
    }

    /// Get the path to the package.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the decoded tables.
    #[must_use]
    pub fn tables(&self) -> &PackageTables {
        &self.tables
    }

    fn extract(path: &Path, timeout: Duration) -> PackageResult<IdtDatabase> {
        if path.is_dir() {
            return Ok(IdtDatabase::load_dir(path)?);
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| PackageError::UnsupportedPackageType {
                extension: "unknown".to_string(),
            })?;

        let dest = TempDir::new().map_err(|e| PackageError::TempDirFailed { source: e })?;
        let result = if extension.eq_ignore_ascii_case(MsiDumpExtractor::EXTENSION) {
            MsiDumpExtractor::extract(path, &dest, timeout)
        } else {
            Err(PackageError::UnsupportedPackageType {
                extension: extension.to_string(),
            })
        };
        // Explicitly close the temporary directory to prevent any errors from being hidden.
        dest.close()
            .map_err(|e| PackageError::TempDirFailed { source: e })?;
        result
    }
}
