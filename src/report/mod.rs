// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Report struct and public API for cross-referencing package tables.

mod console;
mod cross_reference;
mod directory_resolver;
mod errors;
mod installed_paths;
mod totals;
mod utils;

pub use console::summarize_report;
pub use cross_reference::{
    AuditedAction, CrossReferenceResolver, FileKind, PathSource, ResolvedFile,
};
pub use directory_resolver::DirectoryResolver;
pub use errors::{ReportError, ReportResult};
pub use installed_paths::{InstalledPathResolver, InstalledPaths};

use serde::Serialize;
use tracing::info;

use crate::package::{FeatureRecord, Package, ProductProperties, RegistryRecord};
use totals::ReportTotals;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    package: String,
    properties: &'a ProductProperties,
    totals: ReportTotals,
    features: &'a [FeatureRecord],
    custom_actions: Vec<AuditedAction>,
    files: Vec<ResolvedFile>,
    registry: &'a [RegistryRecord],
}

impl<'a> Report<'a> {
    /// Create a new report.
    ///
    /// Files are listed executables first, then libraries, then everything else, each group in
    /// File table key order.
    ///
    /// # Errors
    /// Returns an error if a file has no owning component or a directory cannot be resolved.
    pub fn new(package: &'a Package, installed: &dyn InstalledPathResolver) -> ReportResult<Self> {
        let tables = package.tables();
        let resolver = CrossReferenceResolver::new(tables, installed);

        let mut files = resolver.files()?;
        files.sort_by_key(|file| file.kind);
        let custom_actions = resolver.audited_actions(tables.custom_actions());
        let totals = ReportTotals::new(tables, &files);
        info!(
            files = files.len(),
            audited_actions = custom_actions.len(),
            "Resolved package cross references"
        );

        Ok(Self {
            package: package
                .path()
                .canonicalize()
                .unwrap_or_else(|_| package.path().to_path_buf())
                .to_string_lossy()
                .to_string(),
            properties: tables.properties(),
            totals,
            features: tables.features(),
            custom_actions,
            files,
            registry: tables.registry(),
        })
    }

    #[must_use]
    pub fn properties(&self) -> &ProductProperties {
        self.properties
    }

    #[must_use]
    pub fn features(&self) -> &[FeatureRecord] {
        self.features
    }

    /// Custom actions that run deferred or elevated.
    #[must_use]
    pub fn custom_actions(&self) -> &[AuditedAction] {
        &self.custom_actions
    }

    #[must_use]
    pub fn files(&self) -> &[ResolvedFile] {
        &self.files
    }

    #[must_use]
    pub fn registry(&self) -> &[RegistryRecord] {
        self.registry
    }
}
