// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Joins the File, Component and Directory tables into resolved file paths and relates custom
//! actions to the files they run.

use serde::Serialize;
use tracing::debug;

use super::directory_resolver::{DirectoryResolver, PATH_SEPARATOR};
use super::errors::ReportResult;
use super::installed_paths::InstalledPathResolver;
use crate::package::{
    ActionFlags, ActionKind, ComponentRecord, CustomActionRecord, FileRecord, IndexedTable,
    PackageTables,
};

/// Coarse classification of a file by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FileKind {
    Executable,
    Library,
    Other,
}

impl FileKind {
    /// Classify `path` by the extension of its last segment, ignoring case.
    #[must_use]
    pub fn classify(path: &str) -> Self {
        let name = path.rsplit(['\\', '/']).next().unwrap_or(path);
        let extension = name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("exe") => Self::Executable,
            Some("dll" | "pyd") => Self::Library,
            _ => Self::Other,
        }
    }
}

/// Where a resolved path comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathSource {
    /// Computed from the package directory tree.
    Package,
    /// Reported by the system the package is installed on.
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    pub file: String,
    pub component: String,
    pub path: String,
    pub kind: FileKind,
    pub source: PathSource,
}

/// A custom action that changes system state, with its source file when it names one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditedAction {
    pub action: String,
    pub flags: ActionFlags,
    pub kind: ActionKind,
    pub source: String,
    pub source_file: Option<String>,
    pub target: String,
}

pub struct CrossReferenceResolver<'a> {
    files: IndexedTable<str, FileRecord>,
    components: IndexedTable<str, ComponentRecord>,
    directories: DirectoryResolver,
    installed: &'a dyn InstalledPathResolver,
}

impl<'a> CrossReferenceResolver<'a> {
    #[must_use]
    pub fn new(tables: &PackageTables, installed: &'a dyn InstalledPathResolver) -> Self {
        Self {
            files: IndexedTable::new("File", tables.files().to_vec(), FileRecord::key),
            components: IndexedTable::new(
                "Component",
                tables.components().to_vec(),
                ComponentRecord::key,
            ),
            directories: DirectoryResolver::new(tables.directories().to_vec()),
            installed,
        }
    }

    /// Resolve the path of a single file.
    ///
    /// The installed location of the owning component takes precedence over the location
    /// computed from the directory tree.
    ///
    /// # Errors
    /// Returns an error if the owning component or a directory in its chain does not exist.
    pub fn resolve_file(&self, file: &FileRecord) -> ReportResult<ResolvedFile> {
        let component = self.components.lookup(&file.component)?;
        let (path, source) = match self.installed.resolve(&component.component_id) {
            Some(path) => (path, PathSource::Installed),
            None => {
                let directory = self.directories.resolve(&component.directory)?;
                (join_path(&directory, file.long_name()), PathSource::Package)
            }
        };
        debug!(file = %file.file, path = %path, "Resolved file");

        Ok(ResolvedFile {
            file: file.file.clone(),
            component: component.component.clone(),
            kind: FileKind::classify(&path),
            path,
            source,
        })
    }

    /// Resolve all files, ordered by file key.
    ///
    /// # Errors
    /// Returns the first resolution error; see [`CrossReferenceResolver::resolve_file`].
    pub fn files(&self) -> ReportResult<Vec<ResolvedFile>> {
        self.files.iter().map(|file| self.resolve_file(file)).collect()
    }

    /// Relate a custom action to the file its source column names, if any.
    #[must_use]
    pub fn audit_action(&self, action: &CustomActionRecord) -> AuditedAction {
        // The source may name a Binary table stream or a property instead of a file.
        let source_file = self
            .files
            .lookup_optional(&action.source)
            .map(|file| file.long_name().to_string());
        AuditedAction {
            action: action.action.clone(),
            flags: action.flags,
            kind: action.flags.kind(),
            source: action.source.clone(),
            source_file,
            target: action.target.clone(),
        }
    }

    /// Audit the actions that run deferred or elevated, keeping table order.
    #[must_use]
    pub fn audited_actions(&self, actions: &[CustomActionRecord]) -> Vec<AuditedAction> {
        actions
            .iter()
            .filter(|action| action.flags.affects_system_state())
            .map(|action| self.audit_action(action))
            .collect()
    }
}

fn join_path(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{directory}{PATH_SEPARATOR}{name}")
    }
}
