// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Resolves Directory table entries to absolute paths by walking their parent links.

use std::collections::HashSet;

use super::errors::{ReportError, ReportResult};
use crate::package::{DirectoryRecord, IndexedTable};

/// Separator used in resolved installer paths.
pub(crate) const PATH_SEPARATOR: &str = "\\";

pub struct DirectoryResolver {
    directories: IndexedTable<str, DirectoryRecord>,
}

impl DirectoryResolver {
    #[must_use]
    pub fn new(directories: Vec<DirectoryRecord>) -> Self {
        Self {
            directories: IndexedTable::new("Directory", directories, DirectoryRecord::key),
        }
    }

    /// Resolve `directory` to the backslash-joined long names of its ancestors and itself.
    ///
    /// An empty id resolves to an empty path. A directory whose parent is empty or itself is a
    /// root and contributes only its own name.
    ///
    /// # Errors
    /// Returns an error if a directory in the chain does not exist or the chain loops.
    pub fn resolve(&self, directory: &str) -> ReportResult<String> {
        if directory.is_empty() {
            return Ok(String::new());
        }

        let mut segments = Vec::new();
        let mut visited = HashSet::new();
        let mut current = directory;
        loop {
            if !visited.insert(current) {
                return Err(ReportError::DirectoryCycle {
                    directory: directory.to_string(),
                    repeated: current.to_string(),
                });
            }
            let record = self.directories.lookup(current)?;
            if let Some(name) = record.target_name().filter(|name| !name.is_empty()) {
                segments.push(name);
            }
            if record.is_root() {
                break;
            }
            current = &record.parent;
        }

        segments.reverse();
        Ok(segments.join(PATH_SEPARATOR))
    }
}
