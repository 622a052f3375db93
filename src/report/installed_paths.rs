// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Resolves component GUIDs to the paths they were installed to on a live system.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source of installed component locations.
pub trait InstalledPathResolver {
    /// Get the path the component with `component_id` was installed to.
    ///
    /// Returns `None` if the component is not installed or its location is unknown.
    fn resolve(&self, component_id: &str) -> Option<String>;
}

/// Installed component locations read from a JSON object mapping GUIDs to paths.
#[derive(Debug, Default)]
pub struct InstalledPaths {
    paths: HashMap<String, String>,
}

impl InstalledPaths {
    /// Create an `InstalledPaths` that knows no installed components.
    ///
    /// Every file is then reported at its location inside the package.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load installed component locations from a JSON file.
    ///
    /// GUIDs are matched case-insensitively.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object of strings.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read installed paths file: {}",
                path.as_ref().display()
            )
        })?;
        let paths: HashMap<String, String> =
            serde_json::from_str(&content).with_context(|| {
                format!(
                    "Failed to parse installed paths file: {}",
                    path.as_ref().display()
                )
            })?;
        Ok(Self::from_map(paths))
    }

    #[must_use]
    pub fn from_map(paths: HashMap<String, String>) -> Self {
        Self {
            paths: paths
                .into_iter()
                .map(|(guid, path)| (guid.to_ascii_uppercase(), path))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl InstalledPathResolver for InstalledPaths {
    fn resolve(&self, component_id: &str) -> Option<String> {
        if component_id.is_empty() {
            return None;
        }
        self.paths
            .get(&component_id.to_ascii_uppercase())
            .filter(|path| !path.is_empty())
            .cloned()
    }
}
