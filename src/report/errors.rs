// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines error types for cross-reference resolution (missing entries, directory cycles).

use thiserror::Error;

use crate::package::LookupError;

/// Result type for report generation.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Inconsistencies that make a package impossible to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    // A mandatory reference (file to component, directory to parent) does not resolve.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    // The parent chain of a directory loops without reaching a root.
    #[error("Directory cycle detected while resolving {directory}: {repeated} is visited twice")]
    DirectoryCycle { directory: String, repeated: String },
}
