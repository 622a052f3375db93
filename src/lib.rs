// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for inspecting Windows Installer packages.
//!
//! This crate provides functionality to:
//! - Export the tables of an installer package and decode their rows
//! - Resolve every packaged file to its installation path
//! - Classify custom actions and flag the ones running deferred or elevated
//! - Generate reports on product properties, features, binaries and registry entries

pub mod package;
pub mod report;

// Re-export key types for convenience
pub use package::{ActionFlags, IndexedTable, Package, PackageTables};
pub use report::{InstalledPaths, Report};
