// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Statistics calculation modules for resolved files and custom actions.

mod actions;
mod files;

use serde::Serialize;

use super::cross_reference::ResolvedFile;
use crate::package::PackageTables;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReportTotals {
    pub(crate) files: files::Totals,
    pub(crate) custom_actions: actions::Totals,
    pub(crate) features: usize,
    pub(crate) registry: usize,
}

impl ReportTotals {
    #[must_use]
    pub(crate) fn new(tables: &PackageTables, files: &[ResolvedFile]) -> Self {
        Self {
            files: files::Totals::calculate(files),
            custom_actions: actions::Totals::calculate(tables.custom_actions()),
            features: tables.features().len(),
            registry: tables.registry().len(),
        }
    }
}
