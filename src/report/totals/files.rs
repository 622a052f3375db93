// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use serde::Serialize;

use crate::report::cross_reference::{FileKind, PathSource, ResolvedFile};

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) executables: usize,
    pub(crate) libraries: usize,
    pub(crate) other: usize,
    pub(crate) installed: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(files: &[ResolvedFile]) -> Self {
        files.iter().fold(Totals::default(), |mut totals, file| {
            match file.kind {
                FileKind::Executable => totals.executables += 1,
                FileKind::Library => totals.libraries += 1,
                FileKind::Other => totals.other += 1,
            }
            if file.source == PathSource::Installed {
                totals.installed += 1;
            }
            totals.total += 1;
            totals
        })
    }
}
