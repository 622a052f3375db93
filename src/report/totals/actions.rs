// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use serde::Serialize;

use crate::package::CustomActionRecord;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) deferred: usize,
    pub(crate) elevated: usize,
    pub(crate) audited: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(actions: &[CustomActionRecord]) -> Self {
        actions.iter().fold(Totals::default(), |mut totals, action| {
            let flags = action.flags;
            totals.deferred += usize::from(flags.deferred());
            totals.elevated += usize::from(flags.elevated());
            totals.audited += usize::from(flags.affects_system_state());
            totals.total += 1;
            totals
        })
    }
}
