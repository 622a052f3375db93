// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Utility functions for output formatting.

use super::directory_resolver::PATH_SEPARATOR;

/// Find the longest directory prefix shared by all given backslash-separated paths.
///
/// Only directory segments are compared, so the file name of every path survives stripping.
/// Returns `None` if the paths slice is empty or if there is no common prefix.
///
/// # Examples
///
/// ```ignore
/// let paths = ["C:\\App\\bin\\a.exe", "C:\\App\\lib\\b.dll"];
/// assert_eq!(find_common_directory(&paths), Some("C:\\App".to_string()));
/// ```
#[must_use]
pub(crate) fn find_common_directory(paths: &[&str]) -> Option<String> {
    let (first, rest) = paths.split_first()?;

    let mut common = directory_segments(first);
    for path in rest {
        let segments = directory_segments(path);
        let shared = common
            .iter()
            .zip(&segments)
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        None
    } else {
        Some(common.join(PATH_SEPARATOR))
    }
}

fn directory_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    segments.pop();
    segments
}

/// Strip `prefix` and the following separator from `path`.
#[must_use]
pub(crate) fn strip_directory<'a>(path: &'a str, prefix: Option<&str>) -> &'a str {
    prefix
        .and_then(|prefix| path.get(prefix.len()..))
        .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
        .unwrap_or(path)
}
