// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Decodes packed `short|long` name fields used by the File and Directory tables.

/// Separator between the 8.3 short name and the long name.
const NAME_SEPARATOR: char = '|';

/// Separator between the target and source halves of a `DefaultDir` value.
const SOURCE_SEPARATOR: char = ':';

/// `DefaultDir` target meaning "the parent directory itself".
const SAME_AS_PARENT: &str = ".";

/// Decode a packed name field into its display name.
///
/// Fields longer than 8.3 are stored as `SHORTN~1.EXT|Long Name.ext`; the long half is returned.
/// A field without a separator is a conforming short name that doubles as the long name and is
/// returned unchanged. Case and path separators are left untouched.
#[must_use]
pub fn decode_name(packed: &str) -> &str {
    match packed.split_once(NAME_SEPARATOR) {
        Some((_, long)) => long,
        None => packed,
    }
}

/// Decode the target half of a Directory table `DefaultDir` value.
///
/// `DefaultDir` has the form `target[:source]` where both halves are packed names. Returns `None`
/// when the target is `.`, i.e. the directory adds no path segment below its parent.
#[must_use]
pub(crate) fn decode_default_dir(default_dir: &str) -> Option<&str> {
    let target = default_dir
        .split_once(SOURCE_SEPARATOR)
        .map_or(default_dir, |(target, _)| target);
    let name = decode_name(target);
    (name != SAME_AS_PARENT).then_some(name)
}
