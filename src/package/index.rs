// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Sorted-vector index over table records, built once and queried by binary search.

use thiserror::Error;

/// Errors returned by must-exist lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Unable to find {table} table entry: {key}")]
    NotFound { table: &'static str, key: String },
}

/// Read-only index over the records of one package table.
///
/// Records are sorted once by key with a stable sort, so records sharing a key keep their fetch
/// order and lookups always return the first of them.
pub struct IndexedTable<K: ?Sized, V> {
    table: &'static str,
    entries: Vec<V>,
    key: fn(&V) -> &K,
}

impl<K, V> IndexedTable<K, V>
where
    K: Ord + ToString + ?Sized,
{
    /// Build the index from records in fetch order.
    #[must_use]
    pub fn new(table: &'static str, mut entries: Vec<V>, key: fn(&V) -> &K) -> Self {
        entries.sort_by(|a, b| key(a).cmp(key(b)));
        Self {
            table,
            entries,
            key,
        }
    }

    /// Look up the record for `key`.
    ///
    /// # Errors
    /// Returns `LookupError::NotFound` if no record has exactly this key.
    pub fn lookup(&self, key: &K) -> Result<&V, LookupError> {
        self.lookup_optional(key)
            .ok_or_else(|| LookupError::NotFound {
                table: self.table,
                key: key.to_string(),
            })
    }

    /// Look up the record for `key`, where absence is an expected outcome.
    #[must_use]
    pub fn lookup_optional(&self, key: &K) -> Option<&V> {
        let idx = self.entries.partition_point(|entry| (self.key)(entry) < key);
        self.entries
            .get(idx)
            .filter(|entry| (self.key)(*entry) == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the records in key order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.entries.iter()
    }
}
