// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache partition implementation.
//!
//! Each partition owns a Swiss Table (`hashbrown::HashMap`) guarded by its own reader/writer lock.
//! Partitions are cache-line aligned so that neighbouring locks never share a cache line.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

/// Stable identifier of a partition.
///
/// A cache with `n` partitions names them `"0"` through `"n-1"`. The identifier is also the
/// member name placed on the hash ring, so it must not change for the lifetime of a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(Arc<str>);

impl PartitionId {
    /// Creates an identifier from an arbitrary name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Creates the identifier of the partition at `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::new(index.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One shard of the cache's key space.
///
/// Reads take the shared lock and never block each other; writes take the exclusive lock and
/// block only readers and writers of this partition.
///
/// Values are held as [`Arc<V>`]: a read hands out another handle to the stored value, and a
/// write replaces the handle rather than touching the value behind it, so callers can never
/// mutate an entry they obtained from the cache.
#[repr(align(64))]
pub struct CachePartition<V> {
    id: PartitionId,
    entries: RwLock<HashMap<String, Arc<V>>>,
}

impl<V> CachePartition<V> {
    /// Creates an empty partition.
    #[must_use]
    pub fn new(id: PartitionId) -> Self {
        Self {
            id,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the identifier of this partition.
    #[must_use]
    pub fn id(&self) -> &PartitionId {
        &self.id
    }

    /// Looks up a key.
    ///
    /// Has no side effects: there is no recency tracking and no expiry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.read().get(key).cloned()
    }

    /// Inserts a value, replacing whatever was stored under `key`.
    ///
    /// Concurrent writers to the same key are serialized by the partition lock; the last one to
    /// acquire it wins.
    pub fn set(&self, key: String, value: Arc<V>) {
        self.entries.write().insert(key, value);
    }

    /// Returns the number of entries in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the partition holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> fmt::Debug for CachePartition<V> {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePartition")
            .field("id", &self.id)
            .field("len", &self.len())
            .finish()
    }
}
