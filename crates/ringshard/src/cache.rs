// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Partitioned cache implementation.
//!
//! This module provides the main [`Cache`] type and its builder.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{Level, event};

use crate::cacheable::Cacheable;
use crate::error::{Error, Result};
use crate::hasher::{KeyHasher, Md5Hasher};
use crate::partition::{CachePartition, PartitionId};
use crate::ring::{HashRing, RingConfig};

/// Number of partitions used by [`CacheBuilder`] unless configured otherwise.
pub const DEFAULT_PARTITION_COUNT: usize = 7;

/// A concurrent in-memory cache partitioned by a consistent hash ring.
///
/// Every key is owned by exactly one partition, chosen by the [`HashRing`]. Each partition has
/// its own reader/writer lock, so operations on keys owned by different partitions never contend
/// and operations on the same key are serialized by a single lock.
///
/// The partition set is fixed at construction. A cache with zero partitions is inert: `set`
/// discards its input and `get` always returns `None`, exactly like a miss.
///
/// Cloning is cheap and yields another handle to the same storage.
///
/// # Examples
///
/// ```
/// use ringshard::Cache;
///
/// let cache = Cache::<String>::new(7);
/// cache.set("Key1", "Data1".to_string());
///
/// assert_eq!(cache.get("Key1").as_deref().map(String::as_str), Some("Data1"));
/// assert!(cache.get("Key2").is_none());
/// ```
pub struct Cache<V> {
    partitions: Arc<[CachePartition<V>]>,
    ring: Arc<HashRing>,
}

impl<V: Cacheable> Cache<V> {
    /// Creates a cache with `partition_count` partitions, the default ring configuration and
    /// the [`Md5Hasher`].
    ///
    /// Passing zero produces an inert cache.
    #[must_use]
    pub fn new(partition_count: usize) -> Self {
        Self::from_parts(partition_count, RingConfig::default(), Arc::new(Md5Hasher))
    }

    /// Creates a new builder for configuring a `Cache`.
    #[must_use]
    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    fn from_parts(partition_count: usize, config: RingConfig, hasher: Arc<dyn KeyHasher>) -> Self {
        let ids: Vec<PartitionId> = (0..partition_count).map(PartitionId::from_index).collect();
        let partitions: Vec<CachePartition<V>> = ids.iter().cloned().map(CachePartition::new).collect();
        let ring = HashRing::new(ids, config, hasher);

        if partition_count == 0 {
            event!(Level::DEBUG, "cache created without partitions, all lookups will miss");
        } else {
            event!(Level::DEBUG, partitions = partition_count, "cache created");
        }

        Self {
            partitions: partitions.into(),
            ring: Arc::new(ring),
        }
    }

    /// Looks up a key.
    ///
    /// Returns `None` both when the key is absent and when the cache has no partitions; callers
    /// should recompute the value from its source in either case.
    ///
    /// The returned handle shares the stored value. It cannot be used to modify the entry, and a
    /// later [`set`](Self::set) of the same key does not affect it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.owner(key)?.get(key)
    }

    /// Stores a value under `key`, replacing any previous value.
    ///
    /// The value must be complete when it is stored: the cache does not validate or derive
    /// anything from it. On an inert cache the value is dropped.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Arc<V>>) {
        let key = key.into();
        match self.owner(&key) {
            Some(partition) => partition.set(key, value.into()),
            None => event!(Level::TRACE, "write discarded, cache has no partitions"),
        }
    }

    /// Returns the textual rendering of the value stored under `key`.
    #[must_use]
    pub fn render(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| value.render())
    }
}

impl<V> Cache<V> {
    /// Returns the number of partitions.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Returns the identifier of the partition that owns `key`.
    #[must_use]
    pub fn partition_for(&self, key: &str) -> Option<&PartitionId> {
        self.ring.locate_key(key.as_bytes())
    }

    /// Returns the hash ring used for routing.
    #[must_use]
    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Returns the total number of entries across all partitions.
    ///
    /// Acquires every partition's read lock in turn, so the result is not a consistent snapshot
    /// under concurrent writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.iter().map(CachePartition::len).sum()
    }

    /// Returns `true` if no partition holds an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(CachePartition::is_empty)
    }

    /// Returns the number of entries held by each partition.
    #[must_use]
    pub fn partition_lens(&self) -> Vec<(PartitionId, usize)> {
        self.partitions
            .iter()
            .map(|partition| (partition.id().clone(), partition.len()))
            .collect()
    }

    fn owner(&self, key: &str) -> Option<&CachePartition<V>> {
        self.ring
            .locate_index(key.as_bytes())
            .and_then(|index| self.partitions.get(index))
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            partitions: Arc::clone(&self.partitions),
            ring: Arc::clone(&self.ring),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("partitions", &self.partitions)
            .field("ring", &self.ring)
            .finish()
    }
}

/// Builder for configuring a [`Cache`].
///
/// # Examples
///
/// ```
/// use ringshard::{Cache, RingConfig, XxHasher};
///
/// let cache = Cache::<String>::builder()
///     .partitions(16)
///     .ring_config(RingConfig::new(40, 1.25)?)
///     .hasher(XxHasher::default())
///     .build()?;
///
/// assert_eq!(cache.partition_count(), 16);
/// # Ok::<(), ringshard::Error>(())
/// ```
pub struct CacheBuilder<V> {
    partitions: isize,
    config: RingConfig,
    hasher: Arc<dyn KeyHasher>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Default for CacheBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheBuilder<V> {
    /// Creates a new builder with default settings.
    ///
    /// Defaults:
    /// - `partitions`: [`DEFAULT_PARTITION_COUNT`]
    /// - `ring_config`: [`RingConfig::default`]
    /// - `hasher`: [`Md5Hasher`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            partitions: DEFAULT_PARTITION_COUNT.cast_signed(),
            config: RingConfig::default(),
            hasher: Arc::new(Md5Hasher),
            _marker: PhantomData,
        }
    }

    /// Sets the number of partitions.
    ///
    /// The count is signed so that values read from untrusted configuration can be passed
    /// through unchanged; negative counts are rejected by [`build`](Self::build).
    #[must_use]
    pub const fn partitions(mut self, count: isize) -> Self {
        self.partitions = count;
        self
    }

    /// Sets the ring configuration.
    #[must_use]
    pub const fn ring_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the hash strategy used to place keys and virtual nodes.
    #[must_use]
    pub fn hasher(mut self, hasher: impl KeyHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }
}

impl<V: Cacheable> CacheBuilder<V> {
    /// Builds the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativePartitionCount`] if the partition count is below zero.
    pub fn build(self) -> Result<Cache<V>> {
        if self.partitions < 0 {
            event!(Level::ERROR, partitions = self.partitions, "rejected negative partition count");
            return Err(Error::NegativePartitionCount(self.partitions));
        }

        Ok(Cache::from_parts(self.partitions.unsigned_abs(), self.config, self.hasher))
    }
}

impl<V> fmt::Debug for CacheBuilder<V> {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("partitions", &self.partitions)
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish()
    }
}
