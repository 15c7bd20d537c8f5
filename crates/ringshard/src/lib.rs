// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A concurrent in-memory cache partitioned by a consistent hash ring.
//!
//! This crate provides [`Cache`], a key-value store whose key space is split across a fixed
//! number of partitions:
//!
//! 1. **Consistent-Hash Routing:** A [`HashRing`] places every partition on a 64-bit ring
//!    several times (virtual nodes) and assigns each key to the first virtual node at or after
//!    the key's hash.
//! 2. **Per-Partition Locking:** Every [`CachePartition`] guards its own map with its own
//!    reader/writer lock. Traffic on keys owned by different partitions never contends.
//! 3. **Injectable Hashing:** The [`KeyHasher`] used for routing is a constructor parameter.
//!    [`Md5Hasher`] is the default; [`XxHasher`] is a cheaper alternative.
//! 4. **Immutable Entries:** Values are stored behind [`Arc`](std::sync::Arc). Readers share
//!    the stored value but cannot modify it.
//!
//! # Example
//!
//! ```
//! use ringshard::Cache;
//!
//! let cache = Cache::<String>::new(7);
//!
//! cache.set("Key1", "Data1".to_string());
//! assert_eq!(cache.get("Key1").as_deref().map(String::as_str), Some("Data1"));
//!
//! // Overwrites are last-writer-wins.
//! cache.set("Key1", "Data2".to_string());
//! assert_eq!(cache.get("Key1").as_deref().map(String::as_str), Some("Data2"));
//! ```
//!
//! # Misses and inert caches
//!
//! [`Cache::get`] returns `None` for a key that was never stored and also for every key of a
//! cache built with zero partitions, where [`Cache::set`] silently drops its input. Callers treat
//! both the same way: recompute the value from its source. The only construction-time failure
//! is a negative partition count passed to [`CacheBuilder::partitions`].
//!
//! # Performance Characteristics
//!
//! | Metric | Complexity | Notes |
//! | :--- | :--- | :--- |
//! | **Routing** | $O(\log(P \cdot R))$ | `P` partitions, `R` virtual nodes each. |
//! | **Lookup** | $O(1)$ after routing | Shared lock on one partition. |
//! | **Insertion** | Amortized $O(1)$ after routing | Exclusive lock on one partition. |
//! | **Concurrency** | Per-partition `RwLock` | Partitions are cache-line aligned. |
//!
//! There is no eviction, expiry or persistence: entries live as long as the cache.

mod cache;
mod cacheable;
mod error;
mod hasher;
mod partition;
mod ring;

pub use cache::{Cache, CacheBuilder, DEFAULT_PARTITION_COUNT};
pub use cacheable::Cacheable;
pub use error::{Error, Result};
pub use hasher::{DEFAULT_XXHASH_SEED, KeyHasher, Md5Hasher, XxHasher};
pub use partition::{CachePartition, PartitionId};
pub use ring::{DEFAULT_LOAD, DEFAULT_REPLICATION_FACTOR, HashRing, RingConfig};
