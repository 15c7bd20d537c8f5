// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Consistent hash ring with virtual nodes.
//!
//! Every partition is placed on the ring several times (its virtual nodes). A key is owned by
//! the partition of the first virtual node at or after the key's own position, wrapping around
//! past the highest position. Adding or removing a partition therefore only moves the keys in
//! the arcs next to that partition's virtual nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{Level, event};

use crate::error::{Error, Result};
use crate::hasher::KeyHasher;
use crate::partition::PartitionId;

/// Number of virtual nodes placed on the ring for every partition.
pub const DEFAULT_REPLICATION_FACTOR: usize = 20;

/// Default bound on the expected imbalance between partitions.
pub const DEFAULT_LOAD: f64 = 1.25;

/// Validated ring parameters.
///
/// The replication factor decides how many virtual nodes each member places on the ring. The
/// load factor is diagnostic only: it never limits which member a key is routed to and is read
/// solely by [`HashRing::average_load`] to report the per-member capacity a balanced ring should
/// stay within.
///
/// # Examples
///
/// ```
/// use ringshard::RingConfig;
///
/// let config = RingConfig::new(40, 1.5)?;
/// assert_eq!(config.replication_factor(), 40);
///
/// assert!(RingConfig::new(0, 1.5).is_err());
/// # Ok::<(), ringshard::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingConfig {
    replication_factor: usize,
    load: f64,
}

impl RingConfig {
    /// Creates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReplicationFactor`] if `replication_factor` is zero and
    /// [`Error::InvalidLoad`] if `load` is below 1.0 or not finite.
    pub fn new(replication_factor: usize, load: f64) -> Result<Self> {
        if replication_factor == 0 {
            return Err(Error::InvalidReplicationFactor(replication_factor));
        }
        if !load.is_finite() || load < 1.0 {
            return Err(Error::InvalidLoad(load));
        }
        Ok(Self { replication_factor, load })
    }

    /// Returns the number of virtual nodes per partition.
    #[must_use]
    pub const fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Returns the load factor used by [`HashRing::average_load`].
    #[must_use]
    pub const fn load(&self) -> f64 {
        self.load
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            load: DEFAULT_LOAD,
        }
    }
}

/// A consistent hash ring over a fixed set of partitions.
///
/// The ring is built once and never mutated afterwards, so lookups need no synchronization.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ringshard::{HashRing, Md5Hasher, PartitionId, RingConfig};
///
/// let members = (0..3).map(PartitionId::from_index).collect();
/// let ring = HashRing::new(members, RingConfig::default(), Arc::new(Md5Hasher));
///
/// let owner = ring.locate_key(b"some key").expect("ring is not empty");
/// assert_eq!(ring.locate_key(b"some key"), Some(owner));
/// ```
pub struct HashRing {
    /// Ring position of every virtual node mapped to the index of its owning member.
    markers: BTreeMap<u64, usize>,
    members: Vec<PartitionId>,
    config: RingConfig,
    hasher: Arc<dyn KeyHasher>,
}

impl HashRing {
    /// Builds a ring placing `config.replication_factor()` virtual nodes for each member.
    ///
    /// Virtual node `i` of member `m` sits at `hasher.hash("m:i")`. If two virtual nodes land on
    /// the same position, the member listed first keeps it.
    ///
    /// An empty member list is valid and yields a ring that routes nothing.
    #[must_use]
    pub fn new(members: Vec<PartitionId>, config: RingConfig, hasher: Arc<dyn KeyHasher>) -> Self {
        let mut markers = BTreeMap::new();
        for (index, member) in members.iter().enumerate() {
            for replica in 0..config.replication_factor {
                let position = hasher.hash(format!("{member}:{replica}").as_bytes());
                markers.entry(position).or_insert(index);
            }
        }

        event!(
            Level::DEBUG,
            members = members.len(),
            virtual_nodes = markers.len(),
            replication_factor = config.replication_factor,
            "hash ring built"
        );

        Self {
            markers,
            members,
            config,
            hasher,
        }
    }

    /// Returns the partition that owns `key`, or `None` if the ring is empty.
    #[must_use]
    pub fn locate_key(&self, key: &[u8]) -> Option<&PartitionId> {
        self.locate_index(key).and_then(|index| self.members.get(index))
    }

    /// Returns the position in [`members`](Self::members) of the partition that owns `key`.
    #[must_use]
    pub fn locate_index(&self, key: &[u8]) -> Option<usize> {
        if self.markers.is_empty() {
            return None;
        }

        let position = self.hasher.hash(key);
        self.markers
            .range(position..)
            .next()
            .or_else(|| self.markers.first_key_value())
            .map(|(_, &index)| index)
    }

    /// Returns the members of the ring in construction order.
    #[must_use]
    pub fn members(&self) -> &[PartitionId] {
        &self.members
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the ring has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the number of distinct virtual node positions on the ring.
    #[must_use]
    pub fn virtual_node_count(&self) -> usize {
        self.markers.len()
    }

    /// Returns the configuration the ring was built with.
    #[must_use]
    pub const fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Returns the highest number of keys any member is expected to hold out of `total_keys`
    /// when the ring is balanced within its load factor.
    ///
    /// Returns zero for an empty ring.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "key counts are far below the range where f64 loses integer precision"
    )]
    pub fn average_load(&self, total_keys: usize) -> usize {
        if self.members.is_empty() {
            return 0;
        }
        let per_member = total_keys as f64 / self.members.len() as f64;
        (per_member * self.config.load).ceil() as usize
    }

    /// Counts how many of `keys` each member owns, indexed like [`members`](Self::members).
    #[must_use]
    pub fn distribution<I>(&self, keys: I) -> Vec<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut counts = vec![0; self.members.len()];
        for key in keys {
            if let Some(count) = self.locate_index(key.as_ref()).and_then(|index| counts.get_mut(index)) {
                *count += 1;
            }
        }
        counts
    }
}

impl fmt::Debug for HashRing {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("members", &self.members)
            .field("virtual_nodes", &self.markers.len())
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
