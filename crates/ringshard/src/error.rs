// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// The result for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while configuring or constructing a [`Cache`][crate::Cache].
///
/// Only construction can fail. Once a cache exists, [`get`][crate::Cache::get] and
/// [`set`][crate::Cache::set] are infallible: a key that cannot be routed behaves exactly
/// like a miss.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of partitions was below zero.
    #[error("partition count must not be negative, got {0}")]
    NegativePartitionCount(isize),

    /// A ring was configured with no virtual nodes per partition.
    #[error("replication factor must be at least 1, got {0}")]
    InvalidReplicationFactor(usize),

    /// A ring was configured with a load factor below 1.0 or one that is not finite.
    #[error("load factor must be a finite value of at least 1.0, got {0}")]
    InvalidLoad(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            Error::NegativePartitionCount(-3).to_string(),
            "partition count must not be negative, got -3"
        );
        assert_eq!(
            Error::InvalidReplicationFactor(0).to_string(),
            "replication factor must be at least 1, got 0"
        );
        assert_eq!(
            Error::InvalidLoad(0.5).to_string(),
            "load factor must be a finite value of at least 1.0, got 0.5"
        );
    }
}
