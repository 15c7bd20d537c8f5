// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hash strategies used to place keys and virtual nodes on the ring.

use md5::{Digest, Md5};
use xxhash_rust::xxh64::xxh64;

/// Maps arbitrary bytes to a position on the 64-bit hash ring.
///
/// Implementations must be deterministic: the same bytes must produce the same position in every
/// process, on every platform, for the whole lifetime of the data routed with them. Routing is a
/// pure function of the key, the partition set and this hash.
///
/// # Examples
///
/// ```
/// use ringshard::{KeyHasher, Md5Hasher};
///
/// let hasher = Md5Hasher;
/// assert_eq!(hasher.hash(b"Key1"), hasher.hash(b"Key1"));
/// ```
pub trait KeyHasher: Send + Sync + std::fmt::Debug {
    /// Returns the ring position of `bytes`.
    fn hash(&self, bytes: &[u8]) -> u64;
}

/// Folds an MD5 digest into a ring position.
///
/// The low-order eight bytes of the big-endian 128-bit digest are read as a signed 64-bit
/// integer and its magnitude is used as the position, so positions never exceed `2^63`.
///
/// This is the default hasher of [`Cache`][crate::Cache].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Md5Hasher;

impl KeyHasher for Md5Hasher {
    fn hash(&self, bytes: &[u8]) -> u64 {
        let digest = Md5::digest(bytes);
        let mut low = [0_u8; 8];
        low.copy_from_slice(&digest[8..]);
        i64::from_be_bytes(low).unsigned_abs()
    }
}

/// Seed used by [`XxHasher::default`].
pub const DEFAULT_XXHASH_SEED: u64 = 0;

/// A non-cryptographic hasher based on xxHash64.
///
/// Considerably cheaper than [`Md5Hasher`] and just as stable, at the cost of producing a
/// different key placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Creates a hasher with the given seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for XxHasher {
    fn default() -> Self {
        Self::with_seed(DEFAULT_XXHASH_SEED)
    }
}

impl KeyHasher for XxHasher {
    fn hash(&self, bytes: &[u8]) -> u64 {
        xxh64(bytes, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // Reference values computed from the MD5 digests of the inputs.
    #[rstest]
    #[case::empty(b"", 1_621_285_313_438_006_658)]
    #[case::plain_key(b"Key1", 2_423_025_427_252_354_068)]
    #[case::login(b"thienohs", 5_142_291_747_208_237_672)]
    #[case::virtual_node(b"0:0", 5_062_868_542_381_058_214)]
    fn md5_positions_are_stable(#[case] input: &[u8], #[case] expected: u64) {
        assert_eq!(Md5Hasher.hash(input), expected);
    }

    #[test]
    fn md5_never_sets_more_than_the_top_bit() {
        for i in 0..1_000 {
            let position = Md5Hasher.hash(format!("key-{i}").as_bytes());
            assert!(position <= 1 << 63, "position {position} out of range");
        }
    }

    #[test]
    fn xxhash_depends_on_seed() {
        let a = XxHasher::with_seed(1);
        let b = XxHasher::with_seed(2);

        assert_eq!(a.hash(b"key"), a.hash(b"key"));
        assert_ne!(a.hash(b"key"), b.hash(b"key"));
        assert_eq!(XxHasher::default(), XxHasher::with_seed(DEFAULT_XXHASH_SEED));
    }

    #[test]
    fn hashers_are_object_safe() {
        let hashers: [&dyn KeyHasher; 2] = [&Md5Hasher, &XxHasher::default()];
        for hasher in hashers {
            assert_eq!(hasher.hash(b"abc"), hasher.hash(b"abc"));
        }
    }
}
