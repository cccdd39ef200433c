//! Hash type and hashing helpers.

use blake2::{digest::Digest, Blake2b};
use std::fmt;

/// Type alias for Blake2b with 256-bit output, the node-wide digest.
type Blake2b256 = Blake2b<blake2::digest::consts::U32>;

/// Hash length in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash identifying transactions, blocks and Merkle nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash, used as the conventional id of the block under
    /// construction and as the previous-outpoint id of a coinbase input.
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Raw bytes of the hash.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Whether this is the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

/// Hash arbitrary bytes with Blake2b-256.
pub fn hash_data(data: &[u8]) -> Hash {
    let digest = Blake2b256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    Hash(out)
}

/// Hash two child digests into a parent Merkle node.
pub fn hash_nodes(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    Hash(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hash() {
        assert!(Hash::ZERO.is_zero());
        assert!(!hash_data(b"nox").is_zero());
    }

    #[test]
    fn test_hash_data_deterministic() {
        assert_eq!(hash_data(b"abc"), hash_data(b"abc"));
        assert_ne!(hash_data(b"abc"), hash_data(b"abd"));
    }

    #[test]
    fn test_hash_nodes_order_sensitive() {
        let a = hash_data(b"a");
        let b = hash_data(b"b");
        assert_ne!(hash_nodes(&a, &b), hash_nodes(&b, &a));
    }

    #[test]
    fn test_display_is_hex() {
        let h = Hash::ZERO;
        assert_eq!(h.to_string(), "0".repeat(64));
    }
}
