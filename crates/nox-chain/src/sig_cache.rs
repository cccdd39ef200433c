//! Shared signature-verification cache handle.
//!
//! Script execution lives on the consensus side of the seam; assembly only
//! threads this handle through so repeated validations of the same
//! signature are cheap across template rebuilds.

use nox_types::Hash;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Default number of cached validation results.
const DEFAULT_SIG_CACHE_SIZE: usize = 100_000;

/// Capacity-bounded store of signature hashes known to be valid.
pub struct SigCache {
    capacity: usize,
    valid: RwLock<HashSet<Hash>>,
}

impl SigCache {
    /// Create a cache holding up to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            valid: RwLock::new(HashSet::new()),
        }
    }

    /// Whether a signature hash is cached as valid.
    pub fn exists(&self, sig_hash: &Hash) -> bool {
        self.valid.read().contains(sig_hash)
    }

    /// Record a signature hash as valid, evicting an arbitrary entry when
    /// at capacity.
    pub fn add(&self, sig_hash: Hash) {
        if self.capacity == 0 {
            return;
        }
        let mut valid = self.valid.write();
        if valid.len() >= self.capacity && !valid.contains(&sig_hash) {
            if let Some(evict) = valid.iter().next().copied() {
                valid.remove(&evict);
            }
        }
        valid.insert(sig_hash);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.valid.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.valid.read().is_empty()
    }
}

impl Default for SigCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIG_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_types::hash_data;

    #[test]
    fn test_add_and_exists() {
        let cache = SigCache::new(10);
        let h = hash_data(b"sig");
        assert!(!cache.exists(&h));
        cache.add(h);
        assert!(cache.exists(&h));
    }

    #[test]
    fn test_capacity_bound() {
        let cache = SigCache::new(2);
        cache.add(hash_data(b"a"));
        cache.add(hash_data(b"b"));
        cache.add(hash_data(b"c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = SigCache::new(0);
        cache.add(hash_data(b"a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_readd_existing_at_capacity() {
        let cache = SigCache::new(1);
        let h = hash_data(b"a");
        cache.add(h);
        cache.add(h);
        assert!(cache.exists(&h));
        assert_eq!(cache.len(), 1);
    }
}
