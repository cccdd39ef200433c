//! Merkle roots over transaction and parent sets.

use crate::hash::{hash_nodes, Hash};

/// Compute the Merkle root of an ordered hash list.
///
/// Levels with an odd number of nodes duplicate the last node. An empty
/// list yields the zero hash; a single hash is its own root.
pub fn merkle_root(hashes: &[Hash]) -> Hash {
    if hashes.is_empty() {
        return Hash::ZERO;
    }
    let mut level: Vec<Hash> = hashes.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| hash_nodes(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// Compute the Merkle root of a parent tip set.
///
/// The parent set is unordered on the wire, so the tips are sorted before
/// the tree is built to make the commitment independent of arrival order.
pub fn parents_merkle_root(parents: &[Hash]) -> Hash {
    let mut sorted = parents.to_vec();
    sorted.sort_unstable();
    merkle_root(&sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_data;

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Hash::ZERO);
    }

    #[test]
    fn test_single_hash_is_own_root() {
        let h = hash_data(b"coinbase");
        assert_eq!(merkle_root(&[h]), h);
    }

    #[test]
    fn test_pair_root() {
        let a = hash_data(b"a");
        let b = hash_data(b"b");
        assert_eq!(merkle_root(&[a, b]), hash_nodes(&a, &b));
    }

    #[test]
    fn test_odd_count_duplicates_last() {
        let a = hash_data(b"a");
        let b = hash_data(b"b");
        let c = hash_data(b"c");
        let expected = hash_nodes(&hash_nodes(&a, &b), &hash_nodes(&c, &c));
        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_root_depends_on_order() {
        let a = hash_data(b"a");
        let b = hash_data(b"b");
        assert_ne!(merkle_root(&[a, b]), merkle_root(&[b, a]));
    }

    #[test]
    fn test_parents_root_ignores_order() {
        let a = hash_data(b"tip-a");
        let b = hash_data(b"tip-b");
        let c = hash_data(b"tip-c");
        assert_eq!(
            parents_merkle_root(&[a, b, c]),
            parents_merkle_root(&[c, a, b])
        );
    }
}
