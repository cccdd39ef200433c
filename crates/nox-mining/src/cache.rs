//! Node-wide template cache.

use crate::template::BlockTemplate;
use parking_lot::RwLock;

/// One-slot store of the most recently assembled template.
///
/// Readers copy the template by value so miners never observe a slot being
/// replaced. Assembly only overwrites a populated slot when the heights
/// match, which keeps a fresher template from a later height from being
/// clobbered by a slower parallel build.
#[derive(Default)]
pub struct TemplateCache {
    slot: RwLock<Option<BlockTemplate>>,
}

impl TemplateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the cached template, if any.
    pub fn get(&self) -> Option<BlockTemplate> {
        self.slot.read().clone()
    }

    /// Unconditionally place a template in the slot.
    pub fn set(&self, template: &BlockTemplate) {
        *self.slot.write() = Some(template.clone());
    }

    /// Overwrite the slot only when it already holds a template at the
    /// same height. Returns whether the slot was written.
    pub fn store_if_current(&self, template: &BlockTemplate) -> bool {
        let mut slot = self.slot.write();
        match slot.as_ref() {
            Some(current) if current.height == template.height => {
                *slot = Some(template.clone());
                true
            }
            _ => false,
        }
    }

    /// Drop the cached template.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PowDiffStandard;
    use nox_types::{Block, BlockHeader, Hash, PowType};

    fn template_at(height: u64, nonce: u64) -> BlockTemplate {
        let header = BlockHeader {
            version: 1,
            parent_root: Hash::ZERO,
            tx_root: Hash::ZERO,
            state_root: Hash::ZERO,
            timestamp: 0,
            difficulty: 0x2007_ffff,
            pow_type: PowType::Cuckaroom,
            nonce,
        };
        BlockTemplate {
            block: Block::new(header),
            fees: vec![0],
            sig_op_counts: vec![0],
            height,
            blues: 0,
            valid_pay_address: false,
            pow_diff: PowDiffStandard {
                blake2bd_target: 0,
                x16rv3_target: 0,
                x8r16_target: 0,
                keccak256_target: 0,
                cuckaroo_base_diff: 0,
                cuckaroom_base_diff: 0,
                cuckatoo_base_diff: 0,
            },
        }
    }

    #[test]
    fn test_empty_cache_not_overwritten() {
        let cache = TemplateCache::new();
        assert!(!cache.store_if_current(&template_at(5, 0)));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_same_height_overwrites() {
        let cache = TemplateCache::new();
        cache.set(&template_at(5, 1));
        assert!(cache.store_if_current(&template_at(5, 2)));
        assert_eq!(cache.get().unwrap().block.header.nonce, 2);
    }

    #[test]
    fn test_different_height_preserved() {
        let cache = TemplateCache::new();
        cache.set(&template_at(6, 1));
        assert!(!cache.store_if_current(&template_at(5, 2)));
        assert_eq!(cache.get().unwrap().height, 6);
    }

    #[test]
    fn test_invalidate() {
        let cache = TemplateCache::new();
        cache.set(&template_at(5, 1));
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
