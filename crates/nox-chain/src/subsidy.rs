//! Block subsidy schedule.
//!
//! The emission schedule is indexed by the DAG blue count of the parent
//! set rather than the main-chain height, so blocks that confirm more of
//! the DAG conjure the subsidy the schedule intends. Reductions are
//! geometric per interval and cached once computed.

use nox_types::{Amount, COIN};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Emission schedule parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsidyParams {
    /// Subsidy during the first interval, in base units.
    pub base_subsidy: Amount,
    /// Blue-count interval between reductions.
    pub reduction_interval: u64,
    /// Reduction numerator.
    pub mul_subsidy: u64,
    /// Reduction denominator.
    pub div_subsidy: u64,
}

impl Default for SubsidyParams {
    fn default() -> Self {
        Self {
            base_subsidy: 12 * COIN,
            reduction_interval: 1_577_880,
            mul_subsidy: 100,
            div_subsidy: 101,
        }
    }
}

/// Subsidy calculator with per-interval caching.
pub struct SubsidyCache {
    params: SubsidyParams,
    cache: RwLock<HashMap<u64, Amount>>,
}

impl SubsidyCache {
    /// Create a cache over the given schedule.
    pub fn new(params: SubsidyParams) -> Self {
        Self {
            params,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The schedule parameters.
    pub fn params(&self) -> &SubsidyParams {
        &self.params
    }

    /// Subsidy for a block whose parent set has the given blue count.
    pub fn calc_block_subsidy(&self, blues: u64) -> Amount {
        let iteration = blues / self.params.reduction_interval;
        if iteration == 0 {
            return self.params.base_subsidy;
        }

        let mut cache = self.cache.write();
        if let Some(subsidy) = cache.get(&iteration) {
            return *subsidy;
        }

        // Walk up from the nearest cached iteration.
        let mut at = cache
            .keys()
            .filter(|k| **k < iteration)
            .max()
            .copied()
            .unwrap_or(0);
        let mut subsidy = if at == 0 {
            self.params.base_subsidy
        } else {
            cache[&at]
        };
        while at < iteration {
            subsidy = subsidy * self.params.mul_subsidy / self.params.div_subsidy;
            at += 1;
        }
        cache.insert(iteration, subsidy);
        subsidy
    }
}

impl Default for SubsidyCache {
    fn default() -> Self {
        Self::new(SubsidyParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schedule() -> SubsidyCache {
        SubsidyCache::new(SubsidyParams {
            base_subsidy: 1_000,
            reduction_interval: 100,
            mul_subsidy: 1,
            div_subsidy: 2,
        })
    }

    #[test]
    fn test_first_interval_full_subsidy() {
        let cache = small_schedule();
        assert_eq!(cache.calc_block_subsidy(0), 1_000);
        assert_eq!(cache.calc_block_subsidy(99), 1_000);
    }

    #[test]
    fn test_reduction_per_interval() {
        let cache = small_schedule();
        assert_eq!(cache.calc_block_subsidy(100), 500);
        assert_eq!(cache.calc_block_subsidy(200), 250);
        assert_eq!(cache.calc_block_subsidy(300), 125);
    }

    #[test]
    fn test_cache_is_consistent_out_of_order() {
        let cache = small_schedule();
        // Compute a late iteration first, then an earlier one.
        assert_eq!(cache.calc_block_subsidy(300), 125);
        assert_eq!(cache.calc_block_subsidy(100), 500);
        assert_eq!(cache.calc_block_subsidy(300), 125);
    }

    #[test]
    fn test_subsidy_eventually_zero() {
        let cache = small_schedule();
        assert_eq!(cache.calc_block_subsidy(100 * 20), 0);
    }

    #[test]
    fn test_default_schedule_geometric() {
        let cache = SubsidyCache::default();
        let first = cache.calc_block_subsidy(0);
        let second = cache.calc_block_subsidy(cache.params().reduction_interval);
        assert!(second < first);
        assert_eq!(second, first * 100 / 101);
    }
}
