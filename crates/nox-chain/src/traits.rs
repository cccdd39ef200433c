//! Interfaces block assembly consumes from the consensus engine.

use crate::error::ChainResult;
use crate::sig_cache::SigCache;
use crate::subsidy::SubsidyCache;
use crate::utxo_view::UtxoView;
use nox_types::{Block, Hash, PowType, Transaction};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use std::sync::Arc;

/// Condensed DAG snapshot identifier.
#[derive(Debug, Clone)]
pub struct GraphState {
    /// Total number of blocks in the DAG. The next block's order.
    pub total: u64,
    /// Current tip ids.
    pub tips: Vec<Hash>,
}

/// Best-tip metadata at a point in time.
#[derive(Debug, Clone)]
pub struct BestSnapshot {
    /// Id of the main-chain tip.
    pub hash: Hash,
    /// Height of the main-chain tip.
    pub height: u64,
    /// Graph state at the snapshot.
    pub graph_state: GraphState,
}

/// The DAG parent designated to extend the main chain.
#[derive(Debug, Clone, Copy)]
pub struct MainParent {
    /// Parent block id.
    pub hash: Hash,
    /// Parent height; the next block sits at `height + 1`.
    pub height: u64,
}

/// Script verification flag set passed through to the script validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerifyFlags(u32);

impl VerifyFlags {
    /// No flags.
    pub const NONE: VerifyFlags = VerifyFlags(0);
    /// Require canonical DER signatures.
    pub const DER_SIGNATURES: VerifyFlags = VerifyFlags(1 << 0);
    /// Require low-S signature values.
    pub const LOW_S: VerifyFlags = VerifyFlags(1 << 1);
    /// Require strict signature and pubkey encoding.
    pub const STRICT_ENCODING: VerifyFlags = VerifyFlags(1 << 2);
    /// Require minimal data pushes.
    pub const MINIMAL_DATA: VerifyFlags = VerifyFlags(1 << 3);
    /// Reject upgradable no-ops.
    pub const DISCOURAGE_UPGRADABLE_NOPS: VerifyFlags = VerifyFlags(1 << 4);
    /// Enforce lock-time checks in scripts.
    pub const CHECK_LOCK_TIME_VERIFY: VerifyFlags = VerifyFlags(1 << 5);
    /// Enforce sequence checks in scripts.
    pub const CHECK_SEQUENCE_VERIFY: VerifyFlags = VerifyFlags(1 << 6);
    /// Require a clean stack after execution.
    pub const CLEAN_STACK: VerifyFlags = VerifyFlags(1 << 7);

    /// The strict standard flag set applied to template candidates.
    pub fn standard() -> VerifyFlags {
        Self::DER_SIGNATURES
            | Self::LOW_S
            | Self::STRICT_ENCODING
            | Self::MINIMAL_DATA
            | Self::DISCOURAGE_UPGRADABLE_NOPS
            | Self::CHECK_LOCK_TIME_VERIFY
            | Self::CHECK_SEQUENCE_VERIFY
            | Self::CLEAN_STACK
    }

    /// Whether every flag in `other` is set.
    pub fn contains(&self, other: VerifyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit representation.
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for VerifyFlags {
    type Output = VerifyFlags;

    fn bitor(self, rhs: VerifyFlags) -> VerifyFlags {
        VerifyFlags(self.0 | rhs.0)
    }
}

/// Source of network-adjusted time.
pub trait MedianTimeSource: Send + Sync {
    /// Current time adjusted by the median peer offset, in seconds.
    fn adjusted_time(&self) -> u64;
}

/// The consensus engine as seen by block assembly.
///
/// All reads are point-in-time consistent for the duration of one assembly
/// invocation; the implementation is expected to answer from a snapshot.
pub trait ChainEngine: Send + Sync {
    /// Current best tip metadata including graph state.
    fn best_snapshot(&self) -> BestSnapshot;

    /// Default parent tip set when the caller supplies none.
    fn get_mining_tips(&self) -> Vec<Hash>;

    /// The DAG main parent of a parent set, if the set is viable.
    fn main_parent(&self, parents: &[Hash]) -> Option<MainParent>;

    /// Blue-ancestor count of a parent set; feeds the subsidy.
    fn get_blues(&self, parents: &[Hash]) -> u64;

    /// Shared subsidy schedule cache.
    fn subsidy_cache(&self) -> Arc<SubsidyCache>;

    /// Fetch the committed entries referenced by `tx` into a fresh view.
    /// Outpoints with no committed entry are simply absent from the result.
    fn fetch_utxo_view(&self, tx: &Transaction) -> ChainResult<UtxoView>;

    /// Compact difficulty target required at `timestamp` for an algorithm.
    fn calc_next_required_difficulty(&self, timestamp: u64, pow_type: PowType)
        -> ChainResult<u32>;

    /// Validate the inputs of `tx` against `view` and return its fee.
    fn check_transaction_inputs(&self, tx: &Transaction, view: &UtxoView) -> ChainResult<i64>;

    /// Execute the scripts of `tx` against `view`.
    fn validate_transaction_scripts(
        &self,
        tx: &Transaction,
        view: &UtxoView,
        flags: VerifyFlags,
        sig_cache: &SigCache,
    ) -> ChainResult<()>;

    /// Full connect-check of an assembled template block at the given
    /// height and DAG order.
    fn check_connect_block_template(
        &self,
        block: &Block,
        height: u64,
        order: u64,
    ) -> ChainResult<()>;

    /// Median timestamp of the recent ancestor window.
    fn median_time_past(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_flags_contain_der() {
        assert!(VerifyFlags::standard().contains(VerifyFlags::DER_SIGNATURES));
        assert!(VerifyFlags::standard().contains(VerifyFlags::CLEAN_STACK));
    }

    #[test]
    fn test_none_contains_nothing() {
        assert!(!VerifyFlags::NONE.contains(VerifyFlags::LOW_S));
        assert!(VerifyFlags::NONE.contains(VerifyFlags::NONE));
    }

    #[test]
    fn test_bitor_accumulates() {
        let flags = VerifyFlags::DER_SIGNATURES | VerifyFlags::LOW_S;
        assert!(flags.contains(VerifyFlags::DER_SIGNATURES));
        assert!(flags.contains(VerifyFlags::LOW_S));
        assert!(!flags.contains(VerifyFlags::CLEAN_STACK));
    }
}
