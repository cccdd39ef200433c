//! Block generation policy.

use nox_chain::VerifyFlags;
use nox_types::COIN;
use serde::{Deserialize, Serialize};

/// Default hard cap on serialized block size.
const DEFAULT_BLOCK_MAX_SIZE: u32 = 750_000;

/// Default minimum block size; zero disables free-transaction padding.
const DEFAULT_BLOCK_MIN_SIZE: u32 = 0;

/// Default prefix of the block reserved for priority-ordered selection.
const DEFAULT_BLOCK_PRIORITY_SIZE: u32 = 50_000;

/// Default fee density below which a transaction counts as free,
/// in base units per kilobyte.
const DEFAULT_TX_MIN_FREE_FEE: i64 = 10_000;

/// Default priority boundary of the high-priority area: one coin of value
/// aged a day of blocks over a small transaction.
const DEFAULT_HIGH_PRIORITY_THRESHOLD: f64 = COIN as f64 * 144.0 / 250.0;

/// Tunables governing template assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Hard upper bound on serialized block size in bytes.
    pub block_max_size: u32,
    /// The block is padded with free transactions until it reaches this
    /// size. Zero disables padding.
    pub block_min_size: u32,
    /// Prefix of the block reserved for priority-ordered selection.
    /// Zero selects fee-first ordering from the start.
    pub block_priority_size: u32,
    /// Fee density below which a transaction is only admitted while the
    /// block is under `block_min_size`, in base units per kilobyte.
    pub tx_min_free_fee: i64,
    /// Priority below which selection switches from priority ordering to
    /// fee ordering.
    pub high_priority_threshold: f64,
    /// Script-validation flags applied to every candidate.
    pub standard_verify_flags: VerifyFlags,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            block_max_size: DEFAULT_BLOCK_MAX_SIZE,
            block_min_size: DEFAULT_BLOCK_MIN_SIZE,
            block_priority_size: DEFAULT_BLOCK_PRIORITY_SIZE,
            tx_min_free_fee: DEFAULT_TX_MIN_FREE_FEE,
            high_priority_threshold: DEFAULT_HIGH_PRIORITY_THRESHOLD,
            standard_verify_flags: VerifyFlags::standard(),
        }
    }
}

impl Policy {
    /// The priority area, clamped so it never exceeds the block itself.
    pub fn effective_priority_size(&self) -> u32 {
        self.block_priority_size.min(self.block_max_size)
    }
}
