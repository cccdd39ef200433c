//! Block template types.

use nox_types::Block;

/// Per-algorithm difficulty bundle attached to a template.
///
/// The header advertises a single algorithm; miners choosing a different
/// one take their target from this bundle and rewrite the header. Hash
/// algorithms use compact targets, cuckoo-cycle variants use plain u64
/// base difficulties.
#[derive(Debug, Clone)]
pub struct PowDiffStandard {
    /// Compact target for double Blake2b.
    pub blake2bd_target: u32,
    /// Compact target for X16R v3.
    pub x16rv3_target: u32,
    /// Compact target for X8R16.
    pub x8r16_target: u32,
    /// Compact target for Keccak-256.
    pub keccak256_target: u32,
    /// Base difficulty for Cuckaroo.
    pub cuckaroo_base_diff: u64,
    /// Base difficulty for Cuckaroom.
    pub cuckaroom_base_diff: u64,
    /// Base difficulty for Cuckatoo.
    pub cuckatoo_base_diff: u64,
}

/// A fully-assembled candidate block awaiting a proof-of-work nonce.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    /// The assembled block: header, parents and transactions in final
    /// order, coinbase first.
    pub block: Block,
    /// Fee of each transaction by block position. Slot 0 carries the
    /// negated total so the ledger sums to zero.
    pub fees: Vec<i64>,
    /// Signature-operation cost of each transaction by block position.
    pub sig_op_counts: Vec<i64>,
    /// Height of the block being templated.
    pub height: u64,
    /// Blue count of the parent set, as used for the subsidy.
    pub blues: u64,
    /// Whether the coinbase pays to a configured address.
    pub valid_pay_address: bool,
    /// Per-algorithm difficulty bundle.
    pub pow_diff: PowDiffStandard,
}

impl BlockTemplate {
    /// Total fees collected by the block, from the ledger convention.
    pub fn total_fees(&self) -> i64 {
        -self.fees.first().copied().unwrap_or(0)
    }
}
