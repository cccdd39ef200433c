//! Mining descriptors and the transaction source seam.

use crate::priority::calc_fee_per_kb;
use nox_types::{Hash, Transaction};
use std::sync::Arc;

/// A pooled transaction with the cached metadata block assembly needs.
#[derive(Clone)]
pub struct TxDesc {
    /// The transaction.
    pub tx: Arc<Transaction>,
    /// Cached transaction id.
    pub txid: Hash,
    /// Fee paid, in base units.
    pub fee: i64,
    /// Fee density in base units per kilobyte of serialized size.
    pub fee_per_kb: i64,
    /// Height of the chain when the transaction was accepted.
    pub added_height: u64,
    /// Unix time the transaction was accepted.
    pub added_time: u64,
}

impl TxDesc {
    /// Create a descriptor, caching the id and fee density.
    pub fn new(tx: Arc<Transaction>, fee: i64, added_height: u64, added_time: u64) -> Self {
        let txid = tx.txid();
        let fee_per_kb = calc_fee_per_kb(fee, tx.serialized_size());
        Self {
            tx,
            txid,
            fee,
            fee_per_kb,
            added_height,
            added_time,
        }
    }
}

/// Source of candidate transactions for block assembly.
pub trait TxSource: Send + Sync {
    /// Snapshot of the current candidates.
    fn mining_descs(&self) -> Vec<TxDesc>;

    /// Whether the source currently holds a transaction. Used to classify
    /// unresolvable inputs as in-pool dependencies rather than orphans.
    fn have_transaction(&self, txid: &Hash) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_types::{hash_data, OutPoint, TxInput, TxOutput};

    #[test]
    fn test_desc_caches_id_and_density() {
        let mut tx = Transaction::new();
        tx.inputs
            .push(TxInput::new(OutPoint::new(hash_data(b"p"), 0), vec![]));
        tx.outputs.push(TxOutput::new(1_000, vec![0x51]));
        let tx = Arc::new(tx);

        let desc = TxDesc::new(tx.clone(), 500, 10, 1_700_000_000);
        assert_eq!(desc.txid, tx.txid());
        assert_eq!(
            desc.fee_per_kb,
            calc_fee_per_kb(500, tx.serialized_size())
        );
    }
}
