//! In-memory transaction pool.

use crate::desc::{TxDesc, TxSource};
use crate::error::{MempoolError, MempoolResult};
use dashmap::DashMap;
use nox_types::{Hash, OutPoint, Transaction};
use std::sync::Arc;
use tracing::debug;

/// In-memory pool of candidate transactions.
///
/// The pool tracks which outpoint each pooled transaction spends so double
/// spends are rejected at admission. Self-referential spends are rejected
/// outright, which keeps the dependency graph the assembler builds over the
/// pool acyclic.
#[derive(Default)]
pub struct Mempool {
    transactions: DashMap<Hash, TxDesc>,
    outpoint_index: DashMap<OutPoint, Hash>,
}

impl Mempool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a transaction with its fee.
    pub fn add(
        &self,
        tx: Arc<Transaction>,
        fee: i64,
        added_height: u64,
        added_time: u64,
    ) -> MempoolResult<Hash> {
        let desc = TxDesc::new(tx, fee, added_height, added_time);
        let txid = desc.txid;

        if self.transactions.contains_key(&txid) {
            return Err(MempoolError::AlreadyExists(txid.to_string()));
        }
        for input in &desc.tx.inputs {
            if input.previous_out.txid == txid {
                return Err(MempoolError::DependencyCycle(txid.to_string()));
            }
            if self.outpoint_index.contains_key(&input.previous_out) {
                return Err(MempoolError::DoubleSpend(input.previous_out.to_string()));
            }
        }

        for input in &desc.tx.inputs {
            self.outpoint_index.insert(input.previous_out, txid);
        }
        self.transactions.insert(txid, desc);

        debug!(tx = %txid, count = self.transactions.len(), "transaction added to pool");
        Ok(txid)
    }

    /// Remove a transaction.
    pub fn remove(&self, txid: &Hash) -> MempoolResult<TxDesc> {
        let (_, desc) = self
            .transactions
            .remove(txid)
            .ok_or_else(|| MempoolError::NotFound(txid.to_string()))?;
        for input in &desc.tx.inputs {
            self.outpoint_index.remove(&input.previous_out);
        }
        debug!(tx = %txid, count = self.transactions.len(), "transaction removed from pool");
        Ok(desc)
    }

    /// Whether the pool holds a transaction.
    pub fn contains(&self, txid: &Hash) -> bool {
        self.transactions.contains_key(txid)
    }

    /// The transaction spending an outpoint, if pooled.
    pub fn spending_tx(&self, outpoint: &OutPoint) -> Option<Hash> {
        self.outpoint_index.get(outpoint).map(|r| *r)
    }

    /// Number of pooled transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TxSource for Mempool {
    fn mining_descs(&self) -> Vec<TxDesc> {
        self.transactions.iter().map(|r| r.value().clone()).collect()
    }

    fn have_transaction(&self, txid: &Hash) -> bool {
        self.contains(txid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_types::{hash_data, TxInput, TxOutput};

    fn tx_spending(prev: OutPoint, amount: u64) -> Arc<Transaction> {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(prev, vec![]));
        tx.outputs.push(TxOutput::new(amount, vec![0x51]));
        Arc::new(tx)
    }

    #[test]
    fn test_add_and_contains() {
        let pool = Mempool::new();
        let tx = tx_spending(OutPoint::new(hash_data(b"a"), 0), 1_000);
        let txid = pool.add(tx, 100, 5, 1_700_000_000).unwrap();
        assert!(pool.contains(&txid));
        assert!(pool.have_transaction(&txid));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let pool = Mempool::new();
        let tx = tx_spending(OutPoint::new(hash_data(b"a"), 0), 1_000);
        pool.add(tx.clone(), 100, 5, 0).unwrap();
        assert!(matches!(
            pool.add(tx, 100, 5, 0),
            Err(MempoolError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_double_spend_rejected() {
        let pool = Mempool::new();
        let prev = OutPoint::new(hash_data(b"a"), 0);
        pool.add(tx_spending(prev, 1_000), 100, 5, 0).unwrap();
        assert!(matches!(
            pool.add(tx_spending(prev, 2_000), 200, 5, 0),
            Err(MempoolError::DoubleSpend(_))
        ));
    }

    #[test]
    fn test_remove_frees_outpoints() {
        let pool = Mempool::new();
        let prev = OutPoint::new(hash_data(b"a"), 0);
        let txid = pool.add(tx_spending(prev, 1_000), 100, 5, 0).unwrap();
        assert!(pool.spending_tx(&prev).is_some());

        pool.remove(&txid).unwrap();
        assert!(pool.spending_tx(&prev).is_none());
        assert!(pool.add(tx_spending(prev, 2_000), 200, 5, 0).is_ok());
    }

    #[test]
    fn test_remove_missing() {
        let pool = Mempool::new();
        assert!(matches!(
            pool.remove(&hash_data(b"missing")),
            Err(MempoolError::NotFound(_))
        ));
    }

    #[test]
    fn test_mining_descs_snapshot() {
        let pool = Mempool::new();
        pool.add(tx_spending(OutPoint::new(hash_data(b"a"), 0), 1_000), 100, 5, 0)
            .unwrap();
        pool.add(tx_spending(OutPoint::new(hash_data(b"b"), 0), 2_000), 200, 5, 0)
            .unwrap();

        let descs = pool.mining_descs();
        assert_eq!(descs.len(), 2);
        // Snapshot is detached from later pool changes.
        pool.add(tx_spending(OutPoint::new(hash_data(b"c"), 0), 3_000), 300, 5, 0)
            .unwrap();
        assert_eq!(descs.len(), 2);
    }
}
