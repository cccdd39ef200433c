//! Layered UTXO view.
//!
//! A `UtxoView` is a delta over the committed chain state. During block
//! assembly it starts from the entries fetched for each candidate
//! transaction and grows as selected transactions spend inputs and create
//! outputs. Entries are never removed within an assembly, only flipped to
//! spent, so the view is monotonic in spentness.

use nox_types::{is_unspendable, Amount, Hash, OutPoint, Transaction};
use std::collections::HashMap;

/// A single unspent (or tentatively spent) output.
#[derive(Debug, Clone)]
pub struct UtxoEntry {
    amount: Amount,
    pk_script: Vec<u8>,
    block_height: u64,
    block_hash: Hash,
    coinbase: bool,
    spent: bool,
}

impl UtxoEntry {
    /// Create an unspent entry.
    pub fn new(
        amount: Amount,
        pk_script: Vec<u8>,
        block_height: u64,
        block_hash: Hash,
        coinbase: bool,
    ) -> Self {
        Self {
            amount,
            pk_script,
            block_height,
            block_hash,
            coinbase,
            spent: false,
        }
    }

    /// Output value in base units.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Locking script of the output.
    pub fn pk_script(&self) -> &[u8] {
        &self.pk_script
    }

    /// Height of the block containing the output.
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Id of the block containing the output. Zero for outputs of the
    /// block under construction.
    pub fn block_hash(&self) -> &Hash {
        &self.block_hash
    }

    /// Whether the output was created by a coinbase.
    pub fn is_coinbase(&self) -> bool {
        self.coinbase
    }

    /// Whether the output has been (tentatively) spent.
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Mark the output spent.
    pub fn spend(&mut self) {
        self.spent = true;
    }
}

/// Delta map of outpoints to entries, layered over the committed state.
#[derive(Debug, Default)]
pub struct UtxoView {
    entries: HashMap<OutPoint, UtxoEntry>,
}

impl UtxoView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    pub fn lookup_entry(&self, outpoint: &OutPoint) -> Option<&UtxoEntry> {
        self.entries.get(outpoint)
    }

    /// Insert an entry.
    pub fn add_entry(&mut self, outpoint: OutPoint, entry: UtxoEntry) {
        self.entries.insert(outpoint, entry);
    }

    /// Add the spendable outputs of `tx` as fresh entries. Provably
    /// unspendable outputs are skipped. `block_hash` is the id of the
    /// containing block, `Hash::ZERO` for the block under construction.
    pub fn add_tx_outs(&mut self, tx: &Transaction, block_height: u64, block_hash: Hash) {
        let txid = tx.txid();
        let coinbase = tx.is_coinbase();
        for (index, output) in tx.outputs.iter().enumerate() {
            if is_unspendable(&output.pk_script) {
                continue;
            }
            self.entries.insert(
                OutPoint::new(txid, index as u32),
                UtxoEntry::new(
                    output.amount,
                    output.pk_script.clone(),
                    block_height,
                    block_hash,
                    coinbase,
                ),
            );
        }
    }

    /// Mark the inputs of `tx` spent and add its outputs as available
    /// entries of the block under construction, so later selections can
    /// spend them and double spends are visible.
    pub fn spend_transaction(&mut self, tx: &Transaction, block_height: u64) {
        for input in &tx.inputs {
            if let Some(entry) = self.entries.get_mut(&input.previous_out) {
                entry.spend();
            }
        }
        self.add_tx_outs(tx, block_height, Hash::ZERO);
    }

    /// Fold another view into this one. An incoming entry only replaces an
    /// existing one when the existing entry is absent or fully spent, which
    /// preserves the strongest evidence of spentness across incremental
    /// per-transaction fetches.
    pub fn merge(&mut self, other: UtxoView) {
        for (outpoint, entry) in other.entries {
            match self.entries.get(&outpoint) {
                Some(existing) if !existing.is_spent() => {}
                _ => {
                    self.entries.insert(outpoint, entry);
                }
            }
        }
    }

    /// Number of entries in the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
