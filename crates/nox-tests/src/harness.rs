//! Test harness: a scriptable stub consensus engine and a fixed clock.

use nox_chain::{
    BestSnapshot, ChainEngine, ChainError, ChainParams, ChainResult, GraphState, MainParent,
    MedianTimeSource, SigCache, SubsidyCache, SubsidyParams, UtxoEntry, UtxoView, VerifyFlags,
};
use nox_mempool::{TxDesc, TxSource};
use nox_types::{hash_data, Block, Hash, OutPoint, PowType, Transaction, MAX_AMOUNT};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Median time past reported by the stub chain.
pub const TEST_MEDIAN_TIME: u64 = 1_700_000_000;

/// Adjusted time used by the fixed clock, safely past the median.
pub const TEST_ADJUSTED_TIME: u64 = TEST_MEDIAN_TIME + 600;

/// Compact target the stub difficulty oracle answers by default.
pub const TEST_COMPACT_TARGET: u32 = 0x2007_ffff;

/// Clock answering a fixed adjusted time.
pub struct FixedTimeSource(pub u64);

impl MedianTimeSource for FixedTimeSource {
    fn adjusted_time(&self) -> u64 {
        self.0
    }
}

/// In-memory consensus engine stub.
///
/// Holds a committed UTXO map, enforces the input rules assembly relies on
/// (maturity, value bounds, overspend) and lets tests script failures:
/// per-tx UTXO fetch or script rejection, per-algorithm difficulty failure
/// and connect-check rejection.
pub struct StubChain {
    height: u64,
    tips: Vec<Hash>,
    blues: u64,
    coinbase_maturity: u64,
    utxos: RwLock<HashMap<OutPoint, UtxoEntry>>,
    difficulties: RwLock<HashMap<PowType, u32>>,
    utxo_fetch_failures: RwLock<HashSet<Hash>>,
    script_failures: RwLock<HashSet<Hash>>,
    failing_difficulty: RwLock<Option<PowType>>,
    connect_rejection: RwLock<Option<String>>,
    subsidy: Arc<SubsidyCache>,
}

impl StubChain {
    /// Create a stub at the given main-chain height with a single tip.
    pub fn new(height: u64) -> Self {
        Self {
            height,
            tips: vec![hash_data(b"stub-tip-0")],
            blues: height,
            coinbase_maturity: ChainParams::privnet().coinbase_maturity,
            utxos: RwLock::new(HashMap::new()),
            difficulties: RwLock::new(HashMap::new()),
            utxo_fetch_failures: RwLock::new(HashSet::new()),
            script_failures: RwLock::new(HashSet::new()),
            failing_difficulty: RwLock::new(None),
            connect_rejection: RwLock::new(None),
            subsidy: Arc::new(SubsidyCache::new(SubsidyParams::default())),
        }
    }

    /// Replace the tip set.
    pub fn with_tips(mut self, tips: Vec<Hash>) -> Self {
        self.tips = tips;
        self
    }

    /// Set the blue count reported for any parent set.
    pub fn with_blues(mut self, blues: u64) -> Self {
        self.blues = blues;
        self
    }

    /// Register a committed spendable output.
    pub fn add_utxo(&self, outpoint: OutPoint, amount: u64, height: u64) {
        self.utxos.write().insert(
            outpoint,
            UtxoEntry::new(amount, vec![0x51], height, hash_data(b"stub-block"), false),
        );
    }

    /// Register a committed coinbase output, subject to maturity.
    pub fn add_coinbase_utxo(&self, outpoint: OutPoint, amount: u64, height: u64) {
        self.utxos.write().insert(
            outpoint,
            UtxoEntry::new(amount, vec![0x51], height, hash_data(b"stub-block"), true),
        );
    }

    /// Make the UTXO store fail to produce a view for a transaction.
    pub fn fail_utxo_fetch_for(&self, txid: Hash) {
        self.utxo_fetch_failures.write().insert(txid);
    }

    /// Make script validation fail for a transaction.
    pub fn fail_scripts_for(&self, txid: Hash) {
        self.script_failures.write().insert(txid);
    }

    /// Override the target answered for one algorithm.
    pub fn set_difficulty(&self, pow_type: PowType, compact: u32) {
        self.difficulties.write().insert(pow_type, compact);
    }

    /// Make the difficulty oracle fail for one algorithm.
    pub fn fail_difficulty(&self, pow_type: PowType) {
        *self.failing_difficulty.write() = Some(pow_type);
    }

    /// Make the connect check reject any template.
    pub fn reject_connect(&self, reason: &str) {
        *self.connect_rejection.write() = Some(reason.to_string());
    }
}

impl ChainEngine for StubChain {
    fn best_snapshot(&self) -> BestSnapshot {
        BestSnapshot {
            hash: self.tips[0],
            height: self.height,
            graph_state: GraphState {
                total: self.height + 1,
                tips: self.tips.clone(),
            },
        }
    }

    fn get_mining_tips(&self) -> Vec<Hash> {
        self.tips.clone()
    }

    fn main_parent(&self, parents: &[Hash]) -> Option<MainParent> {
        parents.first().map(|hash| MainParent {
            hash: *hash,
            height: self.height,
        })
    }

    fn get_blues(&self, _parents: &[Hash]) -> u64 {
        self.blues
    }

    fn subsidy_cache(&self) -> Arc<SubsidyCache> {
        self.subsidy.clone()
    }

    fn fetch_utxo_view(&self, tx: &Transaction) -> ChainResult<UtxoView> {
        let txid = tx.txid();
        if self.utxo_fetch_failures.read().contains(&txid) {
            return Err(ChainError::UtxoView {
                tx_id: txid.to_string(),
                reason: "stubbed failure".to_string(),
            });
        }
        let utxos = self.utxos.read();
        let mut view = UtxoView::new();
        for input in &tx.inputs {
            if let Some(entry) = utxos.get(&input.previous_out) {
                view.add_entry(input.previous_out, entry.clone());
            }
        }
        Ok(view)
    }

    fn calc_next_required_difficulty(
        &self,
        _timestamp: u64,
        pow_type: PowType,
    ) -> ChainResult<u32> {
        if *self.failing_difficulty.read() == Some(pow_type) {
            return Err(ChainError::Difficulty {
                pow: pow_type,
                reason: "stubbed failure".to_string(),
            });
        }
        Ok(self
            .difficulties
            .read()
            .get(&pow_type)
            .copied()
            .unwrap_or(TEST_COMPACT_TARGET))
    }

    fn check_transaction_inputs(&self, tx: &Transaction, view: &UtxoView) -> ChainResult<i64> {
        let txid = tx.txid();
        let next_height = self.height + 1;

        let mut input_sum = 0u64;
        for input in &tx.inputs {
            let entry = view.lookup_entry(&input.previous_out).ok_or_else(|| {
                ChainError::MissingInput {
                    tx_id: txid.to_string(),
                    outpoint: input.previous_out.to_string(),
                }
            })?;
            if entry.is_spent() {
                return Err(ChainError::DoubleSpend(input.previous_out.to_string()));
            }
            if entry.is_coinbase() {
                let confirmations = next_height.saturating_sub(entry.block_height());
                if confirmations < self.coinbase_maturity {
                    return Err(ChainError::ImmatureSpend {
                        outpoint: input.previous_out.to_string(),
                        blocks_left: self.coinbase_maturity - confirmations,
                    });
                }
            }
            input_sum = input_sum
                .checked_add(entry.amount())
                .ok_or_else(|| ChainError::ValueOverflow(txid.to_string()))?;
        }

        let mut output_sum = 0u64;
        for output in &tx.outputs {
            if output.amount > MAX_AMOUNT {
                return Err(ChainError::ValueOverflow(txid.to_string()));
            }
            output_sum = output_sum
                .checked_add(output.amount)
                .ok_or_else(|| ChainError::ValueOverflow(txid.to_string()))?;
        }

        if input_sum < output_sum {
            return Err(ChainError::Overspend {
                tx_id: txid.to_string(),
                input_sum,
                output_sum,
            });
        }
        Ok((input_sum - output_sum) as i64)
    }

    fn validate_transaction_scripts(
        &self,
        tx: &Transaction,
        _view: &UtxoView,
        _flags: VerifyFlags,
        _sig_cache: &SigCache,
    ) -> ChainResult<()> {
        let txid = tx.txid();
        if self.script_failures.read().contains(&txid) {
            return Err(ChainError::ScriptVerification {
                tx_id: txid.to_string(),
                reason: "stubbed failure".to_string(),
            });
        }
        Ok(())
    }

    fn check_connect_block_template(
        &self,
        block: &Block,
        _height: u64,
        _order: u64,
    ) -> ChainResult<()> {
        if let Some(reason) = self.connect_rejection.read().as_ref() {
            return Err(ChainError::ConnectCheck(reason.clone()));
        }
        if block.transactions.first().map_or(true, |tx| !tx.is_coinbase()) {
            return Err(ChainError::ConnectCheck(
                "first transaction is not a coinbase".to_string(),
            ));
        }
        Ok(())
    }

    fn median_time_past(&self) -> u64 {
        TEST_MEDIAN_TIME
    }
}

/// Transaction source over a fixed descriptor list, preserving order.
///
/// The concurrent pool iterates in hash order, so deterministic tests use
/// this instead.
#[derive(Default)]
pub struct StaticTxSource {
    descs: Vec<TxDesc>,
}

impl StaticTxSource {
    /// Create a source over descriptors in the given order.
    pub fn new(descs: Vec<TxDesc>) -> Self {
        Self { descs }
    }
}

impl TxSource for StaticTxSource {
    fn mining_descs(&self) -> Vec<TxDesc> {
        self.descs.clone()
    }

    fn have_transaction(&self, txid: &Hash) -> bool {
        self.descs.iter().any(|desc| desc.txid == *txid)
    }
}
