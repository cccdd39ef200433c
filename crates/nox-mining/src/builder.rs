//! Template assembly: the selection engine and the template assembler.
//!
//! `TemplateBuilder::build` produces a candidate block in one synchronous
//! pass. Transactions spending only committed outputs seed the weighted
//! queue directly; transactions spending other pooled transactions wait in
//! the dependency map and are released as their predecessors are included.
//! Selection honors the size, sig-op and fee policy caps, then the
//! assembler attaches Merkle commitments, the per-algorithm difficulty
//! bundle and submits the block to the consensus connect-check.

use crate::cache::TemplateCache;
use crate::coinbase::{create_coinbase_tx, fill_witness_commitment};
use crate::error::{MiningError, MiningResult};
use crate::policy::Policy;
use crate::template::{BlockTemplate, PowDiffStandard};
use crate::weighted_queue::{CandIdx, SortMode, TxCandidate, WeightedTxQueue};
use nox_chain::{
    count_sig_ops, ChainEngine, ChainParams, MedianTimeSource, SigCache, UtxoView,
    MAX_SIGOPS_PER_BLOCK,
};
use nox_mempool::{calc_priority, TxSource};
use nox_types::{
    compact_to_u64, merkle_root, parents_merkle_root, standard_coinbase_opreturn,
    standard_coinbase_script, Address, Block, BlockHeader, Hash, PowType, BLOCK_HEADER_OVERHEAD,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Current time adjusted so it always follows the median time of the
/// recent ancestor window, per the chain consensus rules.
pub fn median_adjusted_time(
    chain: &dyn ChainEngine,
    time_source: &dyn MedianTimeSource,
) -> u64 {
    let lower_bound = chain.median_time_past() + 1;
    time_source.adjusted_time().max(lower_bound)
}

/// Re-stamp a block header with the current median-adjusted time. On
/// networks that allow dropping to the minimum difficulty, the header
/// target is refreshed for the new timestamp as well.
pub fn update_block_time(
    block: &mut Block,
    chain: &dyn ChainEngine,
    time_source: &dyn MedianTimeSource,
    params: &ChainParams,
) -> MiningResult<()> {
    let timestamp = median_adjusted_time(chain, time_source);
    block.header.timestamp = timestamp;

    if params.reduce_min_difficulty {
        let difficulty = chain
            .calc_next_required_difficulty(timestamp, block.header.pow_type)
            .map_err(|e| MiningError::GettingDifficulty {
                pow: block.header.pow_type,
                reason: e.to_string(),
            })?;
        block.header.difficulty = difficulty;
    }
    Ok(())
}

/// Assembles block templates over the node's consensus engine, transaction
/// source and policy. Holds the node-wide template cache.
pub struct TemplateBuilder {
    policy: Policy,
    params: Arc<ChainParams>,
    chain: Arc<dyn ChainEngine>,
    tx_source: Arc<dyn TxSource>,
    time_source: Arc<dyn MedianTimeSource>,
    sig_cache: Arc<SigCache>,
    coinbase_payload: RwLock<Vec<u8>>,
    cache: TemplateCache,
}

impl TemplateBuilder {
    /// Create a builder.
    pub fn new(
        policy: Policy,
        params: Arc<ChainParams>,
        chain: Arc<dyn ChainEngine>,
        tx_source: Arc<dyn TxSource>,
        time_source: Arc<dyn MedianTimeSource>,
        sig_cache: Arc<SigCache>,
    ) -> Self {
        Self {
            policy,
            params,
            chain,
            tx_source,
            time_source,
            sig_cache,
            coinbase_payload: RwLock::new(Vec::new()),
            cache: TemplateCache::new(),
        }
    }

    /// Set the auxiliary payload carried in the coinbase commitment
    /// output. Applies to subsequent builds; a payload over the maximum
    /// script element size fails assembly with `CreatingCoinbase`.
    pub fn set_coinbase_payload(&self, payload: Vec<u8>) {
        *self.coinbase_payload.write() = payload;
    }

    /// Copy of the most recently cached template.
    pub fn current_template(&self) -> Option<BlockTemplate> {
        self.cache.get()
    }

    /// Place a template in the cache unconditionally, e.g. when a caller
    /// installs the first template of a height.
    pub fn set_current_template(&self, template: &BlockTemplate) {
        self.cache.set(template);
    }

    /// Build a new block template paying to `pay_to_address`, or to an
    /// anyone-can-spend output when absent, on top of `parents` or the
    /// chain's current mining tips.
    ///
    /// Returns `Ok(None)` when no template can be built for the parent set;
    /// the caller may retry with different parents.
    pub fn build(
        &self,
        pay_to_address: Option<&Address>,
        parents: Option<&[Hash]>,
    ) -> MiningResult<Option<BlockTemplate>> {
        self.build_with_extra_nonce(pay_to_address, parents, rand::random())
    }

    /// Like [`build`](Self::build) with a caller-chosen coinbase entropy
    /// nonce. Assembly is deterministic for a fixed nonce and snapshot,
    /// which callers rely on to deduplicate concurrent work requests.
    pub fn build_with_extra_nonce(
        &self,
        pay_to_address: Option<&Address>,
        parents: Option<&[Hash]>,
        extra_nonce: u64,
    ) -> MiningResult<Option<BlockTemplate>> {
        let chain = self.chain.as_ref();

        let parents: Vec<Hash> = match parents {
            Some(p) if !p.is_empty() => p.to_vec(),
            _ => chain.get_mining_tips(),
        };
        if parents.is_empty() {
            debug!("no viable mining tips, not building a template");
            return Ok(None);
        }
        let Some(main_parent) = chain.main_parent(&parents) else {
            debug!(parents = parents.len(), "parent set has no main parent");
            return Ok(None);
        };
        let next_height = main_parent.height + 1;
        let next_order = chain.best_snapshot().graph_state.total;

        // The entropy nonce keeps the coinbase hash, and with it the tx
        // Merkle root, unique across candidates for getwork-style lookups.
        let coinbase_script = standard_coinbase_script(next_height, extra_nonce)?;
        let opreturn_script = standard_coinbase_opreturn(self.coinbase_payload.read().as_slice())?;

        let blues = chain.get_blues(&parents);
        let coinbase_tx = create_coinbase_tx(
            &chain.subsidy_cache(),
            coinbase_script,
            opreturn_script,
            blues,
            pay_to_address,
        );
        let coinbase_sig_ops = count_sig_ops(&coinbase_tx) as i64;

        // Choose the initial sort order based on whether space is reserved
        // for high-priority transactions.
        let source_txs = self.tx_source.mining_descs();
        let mut sorted_by_fee = self.policy.block_priority_size == 0;
        let initial_mode = if sorted_by_fee {
            SortMode::FeeThenPriority
        } else {
            SortMode::PriorityThenFee
        };
        let mut queue = WeightedTxQueue::new(initial_mode, source_txs.len());

        let mut block_txs = Vec::with_capacity(source_txs.len() + 1);
        block_txs.push(coinbase_tx.clone());

        // All candidates are allocated in the arena; the queue and the
        // dependency map refer to them by index.
        let mut arena: Vec<TxCandidate> = Vec::with_capacity(source_txs.len());
        let mut dependers: HashMap<Hash, Vec<CandIdx>> = HashMap::new();
        let mut block_utxos = UtxoView::new();

        // Fee and sig-op ledgers by block position. The coinbase fee slot
        // is a placeholder until the total is known.
        let mut tx_fees: Vec<i64> = Vec::with_capacity(source_txs.len() + 1);
        let mut tx_sig_ops: Vec<i64> = Vec::with_capacity(source_txs.len() + 1);
        tx_fees.push(-1);
        tx_sig_ops.push(coinbase_sig_ops);

        debug!(transactions = source_txs.len(), height = next_height, "considering mempool for new block");

        'mempool: for desc in source_txs {
            let tx = desc.tx.clone();
            let txid = desc.txid;

            // A block can't have more than one coinbase or contain
            // non-finalized transactions.
            if tx.is_coinbase() {
                trace!(tx = %txid, "skipping coinbase transaction");
                continue;
            }
            if !tx.is_finalized(next_height, self.time_source.adjusted_time()) {
                trace!(tx = %txid, "skipping non-finalized transaction");
                continue;
            }

            // Fetch the committed entries this transaction references. The
            // fetch intentionally does not consult the pool: a transaction
            // depending on pooled predecessors must follow them in the
            // block, which the dependency map enforces.
            let utxos = match chain.fetch_utxo_view(&tx) {
                Ok(view) => view,
                Err(e) => {
                    warn!(tx = %txid, error = %e, "unable to fetch utxo view");
                    continue;
                }
            };

            let mut cand = TxCandidate::new(desc);
            for input in &tx.inputs {
                let origin = input.previous_out.txid;
                let entry = utxos.lookup_entry(&input.previous_out);
                if entry.is_none() || entry.is_some_and(|e| e.is_spent()) {
                    if !self.tx_source.have_transaction(&origin) {
                        trace!(
                            tx = %txid,
                            outpoint = %input.previous_out,
                            "skipping tx referencing unavailable output"
                        );
                        continue 'mempool;
                    }
                    // The input comes from another pooled transaction;
                    // record the ordering dependency on it.
                    cand.depends_on
                        .get_or_insert_with(Default::default)
                        .insert(origin);
                }
            }

            cand.priority = calc_priority(&tx, &utxos, next_height);

            let idx = arena.len();
            if let Some(depends_on) = &cand.depends_on {
                for origin in depends_on {
                    dependers.entry(*origin).or_default().push(idx);
                }
            } else {
                queue.push(idx, cand.priority, cand.desc.fee_per_kb);
            }
            arena.push(cand);

            // Fold the fetched entries in so the selection loop can answer
            // every lookup from one view.
            block_utxos.merge(utxos);
        }

        trace!(
            queued = queue.len(),
            depending = dependers.len(),
            "mempool scan complete"
        );

        // The fixed prefix covers the header, the worst-case count prefixes
        // and the parent list, so the tracked size never undercounts the
        // serialized block.
        let mut block_size =
            (BLOCK_HEADER_OVERHEAD + 32 * parents.len() + coinbase_tx.serialized_size()) as u32;
        let mut block_sig_ops = coinbase_sig_ops;
        let mut total_fees = 0i64;
        let priority_size = self.policy.effective_priority_size();

        // Selection loop: pull the best candidate under the current
        // ordering, enforce the caps, validate, then commit.
        while let Some(idx) = queue.pop() {
            let (tx, txid, priority, fee, fee_per_kb) = {
                let cand = &arena[idx];
                (
                    cand.desc.tx.clone(),
                    cand.desc.txid,
                    cand.priority,
                    cand.desc.fee,
                    cand.desc.fee_per_kb,
                )
            };

            // Enforce the maximum block size, guarding against overflow.
            let tx_size = tx.serialized_size() as u32;
            let block_plus_tx = match block_size.checked_add(tx_size) {
                Some(size) if size < self.policy.block_max_size => size,
                _ => {
                    trace!(
                        tx = %txid,
                        size = tx_size,
                        block_size,
                        "skipping tx that would exceed the max block size"
                    );
                    log_skipped_deps(&txid, dependers.get(&txid), &arena);
                    continue;
                }
            };

            // Enforce the maximum signature-operation cost, likewise
            // guarded against overflow.
            let sig_ops = count_sig_ops(&tx) as i64;
            match block_sig_ops.checked_add(sig_ops) {
                Some(cost) if cost <= MAX_SIGOPS_PER_BLOCK => {}
                _ => {
                    trace!(tx = %txid, "skipping tx that would exceed the sigop cap");
                    log_skipped_deps(&txid, dependers.get(&txid), &arena);
                    continue;
                }
            }

            // Once the high-priority area is filled, or priorities drop
            // below the threshold, switch to fee ordering. The popped
            // candidate goes back so it is never included under the stale
            // key.
            if !sorted_by_fee
                && (block_plus_tx >= priority_size
                    || priority < self.policy.high_priority_threshold)
            {
                debug!(
                    block_size = block_plus_tx,
                    priority, "switching to fee-per-kb ordering"
                );
                sorted_by_fee = true;
                queue.set_mode(SortMode::FeeThenPriority);
                queue.push(idx, priority, fee_per_kb);
                continue;
            }

            // Skip free transactions once the block is at its minimum size.
            if sorted_by_fee
                && fee_per_kb < self.policy.tx_min_free_fee
                && block_plus_tx >= self.policy.block_min_size
            {
                trace!(
                    tx = %txid,
                    fee_per_kb,
                    min_free_fee = self.policy.tx_min_free_fee,
                    "skipping free tx, block is at minimum size"
                );
                log_skipped_deps(&txid, dependers.get(&txid), &arena);
                continue;
            }

            // Full input preconditions and script execution against the
            // provisional view.
            if let Err(e) = chain.check_transaction_inputs(&tx, &block_utxos) {
                trace!(tx = %txid, error = %e, "skipping tx with failing inputs");
                log_skipped_deps(&txid, dependers.get(&txid), &arena);
                continue;
            }
            if let Err(e) = chain.validate_transaction_scripts(
                &tx,
                &block_utxos,
                self.policy.standard_verify_flags,
                &self.sig_cache,
            ) {
                trace!(tx = %txid, error = %e, "skipping tx with failing scripts");
                log_skipped_deps(&txid, dependers.get(&txid), &arena);
                continue;
            }

            // Commit: spend the inputs and expose the outputs so later
            // candidates can chain on this transaction without double
            // spending, then record the ledgers.
            block_utxos.spend_transaction(&tx, next_height);
            block_txs.push((*tx).clone());
            block_size = block_plus_tx;
            block_sig_ops += sig_ops;
            total_fees += fee;
            tx_fees.push(fee);
            tx_sig_ops.push(sig_ops);

            trace!(tx = %txid, priority, fee_per_kb, "added tx to block");

            // Release dependents whose last predecessor was just included.
            if let Some(deps) = dependers.remove(&txid) {
                for dep_idx in deps {
                    let dep = &mut arena[dep_idx];
                    if let Some(depends_on) = dep.depends_on.as_mut() {
                        depends_on.remove(&txid);
                        if depends_on.is_empty() {
                            dep.depends_on = None;
                            queue.push(dep_idx, dep.priority, dep.desc.fee_per_kb);
                        }
                    }
                }
            }
        }

        // Dependents whose predecessors were skipped stay unreleased; they
        // are simply not part of this block.
        if !dependers.is_empty() {
            trace!(unreleased = dependers.len(), "dependent txs not included");
        }

        // The coinbase fee slot carries the negated total so the ledger
        // sums to zero; the coinbase output value stays at the subsidy.
        tx_fees[0] = -total_fees;

        fill_witness_commitment(&mut block_txs)?;

        let timestamp = median_adjusted_time(chain, self.time_source.as_ref());
        let pow_diff = self.fetch_difficulties(timestamp)?;

        let tx_hashes: Vec<Hash> = block_txs.iter().map(|tx| tx.txid()).collect();
        let header = BlockHeader {
            version: self.params.block_version(),
            parent_root: parents_merkle_root(&parents),
            tx_root: merkle_root(&tx_hashes),
            // State commitments are not active yet.
            state_root: Hash::ZERO,
            timestamp,
            difficulty: pow_diff.header_target,
            pow_type: PowType::Cuckaroom,
            nonce: 0,
        };

        let mut block = Block::new(header);
        for parent in &parents {
            block.add_parent(*parent).map_err(MiningError::ParentAppend)?;
        }
        for tx in block_txs {
            block
                .add_transaction(tx)
                .map_err(MiningError::TransactionAppend)?;
        }

        chain
            .check_connect_block_template(&block, next_height, next_order)
            .map_err(MiningError::CheckConnectBlock)?;

        debug!(
            transactions = block.transactions.len(),
            fees = total_fees,
            sig_ops = block_sig_ops,
            bytes = block_size,
            height = next_height,
            "created new block template"
        );

        let template = BlockTemplate {
            block,
            fees: tx_fees,
            sig_op_counts: tx_sig_ops,
            height: next_height,
            blues,
            valid_pay_address: pay_to_address.is_some(),
            pow_diff: pow_diff.bundle,
        };
        self.cache.store_if_current(&template);
        Ok(Some(template))
    }

    /// Query the difficulty oracle for every supported algorithm.
    fn fetch_difficulties(&self, timestamp: u64) -> MiningResult<FetchedDifficulties> {
        let target = |pow| {
            self.chain
                .calc_next_required_difficulty(timestamp, pow)
                .map_err(|e| MiningError::GettingDifficulty {
                    pow,
                    reason: e.to_string(),
                })
        };

        let blake2bd_target = target(PowType::Blake2bD)?;
        let x16rv3_target = target(PowType::X16Rv3)?;
        let x8r16_target = target(PowType::X8r16)?;
        let keccak256_target = target(PowType::Keccak256)?;
        let cuckaroo = target(PowType::Cuckaroo)?;
        let cuckaroom = target(PowType::Cuckaroom)?;
        let cuckatoo = target(PowType::Cuckatoo)?;

        Ok(FetchedDifficulties {
            header_target: cuckaroom,
            bundle: PowDiffStandard {
                blake2bd_target,
                x16rv3_target,
                x8r16_target,
                keccak256_target,
                cuckaroo_base_diff: compact_to_u64(cuckaroo),
                cuckaroom_base_diff: compact_to_u64(cuckaroom),
                cuckatoo_base_diff: compact_to_u64(cuckatoo),
            },
        })
    }
}

/// The header target plus the full per-algorithm bundle.
struct FetchedDifficulties {
    header_target: u32,
    bundle: PowDiffStandard,
}

/// Trace the dependents that become unreachable through a skipped
/// transaction. They may still be released through other predecessors.
fn log_skipped_deps(txid: &Hash, deps: Option<&Vec<CandIdx>>, arena: &[TxCandidate]) {
    let Some(deps) = deps else {
        return;
    };
    for &idx in deps {
        trace!(tx = %arena[idx].desc.txid, depends_on = %txid, "dependent tx skipped");
    }
}
