//! Deterministic builders for test transactions and template setups.

use crate::harness::{FixedTimeSource, StubChain, TEST_ADJUSTED_TIME};
use nox_chain::{ChainParams, SigCache};
use nox_mempool::{TxDesc, TxSource};
use nox_mining::{Policy, TemplateBuilder};
use nox_types::{hash_data, Hash, OutPoint, Transaction, TxInput, TxOutput};
use std::sync::Arc;

/// Height committed outputs are funded at, comfortably aged.
pub const FUNDING_HEIGHT: u64 = 1;

/// Fund a fresh committed outpoint on the stub chain, derived from `seed`.
pub fn fund_outpoint(chain: &StubChain, seed: &str, amount: u64) -> OutPoint {
    let outpoint = OutPoint::new(hash_data(seed.as_bytes()), 0);
    chain.add_utxo(outpoint, amount, FUNDING_HEIGHT);
    outpoint
}

/// Build a transaction spending `inputs` into outputs of the given amounts.
pub fn spend_tx(inputs: &[OutPoint], outputs: &[u64]) -> Arc<Transaction> {
    let mut tx = Transaction::new();
    for outpoint in inputs {
        tx.inputs.push(TxInput::new(*outpoint, Vec::new()));
    }
    for &amount in outputs {
        tx.outputs.push(TxOutput::new(amount, vec![0x51]));
    }
    Arc::new(tx)
}

/// Like [`spend_tx`], padded with signature-script bytes until the
/// serialized size reaches `target_size`.
pub fn spend_tx_with_size(
    inputs: &[OutPoint],
    outputs: &[u64],
    target_size: usize,
) -> Arc<Transaction> {
    let base = spend_tx(inputs, outputs);
    let base_size = base.serialized_size();
    assert!(
        target_size >= base_size,
        "target {target_size} below base size {base_size}"
    );
    let mut tx = (*base).clone();
    tx.inputs[0].sig_script = vec![0x6a; target_size - base_size];
    // Growing the script can grow its length prefix; trim if it did.
    while tx.serialized_size() > target_size {
        tx.inputs[0].sig_script.pop();
    }
    assert_eq!(tx.serialized_size(), target_size);
    Arc::new(tx)
}

/// Wrap a transaction in a mining descriptor at the test clock.
pub fn desc_for(tx: Arc<Transaction>, fee: i64) -> TxDesc {
    TxDesc::new(tx, fee, FUNDING_HEIGHT, TEST_ADJUSTED_TIME)
}

/// Assemble a template builder over the stub chain and a transaction
/// source, using privnet parameters and the fixed test clock.
pub fn builder_over(
    policy: Policy,
    chain: Arc<StubChain>,
    tx_source: Arc<dyn TxSource>,
) -> TemplateBuilder {
    TemplateBuilder::new(
        policy,
        Arc::new(ChainParams::privnet()),
        chain,
        tx_source,
        Arc::new(FixedTimeSource(TEST_ADJUSTED_TIME)),
        Arc::new(SigCache::default()),
    )
}

/// Ids of the transactions in a block, in block order.
pub fn block_txids(block: &nox_types::Block) -> Vec<Hash> {
    block.transactions.iter().map(|tx| tx.txid()).collect()
}
