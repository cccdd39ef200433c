//! Coinbase transaction construction.

use crate::error::MiningResult;
use nox_chain::SubsidyCache;
use nox_types::{
    anyone_can_spend_script, Address, OutPoint, Transaction, TxInput, TxOutput,
};
use tracing::debug;

/// Build the coinbase transaction for a new block.
///
/// The synthetic input carries `coinbase_script`, which encodes the next
/// block height and the entropy nonce so the transaction hash is unique
/// across candidate blocks. The primary output pays the subsidy for the
/// parent set's blue count to `pay_to`, or to an anyone-can-spend script
/// when no address is configured and external mining software will supply
/// its own coinbase. A zero-value OP_RETURN output carries the commitment
/// placeholder.
///
/// Fees are not added to the output value; the fee ledger's slot 0 carries
/// the negated total instead, and downstream consumers derive the displayed
/// fee from the ledger.
pub fn create_coinbase_tx(
    subsidy_cache: &SubsidyCache,
    coinbase_script: Vec<u8>,
    opreturn_script: Vec<u8>,
    blues: u64,
    pay_to: Option<&Address>,
) -> Transaction {
    let subsidy = subsidy_cache.calc_block_subsidy(blues);
    let pk_script = match pay_to {
        Some(address) => address.pk_script(),
        None => anyone_can_spend_script(),
    };

    debug!(blues, subsidy, has_address = pay_to.is_some(), "building coinbase");

    let mut tx = Transaction::new();
    tx.inputs
        .push(TxInput::new(OutPoint::coinbase(), coinbase_script));
    tx.outputs.push(TxOutput::new(subsidy, pk_script));
    tx.outputs.push(TxOutput::new(0, opreturn_script));
    tx
}

/// Fill the witness commitment of the coinbase once the transaction set is
/// final. The commitment output currently carries an empty payload, so
/// this is a no-op hook kept for the activation of witness data.
pub fn fill_witness_commitment(_block_txs: &mut [Transaction]) -> MiningResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_chain::SubsidyParams;
    use nox_types::{standard_coinbase_opreturn, standard_coinbase_script, script::OP_RETURN};

    fn build(pay_to: Option<&Address>, extra_nonce: u64) -> Transaction {
        let cache = SubsidyCache::new(SubsidyParams::default());
        create_coinbase_tx(
            &cache,
            standard_coinbase_script(100, extra_nonce).unwrap(),
            standard_coinbase_opreturn(&[]).unwrap(),
            0,
            pay_to,
        )
    }

    #[test]
    fn test_coinbase_shape() {
        let tx = build(None, 1);
        assert!(tx.is_coinbase());
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[1].amount, 0);
        assert_eq!(tx.outputs[1].pk_script[0], OP_RETURN);
    }

    #[test]
    fn test_subsidy_value_excludes_fees() {
        let cache = SubsidyCache::new(SubsidyParams::default());
        let tx = build(None, 1);
        assert_eq!(tx.outputs[0].amount, cache.calc_block_subsidy(0));
    }

    #[test]
    fn test_pay_to_address_script_used() {
        let address = Address::new([7u8; 20]);
        let tx = build(Some(&address), 1);
        assert_eq!(tx.outputs[0].pk_script, address.pk_script());
    }

    #[test]
    fn test_anyone_can_spend_without_address() {
        let tx = build(None, 1);
        assert_eq!(tx.outputs[0].pk_script, anyone_can_spend_script());
    }

    #[test]
    fn test_nonce_uniquifies_txid() {
        assert_ne!(build(None, 1).txid(), build(None, 2).txid());
    }

    #[test]
    fn test_fill_witness_commitment_is_noop() {
        let mut txs = vec![build(None, 1)];
        let before = txs[0].clone();
        fill_witness_commitment(&mut txs).unwrap();
        assert_eq!(txs[0], before);
    }
}
