//! Transaction priority and fee density.

use nox_chain::UtxoView;
use nox_types::Transaction;

/// Fixed overhead of an input that the priority size adjustment deducts:
/// outpoint, sequence and length prefixes.
const INPUT_BASE_OVERHEAD: usize = 41;

/// Portion of a signature script the adjustment also deducts, so priority
/// does not punish ordinary signatures.
const INPUT_SCRIPT_OVERHEAD: usize = 110;

/// Compute the legacy priority of a transaction:
/// `Σ(input_value × input_age) / adjusted_size`.
///
/// Input age is measured in blocks from the entry's containing height to
/// `next_height`; entries of the block under construction contribute zero.
/// Inputs absent from the view contribute nothing.
pub fn calc_priority(tx: &Transaction, view: &UtxoView, next_height: u64) -> f64 {
    let overhead: usize = tx
        .inputs
        .iter()
        .map(|input| INPUT_BASE_OVERHEAD + input.sig_script.len().min(INPUT_SCRIPT_OVERHEAD))
        .sum();
    let adjusted_size = tx.serialized_size().saturating_sub(overhead);
    if adjusted_size == 0 {
        return 0.0;
    }

    let mut value_age = 0.0f64;
    for input in &tx.inputs {
        if let Some(entry) = view.lookup_entry(&input.previous_out) {
            let age = next_height.saturating_sub(entry.block_height());
            value_age += entry.amount() as f64 * age as f64;
        }
    }
    value_age / adjusted_size as f64
}

/// Fee density in base units per kilobyte of serialized size.
pub fn calc_fee_per_kb(fee: i64, serialized_size: usize) -> i64 {
    if serialized_size == 0 {
        return 0;
    }
    fee.saturating_mul(1000) / serialized_size as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_chain::UtxoEntry;
    use nox_types::{hash_data, Hash, OutPoint, TxInput, TxOutput};

    fn spend(prev: OutPoint) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(prev, vec![]));
        tx.outputs.push(TxOutput::new(1_000, vec![0x51]));
        tx
    }

    #[test]
    fn test_priority_grows_with_age() {
        let prev = OutPoint::new(hash_data(b"p"), 0);
        let tx = spend(prev);
        let mut view = UtxoView::new();
        view.add_entry(
            prev,
            UtxoEntry::new(10_000, vec![0x51], 100, hash_data(b"b"), false),
        );

        let young = calc_priority(&tx, &view, 101);
        let old = calc_priority(&tx, &view, 200);
        assert!(old > young);
        assert!(young > 0.0);
    }

    #[test]
    fn test_priority_zero_for_unmined_inputs() {
        let prev = OutPoint::new(hash_data(b"p"), 0);
        let tx = spend(prev);
        let mut view = UtxoView::new();
        view.add_entry(
            prev,
            UtxoEntry::new(10_000, vec![0x51], 200, Hash::ZERO, false),
        );
        assert_eq!(calc_priority(&tx, &view, 200), 0.0);
    }

    #[test]
    fn test_priority_ignores_missing_inputs() {
        let tx = spend(OutPoint::new(hash_data(b"p"), 0));
        assert_eq!(calc_priority(&tx, &UtxoView::new(), 100), 0.0);
    }

    #[test]
    fn test_fee_per_kb() {
        assert_eq!(calc_fee_per_kb(1_000, 250), 4_000);
        assert_eq!(calc_fee_per_kb(1_000, 1_000), 1_000);
        assert_eq!(calc_fee_per_kb(0, 250), 0);
        assert_eq!(calc_fee_per_kb(1_000, 0), 0);
    }
}
