//! Signature-operation counting.

use nox_types::script::{
    OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY, OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_PUSHDATA1,
    OP_PUSHDATA2, OP_PUSHDATA4,
};
use nox_types::Transaction;

/// Maximum accumulated signature-operation cost per block.
pub const MAX_SIGOPS_PER_BLOCK: i64 = 80_000;

/// Weight of a multisig opcode when the key count cannot be determined
/// statically.
const MULTISIG_SIGOPS: u64 = 20;

/// Count the weighted signature operations of a transaction over its input
/// and output scripts.
pub fn count_sig_ops(tx: &Transaction) -> u64 {
    let mut count = 0u64;
    for input in &tx.inputs {
        count += script_sig_ops(&input.sig_script);
    }
    for output in &tx.outputs {
        count += script_sig_ops(&output.pk_script);
    }
    count
}

/// Count signature operations in a single script, skipping pushed data.
fn script_sig_ops(script: &[u8]) -> u64 {
    let mut count = 0u64;
    let mut i = 0usize;
    while i < script.len() {
        let op = script[i];
        i += 1;
        match op {
            OP_CHECKSIG | OP_CHECKSIGVERIFY => count += 1,
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => count += MULTISIG_SIGOPS,
            // Direct pushes carry their length in the opcode.
            1..=0x4b => i += op as usize,
            OP_PUSHDATA1 => {
                let len = script.get(i).copied().unwrap_or(0) as usize;
                i += 1 + len;
            }
            OP_PUSHDATA2 => {
                let len = match script.get(i..i + 2) {
                    Some(b) => u16::from_le_bytes([b[0], b[1]]) as usize,
                    None => 0,
                };
                i += 2 + len;
            }
            OP_PUSHDATA4 => {
                let len = match script.get(i..i + 4) {
                    Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize,
                    None => 0,
                };
                i += 4 + len;
            }
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use nox_types::{hash_data, OutPoint, TxInput, TxOutput};

    fn tx_with_output_script(pk_script: Vec<u8>) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs
            .push(TxInput::new(OutPoint::new(hash_data(b"p"), 0), vec![]));
        tx.outputs.push(TxOutput::new(1_000, pk_script));
        tx
    }

    #[test]
    fn test_counts_checksig() {
        let tx = tx_with_output_script(vec![OP_CHECKSIG]);
        assert_eq!(count_sig_ops(&tx), 1);
    }

    #[test]
    fn test_counts_multisig_as_twenty() {
        let tx = tx_with_output_script(vec![OP_CHECKMULTISIG]);
        assert_eq!(count_sig_ops(&tx), MULTISIG_SIGOPS);
    }

    #[test]
    fn test_skips_pushed_data() {
        // A pushed OP_CHECKSIG byte is data, not an operation.
        let tx = tx_with_output_script(vec![0x01, OP_CHECKSIG]);
        assert_eq!(count_sig_ops(&tx), 0);
    }

    #[test]
    fn test_skips_pushdata1_payload() {
        let mut script = vec![OP_PUSHDATA1, 2, OP_CHECKSIG, OP_CHECKSIG];
        script.push(OP_CHECKSIG);
        let tx = tx_with_output_script(script);
        assert_eq!(count_sig_ops(&tx), 1);
    }

    #[test]
    fn test_counts_across_inputs_and_outputs() {
        let mut tx = tx_with_output_script(vec![OP_CHECKSIG]);
        tx.inputs[0].sig_script = vec![OP_CHECKSIGVERIFY];
        assert_eq!(count_sig_ops(&tx), 2);
    }

    #[test]
    fn test_truncated_pushdata_terminates() {
        let tx = tx_with_output_script(vec![OP_PUSHDATA2, 0xff]);
        assert_eq!(count_sig_ops(&tx), 0);
    }
}
