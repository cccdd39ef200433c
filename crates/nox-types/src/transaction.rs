//! Transaction wire types.

use crate::hash::{hash_data, Hash};
use crate::serialize::{var_int_size, write_var_int};
use crate::Amount;
use std::fmt;

/// Sequence number that opts an input out of lock-time enforcement.
pub const MAX_TX_IN_SEQUENCE_NUM: u32 = u32::MAX;

/// Lock-time values below this threshold are block heights, values at or
/// above it are unix timestamps.
pub const LOCK_TIME_THRESHOLD: u64 = 500_000_000;

/// Reference to an output of a previous transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OutPoint {
    /// Id of the transaction holding the output.
    pub txid: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// Create a new outpoint.
    pub fn new(txid: Hash, index: u32) -> Self {
        Self { txid, index }
    }

    /// The synthetic outpoint spent by a coinbase input.
    pub fn coinbase() -> Self {
        Self {
            txid: Hash::ZERO,
            index: u32::MAX,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// Transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// Output being spent.
    pub previous_out: OutPoint,
    /// Signature script satisfying the spent output.
    pub sig_script: Vec<u8>,
    /// Relative lock / replacement sequence.
    pub sequence: u32,
}

impl TxInput {
    /// Create an input spending `previous_out` with the final sequence.
    pub fn new(previous_out: OutPoint, sig_script: Vec<u8>) -> Self {
        Self {
            previous_out,
            sig_script,
            sequence: MAX_TX_IN_SEQUENCE_NUM,
        }
    }

    /// Serialized size of this input.
    pub fn serialized_size(&self) -> usize {
        // txid + index + script length prefix + script + sequence
        32 + 4 + var_int_size(self.sig_script.len() as u64) + self.sig_script.len() + 4
    }
}

/// Transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in base units.
    pub amount: Amount,
    /// Locking script.
    pub pk_script: Vec<u8>,
}

impl TxOutput {
    /// Create a new output.
    pub fn new(amount: Amount, pk_script: Vec<u8>) -> Self {
        Self { amount, pk_script }
    }

    /// Serialized size of this output.
    pub fn serialized_size(&self) -> usize {
        8 + var_int_size(self.pk_script.len() as u64) + self.pk_script.len()
    }
}

/// A transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Wire format version.
    pub version: u32,
    /// Inputs.
    pub inputs: Vec<TxInput>,
    /// Outputs.
    pub outputs: Vec<TxOutput>,
    /// Earliest height or time this transaction may be mined at.
    pub lock_time: u32,
}

impl Transaction {
    /// Current wire format version.
    pub const VERSION: u32 = 1;

    /// Create an empty transaction at the current version.
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Whether this is a coinbase: a single input spending the synthetic
    /// zero outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_out == OutPoint::coinbase()
    }

    /// Transaction id: the hash of the wire encoding.
    pub fn txid(&self) -> Hash {
        hash_data(&self.encode())
    }

    /// Serialized size in bytes, computed without allocating.
    pub fn serialized_size(&self) -> usize {
        let mut size = 4 + var_int_size(self.inputs.len() as u64);
        for input in &self.inputs {
            size += input.serialized_size();
        }
        size += var_int_size(self.outputs.len() as u64);
        for output in &self.outputs {
            size += output.serialized_size();
        }
        size + 4
    }

    /// Wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        buf.extend_from_slice(&self.version.to_le_bytes());
        write_var_int(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(input.previous_out.txid.as_bytes());
            buf.extend_from_slice(&input.previous_out.index.to_le_bytes());
            write_var_int(&mut buf, input.sig_script.len() as u64);
            buf.extend_from_slice(&input.sig_script);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_var_int(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.amount.to_le_bytes());
            write_var_int(&mut buf, output.pk_script.len() as u64);
            buf.extend_from_slice(&output.pk_script);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Whether the transaction is finalized at the given next block height
    /// and adjusted time, per the lock-time rules.
    pub fn is_finalized(&self, next_height: u64, adjusted_time: u64) -> bool {
        if self.lock_time == 0 {
            return true;
        }
        let threshold = if (self.lock_time as u64) < LOCK_TIME_THRESHOLD {
            next_height
        } else {
            adjusted_time
        };
        if (self.lock_time as u64) < threshold {
            return true;
        }
        // A lock time in the future is still final when every input opted
        // out with the maximum sequence.
        self.inputs
            .iter()
            .all(|input| input.sequence == MAX_TX_IN_SEQUENCE_NUM)
    }

    /// Total value of all outputs, saturating on overflow.
    pub fn total_out(&self) -> Amount {
        self.outputs
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.amount))
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(
            OutPoint::new(hash_data(b"prev"), 0),
            vec![1, 2, 3],
        ));
        tx.outputs.push(TxOutput::new(5_000, vec![0x51]));
        tx
    }

    #[test]
    fn test_serialized_size_matches_encoding() {
        let tx = simple_tx();
        assert_eq!(tx.serialized_size(), tx.encode().len());
    }

    #[test]
    fn test_txid_changes_with_content() {
        let a = simple_tx();
        let mut b = simple_tx();
        b.outputs[0].amount += 1;
        assert_ne!(a.txid(), b.txid());
    }

    #[test]
    fn test_coinbase_detection() {
        let mut cb = Transaction::new();
        cb.inputs.push(TxInput::new(OutPoint::coinbase(), vec![]));
        assert!(cb.is_coinbase());
        assert!(!simple_tx().is_coinbase());
    }

    #[test]
    fn test_finalized_zero_lock_time() {
        assert!(simple_tx().is_finalized(0, 0));
    }

    #[test]
    fn test_finalized_by_height() {
        let mut tx = simple_tx();
        tx.lock_time = 100;
        tx.inputs[0].sequence = 0;
        assert!(!tx.is_finalized(100, 0));
        assert!(tx.is_finalized(101, 0));
    }

    #[test]
    fn test_finalized_by_time() {
        let mut tx = simple_tx();
        tx.lock_time = 600_000_000;
        tx.inputs[0].sequence = 0;
        assert!(!tx.is_finalized(0, 600_000_000));
        assert!(tx.is_finalized(0, 600_000_001));
    }

    #[test]
    fn test_future_lock_time_with_max_sequence() {
        let mut tx = simple_tx();
        tx.lock_time = 100;
        // Default sequence is the maximum, which overrides the lock time.
        assert!(tx.is_finalized(1, 0));
    }
}
