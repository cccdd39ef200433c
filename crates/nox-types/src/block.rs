//! Block and block header wire types.

use crate::error::BlockError;
use crate::hash::{hash_data, Hash};
use crate::pow::PowType;
use crate::serialize::{var_int_size, write_var_int, MAX_VAR_INT_SIZE};
use crate::transaction::Transaction;

/// Serialized size of a block header.
pub const BLOCK_HEADER_SIZE: usize = 4 + 32 + 32 + 32 + 8 + 4 + 1 + 8;

/// Fixed-size prefix of a serialized block excluding the transaction list:
/// the header plus the worst-case parent-count and tx-count prefixes.
pub const BLOCK_HEADER_OVERHEAD: usize = BLOCK_HEADER_SIZE + 2 * MAX_VAR_INT_SIZE;

/// Block header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Version derived from the network id.
    pub version: u32,
    /// Merkle root over the parent tip set.
    pub parent_root: Hash,
    /// Merkle root over the transaction list.
    pub tx_root: Hash,
    /// State commitment. Zero until state roots are activated.
    pub state_root: Hash,
    /// Block timestamp, median-time-past adjusted.
    pub timestamp: u64,
    /// Compact difficulty target for `pow_type`.
    pub difficulty: u32,
    /// Algorithm the header difficulty applies to. Miners choosing another
    /// algorithm rewrite this along with the difficulty.
    pub pow_type: PowType,
    /// Proof-of-work nonce, zero in a template.
    pub nonce: u64,
}

impl BlockHeader {
    /// Wire encoding of the header.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BLOCK_HEADER_SIZE);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(self.parent_root.as_bytes());
        buf.extend_from_slice(self.tx_root.as_bytes());
        buf.extend_from_slice(self.state_root.as_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.difficulty.to_le_bytes());
        buf.push(self.pow_type.wire_id());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Header hash, which is the block id.
    pub fn hash(&self) -> Hash {
        hash_data(&self.encode())
    }
}

/// A block: header, parent tip references and transactions.
#[derive(Clone, Debug)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Parent tip ids this block extends.
    pub parents: Vec<Hash>,
    /// Transactions, coinbase first.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block with no parents or transactions attached yet.
    pub fn new(header: BlockHeader) -> Self {
        Self {
            header,
            parents: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Block id.
    pub fn block_hash(&self) -> Hash {
        self.header.hash()
    }

    /// Attach a parent tip reference.
    pub fn add_parent(&mut self, parent: Hash) -> Result<(), BlockError> {
        if self.parents.contains(&parent) {
            return Err(BlockError::DuplicateParent(parent.to_string()));
        }
        self.parents.push(parent);
        Ok(())
    }

    /// Append a transaction. A coinbase is only accepted at index 0 and
    /// duplicate ids are rejected.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), BlockError> {
        let txid = tx.txid();
        if tx.is_coinbase() && !self.transactions.is_empty() {
            return Err(BlockError::MisplacedCoinbase(txid.to_string()));
        }
        if self.transactions.iter().any(|t| t.txid() == txid) {
            return Err(BlockError::DuplicateTransaction(txid.to_string()));
        }
        self.transactions.push(tx);
        Ok(())
    }

    /// Serialized size of the block in bytes.
    pub fn serialized_size(&self) -> usize {
        let mut size = BLOCK_HEADER_SIZE;
        size += var_int_size(self.parents.len() as u64) + 32 * self.parents.len();
        size += var_int_size(self.transactions.len() as u64);
        for tx in &self.transactions {
            size += tx.serialized_size();
        }
        size
    }

    /// Wire encoding of the whole block.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        buf.extend_from_slice(&self.header.encode());
        write_var_int(&mut buf, self.parents.len() as u64);
        for parent in &self.parents {
            buf.extend_from_slice(parent.as_bytes());
        }
        write_var_int(&mut buf, self.transactions.len() as u64);
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.encode());
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{OutPoint, TxInput, TxOutput};

    fn test_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            parent_root: Hash::ZERO,
            tx_root: Hash::ZERO,
            state_root: Hash::ZERO,
            timestamp: 1_700_000_000,
            difficulty: 0x2007_ffff,
            pow_type: PowType::Cuckaroom,
            nonce: 0,
        }
    }

    fn coinbase_tx(tag: u8) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(OutPoint::coinbase(), vec![tag]));
        tx.outputs.push(TxOutput::new(5_000, vec![0x51]));
        tx
    }

    fn spend_tx(prev: Hash) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(OutPoint::new(prev, 0), vec![]));
        tx.outputs.push(TxOutput::new(1_000, vec![0x51]));
        tx
    }

    #[test]
    fn test_header_encoding_size() {
        assert_eq!(test_header().encode().len(), BLOCK_HEADER_SIZE);
    }

    #[test]
    fn test_header_hash_covers_nonce() {
        let a = test_header();
        let mut b = test_header();
        b.nonce = 1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_add_parent_rejects_duplicates() {
        let mut block = Block::new(test_header());
        let tip = hash_data(b"tip");
        block.add_parent(tip).unwrap();
        assert!(matches!(
            block.add_parent(tip),
            Err(BlockError::DuplicateParent(_))
        ));
    }

    #[test]
    fn test_add_transaction_rejects_second_coinbase() {
        let mut block = Block::new(test_header());
        block.add_transaction(coinbase_tx(1)).unwrap();
        assert!(matches!(
            block.add_transaction(coinbase_tx(2)),
            Err(BlockError::MisplacedCoinbase(_))
        ));
    }

    #[test]
    fn test_add_transaction_rejects_duplicates() {
        let mut block = Block::new(test_header());
        let tx = spend_tx(hash_data(b"prev"));
        block.add_transaction(tx.clone()).unwrap();
        assert!(matches!(
            block.add_transaction(tx),
            Err(BlockError::DuplicateTransaction(_))
        ));
    }

    #[test]
    fn test_serialized_size_matches_encoding() {
        let mut block = Block::new(test_header());
        block.add_parent(hash_data(b"tip-a")).unwrap();
        block.add_parent(hash_data(b"tip-b")).unwrap();
        block.add_transaction(coinbase_tx(1)).unwrap();
        block.add_transaction(spend_tx(hash_data(b"prev"))).unwrap();
        assert_eq!(block.serialized_size(), block.encode().len());
    }

    #[test]
    fn test_header_overhead_covers_prefix() {
        let mut block = Block::new(test_header());
        block.add_transaction(coinbase_tx(1)).unwrap();
        let tx_bytes: usize = block.transactions.iter().map(|t| t.serialized_size()).sum();
        assert!(block.serialized_size() - tx_bytes <= BLOCK_HEADER_OVERHEAD);
    }
}
