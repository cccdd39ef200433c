//! # nox-types
//!
//! Core wire types for the nox block-DAG node.
//!
//! This crate provides:
//! - 32-byte hashes and Blake2b-256 hashing helpers
//! - Transactions, outpoints and lock-time finality rules
//! - Blocks, block headers and serialized-size accounting
//! - Proof-of-Work descriptors and compact difficulty conversion
//! - Merkle roots over transaction and parent sets
//! - Minimal script building for coinbase construction

mod block;
mod error;
mod hash;
mod merkle;
mod pow;
pub mod script;
mod serialize;
mod transaction;

pub use block::{Block, BlockHeader, BLOCK_HEADER_OVERHEAD, BLOCK_HEADER_SIZE};
pub use error::{BlockError, ScriptError};
pub use hash::{hash_data, hash_nodes, Hash, HASH_SIZE};
pub use merkle::{merkle_root, parents_merkle_root};
pub use pow::{big_to_compact, compact_to_big, compact_to_u64, PowType};
pub use script::{
    anyone_can_spend_script, is_unspendable, standard_coinbase_opreturn, standard_coinbase_script,
    Address, ScriptBuilder,
};
pub use serialize::{var_int_size, write_var_int, MAX_VAR_INT_SIZE};
pub use transaction::{
    OutPoint, Transaction, TxInput, TxOutput, LOCK_TIME_THRESHOLD, MAX_TX_IN_SEQUENCE_NUM,
};

/// Amount in base units.
pub type Amount = u64;

/// Base units per coin.
pub const COIN: Amount = 100_000_000;

/// Upper sanity bound on any single amount.
pub const MAX_AMOUNT: Amount = 21_000_000 * COIN;
