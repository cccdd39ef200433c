//! # nox-mining
//!
//! Block-template assembly for the nox block-DAG node.
//!
//! This crate provides:
//! - The selection engine choosing transactions under size, sig-op and
//!   fee policy caps, in dependency order
//! - The weighted priority queue with its priority-first and fee-first
//!   ordering modes
//! - Coinbase construction with subsidy and commitment outputs
//! - Template assembly: Merkle commitments, per-algorithm difficulty
//!   targets and the consensus connect-check handshake
//! - The node-wide one-slot template cache

mod builder;
mod cache;
mod coinbase;
mod error;
mod policy;
mod template;
mod weighted_queue;

pub use builder::{median_adjusted_time, update_block_time, TemplateBuilder};
pub use cache::TemplateCache;
pub use coinbase::{create_coinbase_tx, fill_witness_commitment};
pub use error::{MiningError, MiningResult};
pub use policy::Policy;
pub use template::{BlockTemplate, PowDiffStandard};
pub use weighted_queue::{CandIdx, SortMode, TxCandidate, WeightedTxQueue};
