//! # nox-chain
//!
//! The consensus-engine side of the block-assembly seam.
//!
//! This crate provides:
//! - The layered UTXO view used while a block is under construction
//! - The `ChainEngine` trait through which assembly consumes the
//!   consensus engine, the DAG and the difficulty oracle
//! - Signature-operation counting and the per-block cap
//! - The subsidy schedule indexed by the DAG blue count
//! - Chain parameters and script verification flags
//! - The shared signature-verification cache handle

mod error;
mod params;
mod sig_cache;
mod sigops;
mod subsidy;
mod traits;
mod utxo_view;

pub use error::{ChainError, ChainResult};
pub use params::{ChainParams, Network};
pub use sig_cache::SigCache;
pub use sigops::{count_sig_ops, MAX_SIGOPS_PER_BLOCK};
pub use subsidy::{SubsidyCache, SubsidyParams};
pub use traits::{
    BestSnapshot, ChainEngine, GraphState, MainParent, MedianTimeSource, VerifyFlags,
};
pub use utxo_view::{UtxoEntry, UtxoView};
