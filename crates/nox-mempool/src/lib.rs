//! # nox-mempool
//!
//! Candidate transaction source for block assembly.
//!
//! This crate provides:
//! - The `TxSource` trait the template builder pulls candidates from
//! - Mining descriptors carrying cached fee metadata
//! - The legacy priority formula (value × age / adjusted size)
//! - An in-memory pool with double-spend detection

mod desc;
mod error;
mod pool;
mod priority;

pub use desc::{TxDesc, TxSource};
pub use error::{MempoolError, MempoolResult};
pub use pool::Mempool;
pub use priority::{calc_fee_per_kb, calc_priority};
