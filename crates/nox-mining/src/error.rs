//! Mining error types.

use nox_chain::ChainError;
use nox_types::{BlockError, PowType, ScriptError};
use thiserror::Error;

/// Errors that abort a template assembly invocation.
///
/// Per-transaction failures never surface here; candidates that fail a
/// check are skipped and logged at trace level.
#[derive(Error, Debug)]
pub enum MiningError {
    /// Coinbase could not be constructed.
    #[error("failed to create coinbase: {0}")]
    CreatingCoinbase(#[from] ScriptError),

    /// A per-algorithm difficulty query failed.
    #[error("failed to get difficulty for {pow:?}: {reason}")]
    GettingDifficulty { pow: PowType, reason: String },

    /// A block-level append refused a transaction that had passed
    /// selection-time checks. Indicates consensus invariant drift.
    #[error("failed to append transaction: {0}")]
    TransactionAppend(#[source] BlockError),

    /// A parent reference could not be attached to the block.
    #[error("failed to attach parent: {0}")]
    ParentAppend(#[source] BlockError),

    /// The consensus engine rejected the assembled template.
    #[error("final connect check failed for new block template: {0}")]
    CheckConnectBlock(#[source] ChainError),
}

/// Result type for mining operations.
pub type MiningResult<T> = Result<T, MiningError>;
