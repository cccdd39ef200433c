//! Error types for chain-side validation.

use nox_types::PowType;
use thiserror::Error;

/// Errors surfaced across the consensus seam.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Referenced output is missing from the view.
    #[error("missing input for tx {tx_id}: outpoint {outpoint} not found")]
    MissingInput { tx_id: String, outpoint: String },

    /// Referenced output is already spent in the view.
    #[error("double spend: outpoint {0} already spent")]
    DoubleSpend(String),

    /// Coinbase output spent before maturity.
    #[error("immature coinbase spend of {outpoint}: {blocks_left} blocks until maturity")]
    ImmatureSpend { outpoint: String, blocks_left: u64 },

    /// Output values overflow the amount range.
    #[error("output value overflow in tx {0}")]
    ValueOverflow(String),

    /// Inputs do not cover outputs.
    #[error("inputs {input_sum} below outputs {output_sum} for tx {tx_id}")]
    Overspend {
        tx_id: String,
        input_sum: u64,
        output_sum: u64,
    },

    /// Script verification failed.
    #[error("script verification failed for tx {tx_id}: {reason}")]
    ScriptVerification { tx_id: String, reason: String },

    /// Difficulty oracle could not answer for an algorithm.
    #[error("difficulty unavailable for {pow:?}: {reason}")]
    Difficulty { pow: PowType, reason: String },

    /// The consensus engine rejected the assembled block.
    #[error("connect check rejected block: {0}")]
    ConnectCheck(String),

    /// The UTXO store could not produce a view for a transaction.
    #[error("utxo view unavailable for tx {tx_id}: {reason}")]
    UtxoView { tx_id: String, reason: String },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
