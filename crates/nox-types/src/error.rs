//! Error types for wire-type construction.

use thiserror::Error;

/// Script building errors.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The assembled script would exceed the maximum script size.
    #[error("script of {size} bytes exceeds maximum of {max}")]
    ScriptTooLarge { size: usize, max: usize },

    /// A single pushed element would exceed the maximum element size.
    #[error("data element of {size} bytes exceeds maximum of {max}")]
    ElementTooLarge { size: usize, max: usize },
}

/// Block construction errors.
#[derive(Error, Debug)]
pub enum BlockError {
    /// Parent already attached to the block.
    #[error("duplicate parent {0}")]
    DuplicateParent(String),

    /// Transaction already present in the block.
    #[error("duplicate transaction {0}")]
    DuplicateTransaction(String),

    /// A coinbase transaction may only appear at index 0.
    #[error("coinbase transaction {0} not at index 0")]
    MisplacedCoinbase(String),
}
