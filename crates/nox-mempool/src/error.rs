//! Mempool error types.

use thiserror::Error;

/// Mempool errors.
#[derive(Error, Debug)]
pub enum MempoolError {
    /// Transaction already present.
    #[error("transaction {0} already in pool")]
    AlreadyExists(String),

    /// Transaction not present.
    #[error("transaction {0} not in pool")]
    NotFound(String),

    /// An input is already spent by a pooled transaction.
    #[error("double spend of {0} by pooled transaction")]
    DoubleSpend(String),

    /// Transaction spends its own output.
    #[error("transaction {0} spends its own output")]
    DependencyCycle(String),
}

/// Result type for mempool operations.
pub type MempoolResult<T> = Result<T, MempoolError>;
