//! Error types for the ledger facade.

use tallychain_core::CoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Error from the core primitives.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A thread panicked while holding the ledger lock.
    #[error("ledger lock poisoned")]
    LockPoisoned,

    /// A record does not have the shape of a transaction.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
