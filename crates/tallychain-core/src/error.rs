//! Error types for Tallychain Core.

use thiserror::Error;

use crate::crypto::Digest;

/// Errors returned by core operations.
///
/// A tampered chain is not an error: [`crate::ledger::Ledger::validate`]
/// reports it as a [`crate::ledger::ChainValidity`] value.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record holds a value the canonical encoder cannot represent.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Key material is malformed or unparseable.
    #[error("key error: {0}")]
    Key(String),

    /// Persisted data (JSON, hex) could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The ledger has no blocks. Unreachable while genesis is present.
    #[error("ledger is empty")]
    EmptyLedger,

    /// The tail already carries the largest representable index.
    #[error("block index overflow after {0}")]
    IndexOverflow(u64),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// The reason a block fails chain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainFault {
    /// The stored digest differs from the recomputed one.
    #[error("hash mismatch (stored {stored}, recomputed {recomputed})")]
    DigestMismatch { stored: Digest, recomputed: Digest },

    /// The stored previous digest differs from the predecessor's digest.
    #[error("link mismatch (expected {expected}, found {found})")]
    LinkMismatch { expected: Digest, found: Digest },

    /// The block index differs from its position in the chain.
    #[error("index mismatch (expected {expected}, found {found})")]
    IndexMismatch { expected: u64, found: u64 },

    /// Genesis does not carry the zero sentinel as its previous digest.
    #[error("genesis previous digest is not the zero sentinel")]
    GenesisSentinel,

    /// The payload can no longer be canonically encoded.
    #[error("payload not encodable: {0}")]
    Unencodable(String),

    /// A signed payload does not verify under the signer key.
    #[error("bad signature")]
    BadSignature,
}

impl ChainFault {
    /// Short label used in forensic reports.
    pub fn label(&self) -> &'static str {
        match self {
            ChainFault::DigestMismatch { .. } => "hash mismatch",
            ChainFault::LinkMismatch { .. } => "link mismatch",
            ChainFault::IndexMismatch { .. } => "index mismatch",
            ChainFault::GenesisSentinel => "genesis sentinel",
            ChainFault::Unencodable(_) => "unencodable payload",
            ChainFault::BadSignature => "bad signature",
        }
    }
}
