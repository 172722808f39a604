//! # Tallychain
//!
//! A tamper-evident ledger: an append-only chain of blocks where each block
//! commits to its predecessor's SHA-256 digest, and transaction records
//! carry Ed25519 signatures over their canonical encoding.
//!
//! ## Overview
//!
//! - **Records** are canonically encoded (deterministic CBOR), so field order
//!   never affects a digest or a signature.
//! - **Blocks** carry raw text, a record or a signed record.
//! - **The ledger** rewrites each appended block's link and digest; `validate`
//!   reports the first block whose digest, link or index no longer holds.
//! - **Key providers** hand out keys from memory or from PEM documents.
//!
//! ## Usage
//!
//! ```rust
//! use tallychain::{Ledger, StaticKeys, Transaction, KeyProvider};
//!
//! let keys = StaticKeys::generate();
//! let signed = Transaction::new("Alice", "Bob", 50).sign(&keys).unwrap();
//!
//! let mut ledger = Ledger::new();
//! ledger.push(signed).unwrap();
//! ledger.push("memo").unwrap();
//!
//! assert!(ledger.validate().is_valid());
//! let signer = keys.verification_key().unwrap();
//! assert!(ledger.validate_signatures(&signer).unwrap().is_valid());
//! ```
//!
//! ## Re-exports
//!
//! `tallychain::core` is the primitives crate; its main types are also
//! re-exported at the top level.

pub mod error;
pub mod keys;
pub mod shared;
pub mod transaction;

pub use tallychain_core as core;

pub use error::{LedgerError, Result};
pub use keys::{KeyProvider, PemKeys, StaticKeys};
pub use shared::SharedLedger;
pub use transaction::{verify_transaction, Transaction};

pub use tallychain_core::{
    sign_record, verify_record, Block, ChainFault, ChainValidity, CoreError, Digest, KeyPair,
    Ledger, LedgerConfig, Payload, PublicKey, Record, Signature, SignedRecord, Value,
};
