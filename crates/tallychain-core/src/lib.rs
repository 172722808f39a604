//! # Tallychain Core
//!
//! Pure primitives for a tamper-evident ledger: records, blocks, canonical
//! encoding, signatures, and the hash-linked chain itself.
//!
//! This crate does no I/O beyond reading the clock when a block is stamped.
//!
//! ## Key Types
//!
//! - [`Record`] - An ordered set of named fields (e.g. a transaction)
//! - [`SignedRecord`] - A record bound to an Ed25519 signature
//! - [`Block`] - Index, previous digest, payload, timestamp, and digest
//! - [`Ledger`] - The append-only chain rooted at genesis
//!
//! ## Canonicalization
//!
//! Records and blocks are hashed and signed over deterministic CBOR. See
//! the [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod record;
pub mod signing;

pub use block::{Block, Payload};
pub use canonical::{encode_block, encode_canonical, encode_record};
pub use config::{LedgerConfig, DEFAULT_GENESIS_PAYLOAD};
pub use crypto::{Digest, KeyPair, PublicKey, Signature};
pub use error::{ChainFault, CoreError, Result};
pub use ledger::{ChainValidity, Ledger};
pub use record::{Record, SignedRecord, SIGNATURE_FIELD};
pub use signing::{sign, sign_record, signing_message, verify, verify_record, SIGN_DOMAIN};

/// Re-exported so callers can build record values without naming ciborium.
pub use ciborium::value::Value;
