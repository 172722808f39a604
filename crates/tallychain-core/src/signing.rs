//! Signing and verification of canonical bytes.
//!
//! Every signature covers `SIGN_DOMAIN || message`. Records are first encoded
//! with [`crate::canonical::encode_record`]; signer and verifier go through
//! the same encoder, so a record re-read from storage in any field order
//! verifies against the original signature.

use tracing::trace;

use crate::crypto::{KeyPair, PublicKey, Signature};
use crate::error::Result;
use crate::record::{ensure_unreserved, Record, SignedRecord};

/// Domain separation prefix for record signatures.
pub const SIGN_DOMAIN: &[u8] = b"tallychain/record-sig/v1";

/// Build the message that is actually signed.
pub fn signing_message(message: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SIGN_DOMAIN.len() + message.len());
    msg.extend_from_slice(SIGN_DOMAIN);
    msg.extend_from_slice(message);
    msg
}

/// Sign `message` with `key`.
pub fn sign(key: &KeyPair, message: &[u8]) -> Signature {
    key.sign(&signing_message(message))
}

/// Check that `signature` was produced over `message` by the private half of
/// `key`.
///
/// A corrupted signature yields `Ok(false)`; only a malformed key is an error.
pub fn verify(key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool> {
    let ok = key.verify(&signing_message(message), signature)?;
    trace!(signer = %key, ok, "signature checked");
    Ok(ok)
}

/// Canonically encode `record` and sign it.
///
/// The record must not already carry a `signature` field: that name is taken
/// by the persisted form.
pub fn sign_record(key: &KeyPair, record: &Record) -> Result<SignedRecord> {
    ensure_unreserved(record)?;
    let bytes = record.canonical_bytes()?;
    SignedRecord::from_parts(record.clone(), sign(key, &bytes))
}

/// Verify a record signature against `key`.
pub fn verify_record(key: &PublicKey, record: &Record, signature: &Signature) -> Result<bool> {
    let bytes = record.canonical_bytes()?;
    verify(key, &bytes, signature)
}
