//! Block: the atomic unit of the ledger.
//!
//! A block commits to its index, its predecessor's digest, its payload and its
//! timestamp through a SHA-256 digest over their canonical encoding.

use std::fmt;

use crate::canonical::{encode_block, encode_raw_block};
use crate::crypto::Digest;
use crate::error::Result;
use crate::record::{Record, SignedRecord};

/// What a block carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque text.
    Raw(String),
    /// An unsigned record.
    Record(Record),
    /// A signed record (typically a transaction).
    Signed(SignedRecord),
}

impl Payload {
    /// The signed record, if this payload carries one.
    pub fn as_signed(&self) -> Option<&SignedRecord> {
        match self {
            Payload::Signed(signed) => Some(signed),
            _ => None,
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Raw(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Raw(s)
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Payload::Record(record)
    }
}

impl From<SignedRecord> for Payload {
    fn from(signed: SignedRecord) -> Self {
        Payload::Signed(signed)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = match self {
            Payload::Raw(text) => return f.write_str(text),
            Payload::Record(record) => record.to_json(),
            Payload::Signed(signed) => signed.to_json(),
        };
        match json {
            Ok(json) => write!(f, "{json}"),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// A ledger block.
///
/// All fields are public. In particular `payload` can be overwritten after
/// the digest was computed, leaving the block unsealed; that is exactly what
/// [`crate::ledger::Ledger::validate`] detects.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Position in the ledger (genesis is 0).
    pub index: u64,
    /// Digest of the preceding block, [`Digest::ZERO`] for genesis.
    pub previous_digest: Digest,
    /// The block content.
    pub payload: Payload,
    /// Creation time, Unix milliseconds.
    pub timestamp: i64,
    /// Digest over (index, previous_digest, payload, timestamp).
    pub digest: Digest,
}

impl Block {
    /// Create a block stamped with the current time.
    pub fn new(index: u64, previous_digest: Digest, payload: impl Into<Payload>) -> Result<Self> {
        Self::with_timestamp(index, previous_digest, payload, now_millis())
    }

    /// Create a block with an explicit timestamp.
    pub fn with_timestamp(
        index: u64,
        previous_digest: Digest,
        payload: impl Into<Payload>,
        timestamp: i64,
    ) -> Result<Self> {
        let mut block = Self {
            index,
            previous_digest,
            payload: payload.into(),
            timestamp,
            digest: Digest::ZERO,
        };
        block.digest = block.recompute_digest()?;
        Ok(block)
    }

    /// Create a genesis block: index 0, zero sentinel, raw payload.
    pub fn genesis(payload: impl Into<String>, timestamp: i64) -> Self {
        let text = payload.into();
        let digest = Digest::of(&encode_raw_block(0, &Digest::ZERO, &text, timestamp));
        Self {
            index: 0,
            previous_digest: Digest::ZERO,
            payload: Payload::Raw(text),
            timestamp,
            digest,
        }
    }

    /// Canonical bytes the digest is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        encode_block(self.index, &self.previous_digest, &self.payload, self.timestamp)
    }

    /// Recompute the digest from the current field values. Pure.
    pub fn recompute_digest(&self) -> Result<Digest> {
        Ok(Digest::of(&self.canonical_bytes()?))
    }

    /// Recompute and store the digest.
    pub fn reseal(&mut self) -> Result<()> {
        self.digest = self.recompute_digest()?;
        Ok(())
    }

    /// Whether the stored digest matches the content.
    pub fn is_sealed(&self) -> bool {
        matches!(self.recompute_digest(), Ok(d) if d == self.digest)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block #{}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Data: {}", self.payload)?;
        writeln!(f, "Hash: {}", self.digest.to_hex())?;
        write!(f, "Previous Hash: {}", self.previous_digest.to_hex())
    }
}

/// Current time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    // A clock before the epoch stamps 0 rather than failing block creation.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::signing::sign_record;

    #[test]
    fn test_digest_computed_at_construction() {
        let block = Block::with_timestamp(1, Digest::ZERO, "tx1", 1_700_000_000_000).unwrap();
        assert_eq!(block.digest, block.recompute_digest().unwrap());
        assert!(block.is_sealed());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let block = Block::new(3, Digest::of(b"prev"), "tx").unwrap();
        let d1 = block.recompute_digest().unwrap();
        let d2 = block.recompute_digest().unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_every_field_is_committed() {
        let base = Block::with_timestamp(1, Digest::ZERO, "tx", 1000).unwrap();

        let other_index = Block::with_timestamp(2, Digest::ZERO, "tx", 1000).unwrap();
        let other_prev = Block::with_timestamp(1, Digest::of(b"x"), "tx", 1000).unwrap();
        let other_payload = Block::with_timestamp(1, Digest::ZERO, "tx'", 1000).unwrap();
        let other_time = Block::with_timestamp(1, Digest::ZERO, "tx", 1001).unwrap();

        for other in [other_index, other_prev, other_payload, other_time] {
            assert_ne!(base.digest, other.digest);
        }
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis("Genesis Block", 0);
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_digest, Digest::ZERO);
        assert!(genesis.is_sealed());
    }

    #[test]
    fn test_payload_mutation_unseals() {
        let mut block = Block::with_timestamp(1, Digest::ZERO, "tx1", 1000).unwrap();
        block.payload = Payload::Raw("tampered".into());
        assert!(!block.is_sealed());

        block.reseal().unwrap();
        assert!(block.is_sealed());
    }

    #[test]
    fn test_signed_payload_block() {
        let keypair = KeyPair::from_seed(&[0x09; 32]);
        let record = Record::new().with("sender", "Alice").with("amount", 50);
        let signed = sign_record(&keypair, &record).unwrap();

        let block = Block::with_timestamp(1, Digest::ZERO, signed.clone(), 1000).unwrap();
        assert_eq!(block.payload.as_signed(), Some(&signed));
        assert!(block.is_sealed());
    }

    #[test]
    fn test_unencodable_payload_rejected() {
        let record = Record::new().with("amount", 1.5);
        assert!(Block::new(1, Digest::ZERO, record).is_err());
    }

    #[test]
    fn test_display_lists_fields() {
        let block = Block::with_timestamp(1, Digest::ZERO, "tx1", 42).unwrap();
        let text = block.to_string();
        assert!(text.starts_with("Block #1\n"));
        assert!(text.contains("Data: tx1"));
        assert!(text.contains(&format!("Hash: {}", block.digest.to_hex())));
    }
}
