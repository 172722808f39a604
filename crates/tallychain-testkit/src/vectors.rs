//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding, the block digest and the
//! Ed25519 signature for fixed inputs. Any change here invalidates every
//! existing chain and persisted signature.

use tallychain_core::{
    encode_record, sign_record, Block, CoreError, Digest, KeyPair, Payload, Record, Result,
};

/// Seed of the signing key used by every vector.
pub const SIGNER_SEED: [u8; 32] = [0x01; 32];

/// Timestamp of the non-genesis vector blocks.
pub const BLOCK_TIMESTAMP: i64 = 1_700_000_000_000;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Expected output (hex).
    pub expected: &'static str,
    /// Computes the actual output (hex).
    pub compute: fn() -> Result<String>,
}

/// The Alice to Bob transfer of 50.
pub fn transfer_record() -> Record {
    Record::new()
        .with("sender", "Alice")
        .with("recipient", "Bob")
        .with("amount", 50)
}

fn genesis() -> Block {
    Block::genesis("Genesis Block", 0)
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "signer public key",
            expected: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            compute: || Ok(KeyPair::from_seed(&SIGNER_SEED).public_key().to_hex()),
        },
        GoldenVector {
            name: "transfer record canonical bytes",
            expected: "a366616d6f756e7418326673656e64657265416c69636569726563697069656e7463426f62",
            compute: || Ok(hex::encode(encode_record(&transfer_record())?)),
        },
        GoldenVector {
            name: "transfer record digest",
            expected: "b3e432c50051f73c5419cc3d242051b50213fb3be9d3e11e055e523cfc8de9f0",
            compute: || Ok(transfer_record().digest()?.to_hex()),
        },
        GoldenVector {
            name: "transfer record signature",
            expected: "766b1346d315be4696b3b702975847c406ce99c6a38bc83e54a3993d8d74f3a6\
                       c3c799ec88cce7ed2a1d974db46dea25ddc12c181d337edf710903996d96b200",
            compute: || {
                let signed = sign_record(&KeyPair::from_seed(&SIGNER_SEED), &transfer_record())?;
                Ok(signed.signature().to_hex())
            },
        },
        GoldenVector {
            name: "genesis canonical bytes",
            expected: "a465696e64657800677061796c6f616482006d47656e6573697320426c6f636b\
                       6870726576696f75735820000000000000000000000000000000000000000000\
                       00000000000000000000006974696d657374616d7000",
            compute: || Ok(hex::encode(genesis().canonical_bytes()?)),
        },
        GoldenVector {
            name: "genesis digest",
            expected: "49dfcbe3d50ecdd75bd7d1dcdcc7f7d2b9b1787e1c94ada82789bc87dde8ec81",
            compute: || Ok(genesis().digest.to_hex()),
        },
        GoldenVector {
            name: "raw block digest",
            expected: "460cb8ecb5e458f075ffcaf79958d1d587a55b11bc9d85cbc77872e5d1558f1b",
            compute: || {
                let block = Block::with_timestamp(1, genesis().digest, "tx1", BLOCK_TIMESTAMP)?;
                Ok(block.digest.to_hex())
            },
        },
        GoldenVector {
            name: "signed block digest",
            expected: "f4873f44a148943c39a9255a9373d7bede30a4cc71c8f8e7b049c2b91d0a2c66",
            compute: || {
                let signed = sign_record(&KeyPair::from_seed(&SIGNER_SEED), &transfer_record())?;
                let block = Block::with_timestamp(
                    1,
                    genesis().digest,
                    Payload::Signed(signed),
                    BLOCK_TIMESTAMP,
                )?;
                Ok(block.digest.to_hex())
            },
        },
    ]
}

/// Run every vector. Returns the first mismatch as an error.
pub fn verify_all_vectors() -> Result<()> {
    for vector in all_vectors() {
        let actual = (vector.compute)()?;
        if actual != vector.expected {
            return Err(CoreError::Encoding(format!(
                "golden vector `{}` mismatch: expected {}, got {}",
                vector.name, vector.expected, actual
            )));
        }
    }
    Ok(())
}

/// Parse an expected digest.
pub fn expected_digest(vector: &GoldenVector) -> Result<Digest> {
    Digest::from_hex(vector.expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for vector in all_vectors() {
            assert_eq!(
                (vector.compute)().unwrap(),
                vector.expected,
                "vector '{}'",
                vector.name
            );
        }
        verify_all_vectors().unwrap();
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            assert_eq!((vector.compute)().unwrap(), (vector.compute)().unwrap());
        }
    }

    #[test]
    fn test_digest_vectors_parse() {
        for vector in all_vectors().iter().filter(|v| v.name.ends_with("digest")) {
            assert_eq!(expected_digest(vector).unwrap().to_hex(), vector.expected);
        }
    }
}
