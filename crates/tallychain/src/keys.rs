//! Key providers.
//!
//! Code that signs or verifies asks a [`KeyProvider`] for key material
//! instead of holding keys directly, so in-memory keys and PEM documents are
//! interchangeable.

use tallychain_core::{KeyPair, PublicKey};

use crate::error::Result;

/// Source of signing and verification keys.
pub trait KeyProvider {
    /// The private key used for signing.
    fn signing_key(&self) -> Result<KeyPair>;

    /// The public key used for verification.
    fn verification_key(&self) -> Result<PublicKey>;
}

/// Keys held in memory.
#[derive(Debug, Clone)]
pub struct StaticKeys {
    keypair: KeyPair,
}

impl StaticKeys {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self::new(KeyPair::generate())
    }
}

impl KeyProvider for StaticKeys {
    fn signing_key(&self) -> Result<KeyPair> {
        Ok(self.keypair.clone())
    }

    fn verification_key(&self) -> Result<PublicKey> {
        Ok(self.keypair.public_key())
    }
}

/// Keys stored as PEM text: a PKCS#8 private key and/or an SPKI public key.
///
/// Parsing happens on each request; malformed PEM surfaces as a key error
/// then, not at construction.
#[derive(Debug, Clone, Default)]
pub struct PemKeys {
    private_pem: Option<String>,
    public_pem: Option<String>,
}

impl PemKeys {
    /// Both halves.
    pub fn new(private_pem: impl Into<String>, public_pem: impl Into<String>) -> Self {
        Self {
            private_pem: Some(private_pem.into()),
            public_pem: Some(public_pem.into()),
        }
    }

    /// Only the private half; the public key is derived from it.
    pub fn from_private(private_pem: impl Into<String>) -> Self {
        Self {
            private_pem: Some(private_pem.into()),
            public_pem: None,
        }
    }

    /// Only the public half. Such a provider can verify but not sign.
    pub fn from_public(public_pem: impl Into<String>) -> Self {
        Self {
            private_pem: None,
            public_pem: Some(public_pem.into()),
        }
    }

    /// Export a key pair as PEM text.
    pub fn export(keypair: &KeyPair) -> Result<Self> {
        Ok(Self::new(
            keypair.to_pkcs8_pem()?,
            keypair.public_key().to_pem()?,
        ))
    }

    pub fn private_pem(&self) -> Option<&str> {
        self.private_pem.as_deref()
    }

    pub fn public_pem(&self) -> Option<&str> {
        self.public_pem.as_deref()
    }
}

impl KeyProvider for PemKeys {
    fn signing_key(&self) -> Result<KeyPair> {
        let pem = self
            .private_pem
            .as_deref()
            .ok_or_else(|| missing("no private key configured"))?;
        Ok(KeyPair::from_pkcs8_pem(pem)?)
    }

    fn verification_key(&self) -> Result<PublicKey> {
        match (&self.public_pem, &self.private_pem) {
            (Some(public), _) => Ok(PublicKey::from_pem(public)?),
            (None, Some(_)) => Ok(self.signing_key()?.public_key()),
            (None, None) => Err(missing("no key configured")),
        }
    }
}

fn missing(msg: &str) -> crate::error::LedgerError {
    tallychain_core::CoreError::Key(msg.into()).into()
}
