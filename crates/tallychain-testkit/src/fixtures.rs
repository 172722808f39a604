//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use tallychain::{StaticKeys, Transaction};
use tallychain_core::{
    sign_record, Block, KeyPair, Ledger, LedgerConfig, Payload, PublicKey, Result, SignedRecord,
};

/// Genesis timestamp used by fixtures, so genesis digests are reproducible.
pub const GENESIS_TIMESTAMP: i64 = 0;

/// Timestamp stamped on blocks appended through [`TestFixture::append_at`].
pub const BLOCK_TIMESTAMP: i64 = 1_700_000_000_000;

/// A test fixture with a keypair and a ledger rooted at a fixed genesis.
pub struct TestFixture {
    pub keypair: KeyPair,
    pub ledger: Ledger,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(KeyPair::generate(), LedgerConfig::default())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair(KeyPair::from_seed(&seed), LedgerConfig::default())
    }

    /// Create with a deterministic keypair and a custom configuration.
    ///
    /// The genesis timestamp is pinned to [`GENESIS_TIMESTAMP`] unless the
    /// configuration already fixes one.
    pub fn with_config(seed: [u8; 32], config: LedgerConfig) -> Self {
        Self::from_keypair(KeyPair::from_seed(&seed), config)
    }

    fn from_keypair(keypair: KeyPair, mut config: LedgerConfig) -> Self {
        config.genesis_timestamp.get_or_insert(GENESIS_TIMESTAMP);
        Self {
            keypair,
            ledger: Ledger::with_config(config),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The keypair as a key provider.
    pub fn keys(&self) -> StaticKeys {
        StaticKeys::new(self.keypair.clone())
    }

    /// Sign a transfer with the fixture key.
    pub fn signed_transfer(&self, sender: &str, recipient: &str, amount: u64) -> Result<SignedRecord> {
        sign_record(&self.keypair, &Transaction::new(sender, recipient, amount).to_record())
    }

    /// Append `payload` stamped with [`BLOCK_TIMESTAMP`].
    pub fn append_at(&mut self, payload: impl Into<Payload>) -> Result<&Block> {
        let index = self.ledger.next_index()?;
        let previous = self.ledger.latest()?.digest;
        let block = Block::with_timestamp(index, previous, payload, BLOCK_TIMESTAMP)?;
        self.ledger.append(block)
    }

    /// Overwrite the payload of a stored block without resealing it.
    ///
    /// Returns false if there is no block at `index`.
    pub fn tamper(&mut self, index: usize, payload: impl Into<Payload>) -> bool {
        match self.ledger.block_mut(index) {
            Some(block) => {
                block.payload = payload.into();
                true
            }
            None => false,
        }
    }

    /// The classic scenario: append `"tx1"` and `"tx2"`, then rewrite
    /// block 1 to `"tampered"`.
    pub fn tamper_scenario() -> Result<Self> {
        let mut fixture = Self::with_seed([0x01; 32]);
        fixture.append_at("tx1")?;
        fixture.append_at("tx2")?;
        fixture.tamper(1, "tampered");
        Ok(fixture)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}
