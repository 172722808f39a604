//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Payload of the genesis block unless configured otherwise.
pub const DEFAULT_GENESIS_PAYLOAD: &str = "Genesis Block";

/// Configuration for a [`crate::ledger::Ledger`].
///
/// Deserializes from a partial document; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Whether `append` overwrites the caller's index with the next position.
    ///
    /// When off, a wrong index is kept and reported by `validate()`.
    pub enforce_index: bool,
    /// Raw payload of the genesis block.
    pub genesis_payload: String,
    /// Genesis timestamp (Unix milliseconds). `None` stamps the current time.
    pub genesis_timestamp: Option<i64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enforce_index: true,
            genesis_payload: DEFAULT_GENESIS_PAYLOAD.to_string(),
            genesis_timestamp: None,
        }
    }
}

impl LedgerConfig {
    /// Fix the genesis timestamp, making the genesis digest reproducible.
    pub fn with_genesis_timestamp(mut self, timestamp: i64) -> Self {
        self.genesis_timestamp = Some(timestamp);
        self
    }

    /// Keep caller-supplied indices on append.
    pub fn trust_caller_index(mut self) -> Self {
        self.enforce_index = false;
        self
    }
}
