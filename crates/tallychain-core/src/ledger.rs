//! Ledger: an ordered, append-only chain of blocks rooted at genesis.
//!
//! The ledger is authoritative for linkage: `append` overwrites whatever
//! previous digest (and, by default, index) the caller put on the block.
//! Validity is not cached. `validate` recomputes every digest on each call,
//! so a block mutated through [`Ledger::block_mut`] is caught the next time
//! the chain is checked.

use std::fmt;

use tracing::{debug, warn};

use crate::block::{now_millis, Block, Payload};
use crate::config::LedgerConfig;
use crate::crypto::{Digest, PublicKey};
use crate::error::{ChainFault, CoreError, Result};

/// Outcome of a chain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainValidity {
    /// Every block checks out.
    Valid,
    /// The chain breaks at `index`; everything after it is untrusted.
    Invalid {
        /// Index of the first failing block.
        index: u64,
        /// Why it failed.
        fault: ChainFault,
    },
}

impl ChainValidity {
    /// Whether the chain is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainValidity::Valid)
    }

    /// Index of the first failing block, if any.
    pub fn first_failure(&self) -> Option<u64> {
        match self {
            ChainValidity::Valid => None,
            ChainValidity::Invalid { index, .. } => Some(*index),
        }
    }

    /// The fault at the first failing block, if any.
    pub fn fault(&self) -> Option<&ChainFault> {
        match self {
            ChainValidity::Valid => None,
            ChainValidity::Invalid { fault, .. } => Some(fault),
        }
    }
}

impl fmt::Display for ChainValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainValidity::Valid => write!(f, "chain valid"),
            ChainValidity::Invalid { index, fault } => write!(
                f,
                "chain invalid starting at block {index}, reason: {}",
                fault.label()
            ),
        }
    }
}

/// The hash-linked chain of blocks.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger holding only the default genesis block.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a ledger with the given configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        let timestamp = config.genesis_timestamp.unwrap_or_else(now_millis);
        let genesis = Block::genesis(config.genesis_payload.clone(), timestamp);
        debug!(digest = %genesis.digest, "ledger created");
        Self {
            chain: vec![genesis],
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The genesis block.
    pub fn genesis(&self) -> Result<&Block> {
        self.chain.first().ok_or(CoreError::EmptyLedger)
    }

    /// The last block.
    pub fn latest(&self) -> Result<&Block> {
        self.chain.last().ok_or(CoreError::EmptyLedger)
    }

    /// Index the next appended block would get.
    pub fn next_index(&self) -> Result<u64> {
        let tail = self.latest()?.index;
        tail.checked_add(1).ok_or(CoreError::IndexOverflow(tail))
    }

    /// Link `block` to the current tail and append it.
    ///
    /// Rewrites `previous_digest` to the tail's digest, renumbers the block
    /// when `enforce_index` is set, and recomputes the digest.
    pub fn append(&mut self, mut block: Block) -> Result<&Block> {
        block.previous_digest = self.latest()?.digest;
        if self.config.enforce_index {
            block.index = self.next_index()?;
        }
        block.reseal()?;

        debug!(index = block.index, digest = %block.digest, "block appended");
        self.chain.push(block);
        self.latest()
    }

    /// Build a block around `payload` with the next index and the current
    /// time, then append it.
    pub fn push(&mut self, payload: impl Into<Payload>) -> Result<&Block> {
        let block = Block::new(self.next_index()?, self.latest()?.digest, payload)?;
        self.append(block)
    }

    /// Walk the chain and report the first broken block.
    ///
    /// Checks every block, genesis included, in order: digest recomputation,
    /// link to the predecessor (zero sentinel for genesis), then position.
    pub fn validate(&self) -> ChainValidity {
        for position in 0..self.chain.len() {
            if let Some(fault) = self.check_block(position) {
                return invalid(position, fault);
            }
        }
        ChainValidity::Valid
    }

    /// Shorthand for `validate().is_valid()`.
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    /// Validate the chain and verify every signed payload against `signer`.
    ///
    /// Fails with [`CoreError::Key`] only if `signer` is malformed.
    pub fn validate_signatures(&self, signer: &PublicKey) -> Result<ChainValidity> {
        for (position, block) in self.chain.iter().enumerate() {
            if let Some(fault) = self.check_block(position) {
                return Ok(invalid(position, fault));
            }
            if let Payload::Signed(signed) = &block.payload {
                if !signed.verify(signer)? {
                    return Ok(invalid(position, ChainFault::BadSignature));
                }
            }
        }
        Ok(ChainValidity::Valid)
    }

    fn check_block(&self, position: usize) -> Option<ChainFault> {
        let block = &self.chain[position];

        match block.recompute_digest() {
            Err(e) => return Some(ChainFault::Unencodable(e.to_string())),
            Ok(recomputed) if recomputed != block.digest => {
                return Some(ChainFault::DigestMismatch {
                    stored: block.digest,
                    recomputed,
                })
            }
            Ok(_) => {}
        }

        if position == 0 {
            if block.previous_digest != Digest::ZERO {
                return Some(ChainFault::GenesisSentinel);
            }
        } else {
            let expected = self.chain[position - 1].digest;
            if block.previous_digest != expected {
                return Some(ChainFault::LinkMismatch {
                    expected,
                    found: block.previous_digest,
                });
            }
        }

        let expected = position as u64;
        if block.index != expected {
            return Some(ChainFault::IndexMismatch {
                expected,
                found: block.index,
            });
        }

        None
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false while genesis is present.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Block at `index`.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    /// Iterate blocks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.chain.iter()
    }

    /// Mutable access to a stored block.
    ///
    /// Nothing reseals the block afterwards. This is the hook for tamper
    /// drills: edit a payload here and `validate` reports the break.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.chain.get_mut(index)
    }
}

fn invalid(position: usize, fault: ChainFault) -> ChainValidity {
    warn!(index = position, fault = %fault, "chain validation failed");
    ChainValidity::Invalid {
        index: position as u64,
        fault,
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.chain {
            writeln!(f, "{block}")?;
            writeln!(f, "--------------")?;
        }
        Ok(())
    }
}
