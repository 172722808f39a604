//! A ledger shared between threads.
//!
//! Appends take the write lock for the whole link-and-seal step, so two
//! concurrent appends can never link to the same tail. Validation takes the
//! read lock and runs alongside other readers.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tallychain_core::{Block, ChainValidity, Ledger, LedgerConfig, Payload, PublicKey};

use crate::error::{LedgerError, Result};

/// Cloneable handle to a lock-guarded [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    /// A new ledger holding only genesis.
    pub fn new() -> Self {
        Self::from_ledger(Ledger::new())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::from_ledger(Ledger::with_config(config))
    }

    /// Wrap an existing ledger.
    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Link `block` to the tail and append it. Returns the stored block.
    pub fn append(&self, block: Block) -> Result<Block> {
        let mut ledger = self.write()?;
        Ok(ledger.append(block)?.clone())
    }

    /// Append a new block carrying `payload`. Returns the stored block.
    pub fn push(&self, payload: impl Into<Payload>) -> Result<Block> {
        let mut ledger = self.write()?;
        Ok(ledger.push(payload)?.clone())
    }

    pub fn validate(&self) -> Result<ChainValidity> {
        Ok(self.read()?.validate())
    }

    pub fn validate_signatures(&self, signer: &PublicKey) -> Result<ChainValidity> {
        Ok(self.read()?.validate_signatures(signer)?)
    }

    pub fn latest(&self) -> Result<Block> {
        Ok(self.read()?.latest()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Copy of every block, in order.
    pub fn snapshot(&self) -> Result<Vec<Block>> {
        Ok(self.read()?.blocks().to_vec())
    }

    /// Run `f` with shared access to the ledger.
    pub fn read_with<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T> {
        Ok(f(&*self.read()?))
    }

    /// Run `f` with exclusive access to the ledger.
    ///
    /// Changes made here bypass `append`; anything that edits stored blocks
    /// is visible to the next `validate`.
    pub fn write_with<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> Result<T> {
        Ok(f(&mut *self.write()?))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::from_ledger(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_appends_stay_linked() {
        let shared = SharedLedger::new();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared.push(format!("thread {t} tx {i}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len().unwrap(), 1 + 8 * 25);
        assert!(shared.validate().unwrap().is_valid());
    }

    #[test]
    fn test_readers_run_alongside_writer() {
        let shared = SharedLedger::new();
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    shared.push(format!("tx{i}")).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert!(shared.validate().unwrap().is_valid());
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.len().unwrap(), 51);
    }

    #[test]
    fn test_poisoned_lock_is_an_error() {
        let shared = SharedLedger::new();
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            poisoner
                .write_with(|_| panic!("poison the ledger lock"))
                .ok();
        })
        .join();

        assert!(matches!(shared.validate(), Err(LedgerError::LockPoisoned)));
        assert!(matches!(shared.push("tx"), Err(LedgerError::LockPoisoned)));
    }

    #[test]
    fn test_read_access_and_snapshot() {
        let shared = SharedLedger::with_config(LedgerConfig::default().with_genesis_timestamp(0));
        shared.push("tx1").unwrap();

        let (len, enforce_index) = shared
            .read_with(|ledger| (ledger.len(), ledger.config().enforce_index))
            .unwrap();
        assert_eq!(len, 2);
        assert!(enforce_index);

        let blocks = shared.snapshot().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].timestamp, 0);
        assert_eq!(blocks[1], shared.latest().unwrap());

        // A snapshot is a copy; later appends do not show up in it.
        shared.push("tx2").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(shared.len().unwrap(), 3);
    }

    #[test]
    fn test_tamper_through_write_access() {
        let shared = SharedLedger::new();
        shared.push("tx1").unwrap();
        shared.push("tx2").unwrap();

        shared
            .write_with(|ledger| {
                if let Some(block) = ledger.block_mut(1) {
                    block.payload = Payload::Raw("tampered".into());
                }
            })
            .unwrap();

        assert_eq!(shared.validate().unwrap().first_failure(), Some(1));
    }
}
