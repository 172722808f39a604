//! Typed transactions.
//!
//! A transaction is a record with exactly three fields: `sender`,
//! `recipient` and an unsigned integer `amount`. Signing goes through the
//! generic record path, so a signed transaction is an ordinary
//! [`SignedRecord`] and persists as `{sender, recipient, amount, signature}`.

use serde::{Deserialize, Serialize};
use tallychain_core::{sign_record, Record, SignedRecord};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::keys::KeyProvider;

/// A transfer of `amount` from `sender` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The record view of this transaction.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("sender", self.sender.as_str())
            .with("recipient", self.recipient.as_str())
            .with("amount", self.amount)
    }

    /// Read a transaction back out of a record.
    pub fn from_record(record: &Record) -> Result<Self> {
        let json = record.to_json()?;
        serde_json::from_value(json).map_err(|e| LedgerError::InvalidTransaction(e.to_string()))
    }

    /// Sign with the provider's signing key.
    pub fn sign(&self, keys: &impl KeyProvider) -> Result<SignedRecord> {
        let keypair = keys.signing_key()?;
        let signed = sign_record(&keypair, &self.to_record())?;
        debug!(
            sender = %self.sender,
            recipient = %self.recipient,
            amount = self.amount,
            "transaction signed"
        );
        Ok(signed)
    }
}

impl From<Transaction> for Record {
    fn from(tx: Transaction) -> Self {
        tx.to_record()
    }
}

impl TryFrom<&Record> for Transaction {
    type Error = LedgerError;

    fn try_from(record: &Record) -> Result<Self> {
        Self::from_record(record)
    }
}

/// Verify a signed transaction with the provider's verification key.
pub fn verify_transaction(signed: &SignedRecord, keys: &impl KeyProvider) -> Result<bool> {
    Ok(signed.verify(&keys.verification_key()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::StaticKeys;
    use tallychain_core::KeyPair;

    fn keys() -> StaticKeys {
        StaticKeys::new(KeyPair::from_seed(&[0x01; 32]))
    }

    #[test]
    fn test_record_roundtrip() {
        let tx = Transaction::new("Alice", "Bob", 50);
        let record = tx.to_record();
        assert_eq!(record.len(), 3);
        assert_eq!(Transaction::from_record(&record).unwrap(), tx);
    }

    #[test]
    fn test_sign_and_verify() {
        let keys = keys();
        let signed = Transaction::new("Alice", "Bob", 50).sign(&keys).unwrap();
        assert!(verify_transaction(&signed, &keys).unwrap());

        let other = StaticKeys::new(KeyPair::from_seed(&[0x02; 32]));
        assert!(!verify_transaction(&signed, &other).unwrap());
    }

    #[test]
    fn test_persisted_form() {
        let signed = Transaction::new("Alice", "Bob", 50).sign(&keys()).unwrap();
        let json = signed.to_json().unwrap();

        assert_eq!(json["sender"], "Alice");
        assert_eq!(json["recipient"], "Bob");
        assert_eq!(json["amount"], 50);
        assert_eq!(json["signature"], signed.signature().to_hex());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let record = Record::new()
            .with("sender", "Alice")
            .with("recipient", "Bob")
            .with("amount", -5);
        assert!(matches!(
            Transaction::from_record(&record),
            Err(LedgerError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_missing_and_extra_fields_rejected() {
        let missing = Record::new().with("sender", "Alice").with("amount", 5);
        assert!(Transaction::from_record(&missing).is_err());

        let extra = Transaction::new("Alice", "Bob", 5).to_record().with("memo", "rent");
        assert!(Transaction::from_record(&extra).is_err());
    }
}
