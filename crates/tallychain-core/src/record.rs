//! Records: the structured payloads carried by blocks.
//!
//! A [`Record`] is an ordered set of named fields. Field order is kept for
//! display and JSON output only; equality, digests and signatures ignore it.
//! A [`SignedRecord`] pairs a record with the Ed25519 signature over its
//! canonical bytes.

use ciborium::value::Value;
use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::canonical::encode_record;
use crate::crypto::{Digest, PublicKey, Signature};
use crate::error::{CoreError, Result};
use crate::signing;

/// Name of the field that carries the hex signature in persisted records.
pub const SIGNATURE_FIELD: &str = "signature";

/// A mapping from field name to value.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, returning the previous value if the field existed.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Remove a field.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Check whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The record as a CBOR map with text keys.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.fields
                .iter()
                .map(|(n, v)| (Value::Text(n.clone()), v.clone()))
                .collect(),
        )
    }

    /// Canonical bytes of the record.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        encode_record(self)
    }

    /// SHA-256 of the canonical bytes.
    pub fn digest(&self) -> Result<Digest> {
        Ok(Digest::of(&self.canonical_bytes()?))
    }

    /// Build a record from a JSON object.
    pub fn from_json(json: &Json) -> Result<Self> {
        let Json::Object(map) = json else {
            return Err(CoreError::Decoding("record must be a JSON object".into()));
        };
        let mut record = Record::new();
        for (name, value) in map {
            record.insert(name.clone(), json_to_value(value));
        }
        Ok(record)
    }

    /// Parse a record from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let json: Json = serde_json::from_str(s).map_err(|e| CoreError::Decoding(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Render the record as a JSON object.
    ///
    /// Fails with [`CoreError::Encoding`] for values JSON cannot carry
    /// (byte strings, tags, non-text map keys, non-finite floats).
    pub fn to_json(&self) -> Result<Json> {
        let mut map = JsonMap::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value_to_json(value)?);
        }
        Ok(Json::Object(map))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// A record together with the signature over its canonical bytes.
///
/// Immutable: re-signing produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRecord {
    record: Record,
    signature: Signature,
}

impl SignedRecord {
    /// Pair a record with an existing signature (e.g. read from storage).
    ///
    /// Nothing is verified here; call [`SignedRecord::verify`]. A record that
    /// already carries a `signature` field is rejected, since the persisted
    /// form would overwrite it.
    pub fn from_parts(record: Record, signature: Signature) -> Result<Self> {
        ensure_unreserved(&record)?;
        Ok(Self { record, signature })
    }

    /// The signed record, without the signature.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Verify the signature against `signer`.
    pub fn verify(&self, signer: &PublicKey) -> Result<bool> {
        signing::verify_record(signer, &self.record, &self.signature)
    }

    /// Persisted form: the record's fields plus `signature` as hex.
    pub fn to_json(&self) -> Result<Json> {
        let mut json = self.record.to_json()?;
        if let Json::Object(map) = &mut json {
            map.insert(SIGNATURE_FIELD.into(), Json::String(self.signature.to_hex()));
        }
        Ok(json)
    }

    /// Pretty-printed persisted form.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json()?).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// Read the persisted form. The `signature` field is split off; every
    /// other field becomes the record.
    pub fn from_json(json: &Json) -> Result<Self> {
        let mut record = Record::from_json(json)?;
        let signature = match record.remove(SIGNATURE_FIELD) {
            Some(Value::Text(hex)) => Signature::from_hex(&hex)?,
            Some(_) => return Err(CoreError::Decoding("signature must be a hex string".into())),
            None => return Err(CoreError::Decoding("missing signature field".into())),
        };
        Ok(Self { record, signature })
    }

    /// Parse the persisted form from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let json: Json = serde_json::from_str(s).map_err(|e| CoreError::Decoding(e.to_string()))?;
        Self::from_json(&json)
    }
}

/// Reject records that use the reserved signature field name.
pub(crate) fn ensure_unreserved(record: &Record) -> Result<()> {
    if record.contains(SIGNATURE_FIELD) {
        return Err(CoreError::Encoding(format!(
            "field `{SIGNATURE_FIELD}` is reserved for the record signature"
        )));
    }
    Ok(())
}

fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else {
                // Left for the encoder to reject.
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(arr) => Value::Array(arr.iter().map(json_to_value).collect()),
        Json::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::Text(k.clone()), json_to_value(v)))
                .collect(),
        ),
    }
}

fn value_to_json(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            if let Ok(u) = u64::try_from(n) {
                Json::Number(u.into())
            } else if let Ok(i) = i64::try_from(n) {
                Json::Number(i.into())
            } else {
                return Err(CoreError::Encoding(format!("integer {n} out of JSON range")));
            }
        }
        Value::Float(f) => Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| CoreError::Encoding(format!("float {f} not representable in JSON")))?,
        Value::Text(s) => Json::String(s.clone()),
        Value::Array(arr) => Json::Array(arr.iter().map(value_to_json).collect::<Result<_>>()?),
        Value::Map(entries) => {
            let mut map = JsonMap::new();
            for (k, v) in entries {
                let Value::Text(key) = k else {
                    return Err(CoreError::Encoding("JSON object keys must be text".into()));
                };
                map.insert(key.clone(), value_to_json(v)?);
            }
            Json::Object(map)
        }
        Value::Bytes(_) => return Err(CoreError::Encoding("byte strings have no JSON form".into())),
        _ => return Err(CoreError::Encoding("unsupported value in JSON output".into())),
    })
}
