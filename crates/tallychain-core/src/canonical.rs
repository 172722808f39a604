//! Canonical CBOR encoding for deterministic serialization.
//!
//! Records and blocks are encoded as CBOR (RFC 8949) with the core
//! deterministic rules:
//! - Map keys sorted by their encoded bytes (so length first, then bytewise)
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//! - No floats and no tags
//!
//! Two records holding the same fields encode to the same bytes no matter the
//! order the fields were inserted in. Every digest and signature in the
//! ledger is computed over these bytes; changing the encoding invalidates all
//! existing chains.

use ciborium::value::Value;

use crate::block::Payload;
use crate::crypto::Digest;
use crate::error::{CoreError, Result};
use crate::record::{Record, SignedRecord};

/// Block map keys.
mod keys {
    pub const INDEX: &str = "index";
    pub const PAYLOAD: &str = "payload";
    pub const PREVIOUS: &str = "previous";
    pub const TIMESTAMP: &str = "timestamp";

    pub const RECORD: &str = "record";
    pub const SIGNATURE: &str = "signature";
}

/// Payload variant tags. A payload encodes as `[tag, body]`.
mod tags {
    pub const RAW: u64 = 0;
    pub const RECORD: u64 = 1;
    pub const SIGNED: u64 = 2;
}

/// Encode a record to canonical bytes.
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    encode_canonical(&record.to_value())
}

/// Encode an arbitrary CBOR value to canonical bytes.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Encode the digest input of a block: `{index, previous, payload, timestamp}`.
pub fn encode_block(index: u64, previous: &Digest, payload: &Payload, timestamp: i64) -> Result<Vec<u8>> {
    if let Payload::Raw(text) = payload {
        return Ok(encode_raw_block(index, previous, text, timestamp));
    }
    let entries = vec![
        (Value::Text(keys::INDEX.into()), Value::Integer(index.into())),
        (
            Value::Text(keys::PREVIOUS.into()),
            Value::Bytes(previous.0.to_vec()),
        ),
        (Value::Text(keys::PAYLOAD.into()), payload_value(payload)),
        (
            Value::Text(keys::TIMESTAMP.into()),
            Value::Integer(timestamp.into()),
        ),
    ];
    encode_canonical(&Value::Map(entries))
}

/// Encode a block whose payload is raw text.
///
/// Written out directly in canonical key order; it cannot fail, which keeps
/// genesis construction infallible.
pub fn encode_raw_block(index: u64, previous: &Digest, text: &str, timestamp: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + text.len());
    encode_uint(&mut buf, 5, 4);

    encode_text(&mut buf, keys::INDEX);
    encode_uint(&mut buf, 0, index);

    encode_text(&mut buf, keys::PAYLOAD);
    encode_uint(&mut buf, 4, 2);
    encode_uint(&mut buf, 0, tags::RAW);
    encode_text(&mut buf, text);

    encode_text(&mut buf, keys::PREVIOUS);
    encode_bytes(&mut buf, &previous.0);

    encode_text(&mut buf, keys::TIMESTAMP);
    encode_integer(&mut buf, timestamp.into());
    buf
}

fn payload_value(payload: &Payload) -> Value {
    let (tag, body) = match payload {
        Payload::Raw(text) => (tags::RAW, Value::Text(text.clone())),
        Payload::Record(record) => (tags::RECORD, record.to_value()),
        Payload::Signed(signed) => (tags::SIGNED, signed_value(signed)),
    };
    Value::Array(vec![Value::Integer(tag.into()), body])
}

fn signed_value(signed: &SignedRecord) -> Value {
    Value::Map(vec![
        (Value::Text(keys::RECORD.into()), signed.record().to_value()),
        (
            Value::Text(keys::SIGNATURE.into()),
            Value::Bytes(signed.signature().0.to_vec()),
        ),
    ])
}

/// Recursively encode a CBOR value.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(f) => {
            return Err(CoreError::Encoding(format!(
                "floating-point value {f} has no canonical encoding"
            )))
        }
        Value::Tag(tag, _) => {
            return Err(CoreError::Encoding(format!("tagged value (tag {tag}) not supported")))
        }
        _ => return Err(CoreError::Encoding("unsupported CBOR value type".into())),
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<()> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item)?;
    }
    Ok(())
}

/// Encode a map with keys sorted by their encoded bytes.
///
/// Duplicate keys are rejected: two maps differing only in which duplicate
/// wins would otherwise share an encoding.
fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut sorted = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_bytes = Vec::new();
        encode_value(&mut key_bytes, k)?;
        sorted.push((key_bytes, v));
    }
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    if sorted.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CoreError::Encoding("map contains duplicate keys".into()));
    }

    encode_uint(buf, 5, sorted.len() as u64);
    for (key_bytes, value) in sorted {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 0x1_0000_0000);
        assert_eq!(buf, vec![0x1b, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_negative_integer() {
        let bytes = encode_canonical(&Value::Integer((-1).into())).unwrap();
        assert_eq!(bytes, vec![0x20]);

        let bytes = encode_canonical(&Value::Integer((-100).into())).unwrap();
        assert_eq!(bytes, vec![0x38, 99]);
    }

    #[test]
    fn test_order_independent_record() {
        let ab = Record::new().with("a", 1).with("b", 2);
        let ba = Record::new().with("b", 2).with("a", 1);

        let bytes = encode_record(&ab).unwrap();
        assert_eq!(bytes, encode_record(&ba).unwrap());
        // {"a": 1, "b": 2}
        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x02]);
    }

    #[test]
    fn test_keys_sorted_length_first() {
        // "amount"(6) < "sender"(6) < "recipient"(9)
        let record = Record::new()
            .with("recipient", "Bob")
            .with("sender", "Alice")
            .with("amount", 50);
        let bytes = encode_record(&record).unwrap();

        let value: Value = ciborium::from_reader(bytes.as_slice()).unwrap();
        let Value::Map(entries) = value else {
            panic!("expected map");
        };
        let keys: Vec<_> = entries.iter().filter_map(|(k, _)| k.as_text()).collect();
        assert_eq!(keys, vec!["amount", "sender", "recipient"]);
    }

    #[test]
    fn test_nested_maps_are_sorted() {
        let inner_zy = Value::Map(vec![
            (Value::Text("z".into()), Value::Integer(1.into())),
            (Value::Text("y".into()), Value::Integer(2.into())),
        ]);
        let inner_yz = Value::Map(vec![
            (Value::Text("y".into()), Value::Integer(2.into())),
            (Value::Text("z".into()), Value::Integer(1.into())),
        ]);

        let r1 = Record::new().with("meta", inner_zy);
        let r2 = Record::new().with("meta", inner_yz);
        assert_eq!(encode_record(&r1).unwrap(), encode_record(&r2).unwrap());
    }

    #[test]
    fn test_float_is_encoding_error() {
        let record = Record::new().with("amount", Value::Float(50.5));
        assert!(matches!(encode_record(&record), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_tag_is_encoding_error() {
        let value = Value::Tag(1, Box::new(Value::Integer(0.into())));
        assert!(matches!(encode_canonical(&value), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_duplicate_nested_key_is_encoding_error() {
        let dup = Value::Map(vec![
            (Value::Text("k".into()), Value::Integer(1.into())),
            (Value::Text("k".into()), Value::Integer(2.into())),
        ]);
        assert!(matches!(encode_canonical(&dup), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_block_encoding_distinguishes_payload_kinds() {
        let raw = Payload::Raw("a".into());
        let record = Payload::Record(Record::new().with("a", "a"));

        let b1 = encode_block(1, &Digest::ZERO, &raw, 0).unwrap();
        let b2 = encode_block(1, &Digest::ZERO, &record, 0).unwrap();
        assert_ne!(b1, b2);
    }

    #[test]
    fn test_raw_block_matches_generic_encoding() {
        let previous = Digest::of(b"prev");
        let payload = Payload::Raw("Genesis Block".into());
        let generic = Value::Map(vec![
            (Value::Text("timestamp".into()), Value::Integer((-3i64).into())),
            (Value::Text("previous".into()), Value::Bytes(previous.0.to_vec())),
            (Value::Text("payload".into()), payload_value(&payload)),
            (Value::Text("index".into()), Value::Integer(300u64.into())),
        ]);

        assert_eq!(
            encode_raw_block(300, &previous, "Genesis Block", -3),
            encode_canonical(&generic).unwrap()
        );
    }

    #[test]
    fn test_block_encoding_is_valid_cbor() {
        let bytes = encode_block(7, &Digest::of(b"prev"), &Payload::Raw("tx".into()), -5).unwrap();
        let value: std::result::Result<Value, _> = ciborium::from_reader(bytes.as_slice());
        assert!(value.is_ok());
    }

    proptest! {
        #[test]
        fn test_integers_decode_to_themselves(n in any::<i64>()) {
            let bytes = encode_canonical(&Value::Integer(n.into())).unwrap();
            let decoded: Value = ciborium::from_reader(bytes.as_slice()).unwrap();
            prop_assert_eq!(decoded, Value::Integer(n.into()));
        }

        #[test]
        fn test_text_keys_sort_length_first(a in "[a-z]{1,20}", b in "[a-z]{1,20}") {
            prop_assume!(a != b);
            let bytes = encode_record(&Record::new().with(a.clone(), 0).with(b.clone(), 1)).unwrap();
            let decoded: Value = ciborium::from_reader(bytes.as_slice()).unwrap();
            let Value::Map(entries) = decoded else {
                panic!("expected map");
            };
            let keys: Vec<&str> = entries.iter().filter_map(|(k, _)| k.as_text()).collect();
            let mut expected = vec![a.as_str(), b.as_str()];
            expected.sort_by_key(|k| (k.len(), *k));
            prop_assert_eq!(keys, expected);
        }
    }
}
