//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tallychain::Transaction;
use tallychain_core::{KeyPair, Payload, Record, Value, SIGNATURE_FIELD};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = KeyPair> {
    any::<[u8; 32]>().prop_map(|seed| KeyPair::from_seed(&seed))
}

/// Generate a record field name. Never the reserved signature name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}".prop_filter("reserved field name", |name| name != SIGNATURE_FIELD)
}

/// Generate a canonically encodable value, nested at most two levels.
pub fn field_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::Text),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|entries| {
                Value::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::Text(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

/// Generate the fields of a record, names unique.
pub fn fields() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(field_name(), field_value(), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Generate a record.
pub fn record() -> impl Strategy<Value = Record> {
    fields().prop_map(|fields| fields.into_iter().collect())
}

/// Generate the same record twice, built with different insertion orders.
pub fn shuffled_record_pair() -> impl Strategy<Value = (Record, Record)> {
    fields()
        .prop_flat_map(|fields| (Just(fields.clone()), Just(fields).prop_shuffle()))
        .prop_map(|(a, b)| (a.into_iter().collect(), b.into_iter().collect()))
}

/// Generate a transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    ("[A-Z][a-z]{1,9}", "[A-Z][a-z]{1,9}", any::<u64>())
        .prop_map(|(sender, recipient, amount)| Transaction::new(sender, recipient, amount))
}

/// Generate a raw or record payload.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        "[ -~]{0,64}".prop_map(Payload::Raw),
        record().prop_map(Payload::Record),
    ]
}
