//! # Tallychain Testkit
//!
//! Testing utilities for Tallychain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with pinned canonical bytes, digests and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use tallychain_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let actual = (vector.compute)().unwrap();
//!     assert_eq!(actual, vector.expected, "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tallychain_testkit::generators::shuffled_record_pair;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_ignores_order((a, b) in shuffled_record_pair()) {
//!         prop_assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use tallychain_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::tamper_scenario().unwrap();
//! assert_eq!(fixture.ledger.validate().first_failure(), Some(1));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{record, shuffled_record_pair, transaction};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
