//! Transaction assembly and signing.
//!
//! Unsigned transactions carry exactly one fee model: a legacy gas price or a
//! (max fee, max priority fee) pair. Signing is deterministic (RFC 6979) and
//! always incorporates the chain id, including for legacy transactions.

pub mod builder;
pub mod types;

pub use builder::{address_for_key, sign};
pub use types::{FeeFields, SignedTransaction, UnsignedTransaction};
