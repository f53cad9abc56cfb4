//! Hierarchical-deterministic key derivation.
//!
//! # Data Flow
//! ```text
//! mnemonic.rs (BIP39 words + checksum → 64-byte seed)
//!     → extended.rs (BIP32 master key, child derivation, xprv/xpub)
//!     → hd.rs (BIP44 walk m/44'/60'/account'/change/index)
//!     → address.rs (keccak address + EIP-55 checksum)
//! ```
//!
//! # Security Constraints
//! - Private key material is computed on demand and never logged
//! - All derivation is deterministic: identical inputs, identical outputs

pub mod address;
pub mod extended;
pub mod hd;
pub mod mnemonic;

pub use address::{address_from_public_key, is_valid_address, to_checksum_address};
pub use extended::{ExtendedKey, HARDENED_OFFSET};
pub use hd::{DerivedKey, HdWallet};
