//! HD wallet and transaction engine for account-based EVM chains.
//!
//! # Modules
//! - [`keys`]: mnemonic generation, BIP32/BIP44 key derivation, EIP-55 addresses
//! - [`chain`]: the [`ChainClient`](chain::ChainClient) node contract and its
//!   RPC implementation with failover
//! - [`fees`]: gas-limit estimation and legacy/fee-market price quotes
//! - [`nonce`]: per-address nonce allocation with release and reuse
//! - [`transaction`]: transaction assembly and deterministic signing
//! - [`confirm`]: background confirmation tracking with exactly-once terminal
//!   delivery
//! - [`token`]: minimal ERC-20 reads and transfer encoding
//! - [`service`]: the orchestrating [`TransactionService`](service::TransactionService)
//!
//! Derivation in [`keys`] is pure and needs no node. Everything network-facing
//! goes through the [`chain::ChainClient`] trait, so the pipeline is testable
//! against an in-memory chain.

pub mod chain;
pub mod config;
pub mod confirm;
pub mod error;
pub mod fees;
pub mod keys;
pub mod logging;
pub mod nonce;
pub mod service;
pub mod token;
pub mod transaction;

pub use chain::{ChainClient, RpcChainClient};
pub use config::{load_config, WalletConfig};
pub use confirm::{ConfirmationEvent, ConfirmationOutcome, ConfirmationTracker};
pub use error::{WalletError, WalletResult};
pub use fees::{FeeEstimator, FeeMarketQuote, FeeQuote};
pub use keys::{DerivedKey, ExtendedKey, HdWallet};
pub use nonce::NonceAllocator;
pub use service::{
    FeeEstimate, SendReceipt, TokenTransferRequest, TransactionService, TransactionStatus,
    TransferRequest,
};
pub use transaction::{FeeFields, SignedTransaction, UnsignedTransaction};
