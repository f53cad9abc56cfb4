//! Chain node access.
//!
//! # Data Flow
//! ```text
//! ChainConfig (RPC URLs, chain id, timeouts)
//!     → client.rs (ChainClient contract + alloy RPC implementation)
//!     → fees / nonce / confirm / service (consumers)
//! ```
//!
//! The engine consumes a narrow node contract: block lookups, gas price,
//! pending transaction counts, gas simulation, raw-transaction submission,
//! transaction/receipt lookups, and read-only contract calls. Everything else
//! the node offers is out of scope.

pub mod client;
pub mod types;

pub use client::{ChainClient, RpcChainClient};
pub use types::{BlockHeader, BlockSample, CallRequest, ReceiptInfo, SampledTx, TxLookup};
