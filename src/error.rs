//! Engine-wide error definitions.

use thiserror::Error;

/// Errors that can occur during wallet and transaction operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed input (bad word count, malformed address, negative amount,
    /// wrong seed length). Surfaced immediately, never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid key material or a derivation that requires private material.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// RPC connection, timeout, or node-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The node does not expose a base fee, so fee-market pricing is
    /// unavailable. The caller must explicitly choose the legacy path.
    #[error("node does not support fee-market transactions")]
    ProtocolUnsupported,

    /// Neither or both of the legacy and fee-market fee models were supplied.
    #[error("ambiguous fee model: {0}")]
    AmbiguousFeeModel(String),

    /// The node rejected a raw-transaction submission. The allocated nonce is
    /// released before this is surfaced.
    #[error("broadcast rejected: {0}")]
    Broadcast(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
