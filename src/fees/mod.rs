//! Fee estimation.
//!
//! Two pricing models are supported: legacy single gas price and the
//! fee-market (base fee + priority fee) pair. All arithmetic is integer wei;
//! fractional results truncate except the gas-limit headroom, which rounds up.

pub mod estimator;

pub use estimator::{FeeEstimator, FeeMarketQuote, FeeQuote, GWEI};
