//! Engine configuration.
//!
//! Serde-derived schema with defaults for every section, loaded from TOML and
//! validated after parse.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{ChainConfig, ConfirmationConfig, FeeConfig, WalletConfig};
