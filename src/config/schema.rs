//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Chain node access (RPC endpoints, chain id, timeouts).
    pub chain: ChainConfig,

    /// Fee estimation settings.
    pub fees: FeeConfig,

    /// Confirmation tracking settings.
    pub confirmations: ConfirmationConfig,
}

/// Chain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Primary JSON-RPC endpoint.
    pub rpc_url: String,

    /// Failover endpoints tried in order when the primary fails.
    pub failover_urls: Vec<String>,

    /// Chain ID for EIP-155 replay protection.
    pub chain_id: u64,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
        }
    }
}

/// Fee estimation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Gas limit used when simulation fails (simple transfer cost).
    pub default_gas_limit: u64,

    /// Gas limit for fungible-token transfers when not supplied.
    pub token_gas_limit: u64,

    /// Number of recent blocks sampled for priority-fee estimation.
    pub sample_blocks: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            default_gas_limit: 21_000,
            token_gas_limit: 65_000,
            sample_blocks: 10,
        }
    }
}

/// Confirmation tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Confirmation depth required before a transaction counts as final.
    pub required_confirmations: u64,

    /// Receipt poll interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Total wait bound in milliseconds before a watch times out.
    pub max_wait_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            required_confirmations: 12,
            poll_interval_ms: 3_000,
            max_wait_ms: 600_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.chain.rpc_timeout_secs, 10);
        assert_eq!(config.fees.default_gas_limit, 21_000);
        assert_eq!(config.confirmations.required_confirmations, 12);
        assert_eq!(config.confirmations.poll_interval_ms, 3_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [chain]
            rpc_url = "https://rpc.example.org"
            chain_id = 11155111
        "#;
        let config: WalletConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.chain.rpc_url, "https://rpc.example.org");
        assert_eq!(config.chain.chain_id, 11_155_111);
        assert_eq!(config.fees.sample_blocks, 10);
    }
}
