//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::WalletConfig;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(msg) => write!(f, "Validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WalletConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WalletConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), ConfigError> {
    config
        .chain
        .rpc_url
        .parse::<url::Url>()
        .map_err(|e| ConfigError::Validation(format!("invalid rpc_url: {}", e)))?;

    for url in &config.chain.failover_urls {
        url.parse::<url::Url>().map_err(|e| {
            ConfigError::Validation(format!("invalid failover url '{}': {}", url, e))
        })?;
    }

    if config.chain.chain_id == 0 {
        return Err(ConfigError::Validation("chain_id must be non-zero".into()));
    }
    if config.confirmations.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll_interval_ms must be non-zero".into(),
        ));
    }
    if config.confirmations.max_wait_ms < config.confirmations.poll_interval_ms {
        return Err(ConfigError::Validation(
            "max_wait_ms must be at least poll_interval_ms".into(),
        ));
    }
    if config.fees.sample_blocks == 0 {
        return Err(ConfigError::Validation(
            "sample_blocks must be non-zero".into(),
        ));
    }

    Ok(())
}
