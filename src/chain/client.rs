//! Chain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint (primary + failovers)
//! - Query chain state (blocks, gas price, nonces, receipts)
//! - Simulate and broadcast transactions
//! - Handle timeouts and network errors gracefully

use alloy::consensus::Transaction as _;
use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::RpcError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::types::{BlockHeader, BlockSample, CallRequest, ReceiptInfo, SampledTx, TxLookup};
use crate::config::ChainConfig;
use crate::error::{WalletError, WalletResult};

/// The node contract consumed by the engine.
///
/// Implementations must be shareable across tasks; the engine holds them as
/// `Arc<dyn ChainClient>`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest block number.
    async fn block_number(&self) -> WalletResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> WalletResult<u128>;

    /// Header of the latest block.
    async fn latest_block(&self) -> WalletResult<BlockHeader>;

    /// Block by number, with per-transaction fee data. `None` if the block
    /// does not exist.
    async fn block_with_transactions(&self, number: u64) -> WalletResult<Option<BlockSample>>;

    /// Transaction count for an address at the pending state.
    async fn pending_transaction_count(&self, address: Address) -> WalletResult<u64>;

    /// Gas simulation for a call.
    async fn estimate_gas(&self, request: &CallRequest) -> WalletResult<u64>;

    /// Broadcast signed raw transaction bytes, returning the transaction hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> WalletResult<B256>;

    /// Transaction lookup by hash.
    async fn transaction_by_hash(&self, hash: B256) -> WalletResult<Option<TxLookup>>;

    /// Receipt lookup by hash. `None` until the transaction is mined.
    async fn transaction_receipt(&self, hash: B256) -> WalletResult<Option<ReceiptInfo>>;

    /// Read-only contract call.
    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes>;
}

/// RPC-backed [`ChainClient`] with failover support.
#[derive(Clone)]
pub struct RpcChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: ChainConfig,
    /// Per-request timeout duration.
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a new RPC client from configuration.
    pub fn new(config: ChainConfig) -> WalletResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            WalletError::Network(format!("invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            failovers = providers.len() - 1,
            "Chain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Chain ID this client is configured for.
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Run `op` against each provider in order until one succeeds.
    async fn with_failover<T, F, Fut>(&self, what: &str, op: F) -> WalletResult<T>
    where
        F: Fn(Arc<dyn Provider + Send + Sync>) -> Fut,
        Fut: std::future::Future<Output = Result<T, RpcError<alloy::transports::TransportErrorKind>>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, what, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, what, "RPC timeout, trying next provider");
                }
            }
        }
        Err(WalletError::Network(format!(
            "all RPC providers failed: {}",
            what
        )))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_number(&self) -> WalletResult<u64> {
        self.with_failover("block number", |p| async move { p.get_block_number().await })
            .await
    }

    async fn gas_price(&self) -> WalletResult<u128> {
        self.with_failover("gas price", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn latest_block(&self) -> WalletResult<BlockHeader> {
        let block = self
            .with_failover("latest block", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Latest)
                    .hashes()
                    .await
            })
            .await?
            .ok_or_else(|| WalletError::Network("node returned no latest block".into()))?;

        Ok(BlockHeader {
            number: block.header.number,
            base_fee_per_gas: block.header.base_fee_per_gas.map(u128::from),
        })
    }

    async fn block_with_transactions(&self, number: u64) -> WalletResult<Option<BlockSample>> {
        let block = self
            .with_failover("block with transactions", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Number(number))
                    .full()
                    .await
            })
            .await?;

        Ok(block.map(|block| {
            let base_fee = block.header.base_fee_per_gas;
            let transactions = block
                .transactions
                .txns()
                .map(|tx| SampledTx {
                    gas_price: tx.effective_gas_price(base_fee),
                })
                .collect();
            BlockSample {
                number: block.header.number,
                base_fee_per_gas: base_fee.map(u128::from),
                transactions,
            }
        }))
    }

    async fn pending_transaction_count(&self, address: Address) -> WalletResult<u64> {
        self.with_failover("pending transaction count", |p| async move {
            p.get_transaction_count(address)
                .block_id(BlockId::pending())
                .await
        })
        .await
    }

    async fn estimate_gas(&self, request: &CallRequest) -> WalletResult<u64> {
        let tx = TransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_value(request.value)
            .with_input(request.data.clone());

        self.with_failover("gas estimation", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> WalletResult<B256> {
        // A node-level rejection is deterministic; surface it instead of
        // retrying it against failover providers.
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.send_raw_transaction(raw)).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(RpcError::ErrorResp(payload))) => {
                    return Err(WalletError::Broadcast(payload.to_string()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "Broadcast transport error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "Broadcast timeout, trying next provider");
                }
            }
        }
        Err(WalletError::Network(
            "all RPC providers failed: raw transaction broadcast".into(),
        ))
    }

    async fn transaction_by_hash(&self, hash: B256) -> WalletResult<Option<TxLookup>> {
        let tx = self
            .with_failover("transaction by hash", |p| async move {
                p.get_transaction_by_hash(hash).await
            })
            .await?;

        Ok(tx.map(|tx| TxLookup {
            block_number: tx.block_number,
        }))
    }

    async fn transaction_receipt(&self, hash: B256) -> WalletResult<Option<ReceiptInfo>> {
        let receipt = self
            .with_failover("transaction receipt", |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;

        Ok(receipt.map(|receipt| ReceiptInfo {
            block_number: receipt.block_number,
            succeeded: receipt.status(),
        }))
    }

    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(data.clone());

        self.with_failover("contract call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ChainConfig {
        ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 1,
        }
    }

    #[test]
    fn test_client_creation() {
        // Client creation should succeed even when the endpoint is unreachable.
        let client = RpcChainClient::new(test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_primary_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        assert!(RpcChainClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_network_error() {
        let mut config = test_config();
        config.rpc_url = "http://127.0.0.1:1".to_string();
        config.failover_urls.push("http://127.0.0.1:2".to_string());

        let client = RpcChainClient::new(config).unwrap();
        let result = client.block_number().await;
        assert!(matches!(result, Err(WalletError::Network(_))));
    }
}
