//! Gas and fee estimation against live chain data.
//!
//! # Responsibilities
//! - Gas-limit estimation via node simulation, with headroom and fallback
//! - Legacy gas-price quotes scaled from the node's current price
//! - Fee-market quotes from recent-block priority-fee sampling
//! - Fee-market capability detection

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::chain::{CallRequest, ChainClient};
use crate::config::FeeConfig;
use crate::error::{WalletError, WalletResult};

/// One gwei in wei.
pub const GWEI: u128 = 1_000_000_000;

/// Headroom applied to simulated gas limits, in percent.
const GAS_HEADROOM_PCT: u64 = 110;

/// A three-tier quote in wei. For legacy pricing these are gas prices; for
/// fee-market pricing, priority fees or max fees per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub slow: u128,
    pub medium: u128,
    pub fast: u128,
}

/// Fee-market quote: priority fees and the corresponding max-fee caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeMarketQuote {
    /// Current base fee the quote was computed against, in wei.
    pub base_fee: u128,
    /// Priority fee (tip) per tier.
    pub priority_fee: FeeQuote,
    /// Max total fee per tier.
    pub max_fee: FeeQuote,
}

/// Estimates gas limits and fee levels from chain state.
pub struct FeeEstimator {
    client: Arc<dyn ChainClient>,
    config: FeeConfig,
}

impl FeeEstimator {
    pub fn new(client: Arc<dyn ChainClient>, config: FeeConfig) -> Self {
        Self { client, config }
    }

    /// Estimate a gas limit for the given call.
    ///
    /// Simulates the call against the node and adds 10% headroom, rounding
    /// up. When simulation fails for any reason the configured default limit
    /// is returned instead; this method never errors.
    pub async fn estimate_gas_limit(&self, request: &CallRequest) -> u64 {
        match self.client.estimate_gas(request).await {
            Ok(simulated) => {
                let limit = (simulated * GAS_HEADROOM_PCT).div_ceil(100);
                debug!(simulated, limit, "Gas limit estimated from simulation");
                limit
            }
            Err(e) => {
                warn!(error = %e, fallback = self.config.default_gas_limit,
                      "Gas simulation failed, using default limit");
                self.config.default_gas_limit
            }
        }
    }

    /// Legacy gas-price quote: the node's current price scaled to 90%, 100%
    /// and 120%, truncating.
    pub async fn legacy_quote(&self) -> WalletResult<FeeQuote> {
        let price = self.client.gas_price().await?;
        Ok(FeeQuote {
            slow: price * 90 / 100,
            medium: price,
            fast: price * 120 / 100,
        })
    }

    /// Fee-market quote from recent-block sampling.
    ///
    /// The baseline priority fee is the median of positive
    /// (effective gas price - block base fee) samples over the configured
    /// number of recent blocks; 1 gwei when no usable sample exists. Tiers
    /// scale the baseline to 80%, 100% and 150%, and max fees cap at twice
    /// the base fee plus the tip (three times for the fast tier).
    pub async fn fee_market_quote(&self) -> WalletResult<FeeMarketQuote> {
        let head = self.client.latest_block().await?;
        let base_fee = head
            .base_fee_per_gas
            .ok_or(WalletError::ProtocolUnsupported)?;

        let baseline = self.sample_priority_fee(head.number).await;

        let priority_fee = FeeQuote {
            slow: baseline * 80 / 100,
            medium: baseline,
            fast: baseline * 150 / 100,
        };
        let max_fee = FeeQuote {
            slow: 2 * base_fee + priority_fee.slow,
            medium: 2 * base_fee + priority_fee.medium,
            fast: 3 * base_fee + priority_fee.fast,
        };

        debug!(base_fee, baseline, "Fee-market quote computed");

        Ok(FeeMarketQuote {
            base_fee,
            priority_fee,
            max_fee,
        })
    }

    /// Whether the chain supports fee-market pricing.
    ///
    /// True when the latest block carries a base fee; errors count as
    /// unsupported.
    pub async fn supports_fee_market(&self) -> bool {
        match self.client.latest_block().await {
            Ok(head) => head.base_fee_per_gas.is_some(),
            Err(e) => {
                warn!(error = %e, "Fee-market probe failed, assuming legacy chain");
                false
            }
        }
    }

    /// Median tip paid over the last `sample_blocks` blocks ending at `head`.
    ///
    /// Blocks are fetched concurrently; blocks that are missing or fail to
    /// fetch are skipped. Falls back to 1 gwei when no positive sample
    /// survives.
    async fn sample_priority_fee(&self, head: u64) -> u128 {
        let span = self.config.sample_blocks.min(head + 1);
        let fetches = (0..span).map(|i| {
            let client = self.client.clone();
            let number = head - i;
            async move { client.block_with_transactions(number).await }
        });

        let mut tips: Vec<u128> = Vec::new();
        for result in join_all(fetches).await {
            let Ok(Some(block)) = result else { continue };
            let Some(base_fee) = block.base_fee_per_gas else {
                continue;
            };
            for tx in &block.transactions {
                if tx.gas_price > base_fee {
                    tips.push(tx.gas_price - base_fee);
                }
            }
        }

        match median(&mut tips) {
            Some(tip) => tip,
            None => {
                debug!("No priority-fee samples in recent blocks, using 1 gwei");
                GWEI
            }
        }
    }
}

impl std::fmt::Debug for FeeEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeEstimator")
            .field("config", &self.config)
            .finish()
    }
}

/// Median of the samples. Even-length inputs average the two middle values
/// (integer division); empty input yields `None`.
pub(crate) fn median(samples: &mut [u128]) -> Option<u128> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Some(samples[mid])
    } else {
        Some((samples[mid - 1] + samples[mid]) / 2)
    }
}
