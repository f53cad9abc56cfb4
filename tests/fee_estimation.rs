//! Fee estimation against an in-memory chain.

mod common;

use alloy::primitives::{Address, Bytes, U256};
use std::str::FromStr;
use std::sync::Arc;

use common::MockChain;
use wallet_engine::chain::{BlockSample, CallRequest, SampledTx};
use wallet_engine::config::FeeConfig;
use wallet_engine::fees::GWEI;
use wallet_engine::{FeeEstimator, WalletError};

fn request() -> CallRequest {
    CallRequest {
        from: Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap(),
        to: Address::from_str("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap(),
        value: U256::from(1u64),
        data: Bytes::new(),
    }
}

fn estimator(chain: Arc<MockChain>) -> FeeEstimator {
    FeeEstimator::new(chain, FeeConfig::default())
}

fn block(number: u64, base_fee: u128, tips: &[u128]) -> BlockSample {
    BlockSample {
        number,
        base_fee_per_gas: Some(base_fee),
        transactions: tips
            .iter()
            .map(|tip| SampledTx {
                gas_price: base_fee + tip,
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_gas_limit_adds_headroom_rounding_up() {
    let chain = Arc::new(MockChain::new());
    chain.set_gas_estimate(Some(100_000));
    assert_eq!(estimator(chain.clone()).estimate_gas_limit(&request()).await, 110_000);

    // 21001 * 1.10 = 23101.1, rounded up.
    chain.set_gas_estimate(Some(21_001));
    assert_eq!(estimator(chain).estimate_gas_limit(&request()).await, 23_102);
}

#[tokio::test]
async fn test_gas_limit_falls_back_on_simulation_failure() {
    let chain = Arc::new(MockChain::new());
    chain.set_gas_estimate(None);
    assert_eq!(estimator(chain).estimate_gas_limit(&request()).await, 21_000);
}

#[tokio::test]
async fn test_legacy_quote_scales_current_price() {
    let chain = Arc::new(MockChain::new());
    chain.set_gas_price(100);

    let quote = estimator(chain).legacy_quote().await.unwrap();
    assert_eq!(quote.slow, 90);
    assert_eq!(quote.medium, 100);
    assert_eq!(quote.fast, 120);
}

#[tokio::test]
async fn test_legacy_quote_truncates() {
    let chain = Arc::new(MockChain::new());
    chain.set_gas_price(33);

    let quote = estimator(chain).legacy_quote().await.unwrap();
    assert_eq!(quote.slow, 29); // 33 * 0.9 = 29.7
    assert_eq!(quote.fast, 39); // 33 * 1.2 = 39.6
}

#[tokio::test]
async fn test_market_quote_uses_median_tip() {
    let chain = Arc::new(MockChain::new());
    let base = 50 * GWEI;
    chain.set_block_number(100);
    chain.set_base_fee(Some(base));
    // Tips across the sampled window: median of [1, 2, 3, 4, 5] gwei.
    chain.insert_block(block(100, base, &[GWEI, 5 * GWEI]));
    chain.insert_block(block(99, base, &[3 * GWEI]));
    chain.insert_block(block(98, base, &[2 * GWEI, 4 * GWEI]));

    let quote = estimator(chain).fee_market_quote().await.unwrap();
    assert_eq!(quote.base_fee, base);
    assert_eq!(quote.priority_fee.medium, 3 * GWEI);
    assert_eq!(quote.priority_fee.slow, 3 * GWEI * 80 / 100);
    assert_eq!(quote.priority_fee.fast, 3 * GWEI * 150 / 100);
    assert_eq!(quote.max_fee.slow, 2 * base + quote.priority_fee.slow);
    assert_eq!(quote.max_fee.medium, 2 * base + quote.priority_fee.medium);
    assert_eq!(quote.max_fee.fast, 3 * base + quote.priority_fee.fast);
}

#[tokio::test]
async fn test_market_quote_even_sample_averages_center() {
    let chain = Arc::new(MockChain::new());
    let base = 10 * GWEI;
    chain.set_block_number(100);
    chain.set_base_fee(Some(base));
    chain.insert_block(block(100, base, &[GWEI, 2 * GWEI, 3 * GWEI, 4 * GWEI]));

    let quote = estimator(chain).fee_market_quote().await.unwrap();
    assert_eq!(quote.priority_fee.medium, 25 * GWEI / 10);
}

#[tokio::test]
async fn test_market_quote_falls_back_to_one_gwei() {
    let chain = Arc::new(MockChain::new());
    chain.set_block_number(100);
    chain.set_base_fee(Some(30 * GWEI));
    // No sampled blocks at all: nothing to take a median of.

    let quote = estimator(chain).fee_market_quote().await.unwrap();
    assert_eq!(quote.priority_fee.medium, GWEI);
}

#[tokio::test]
async fn test_market_quote_skips_zero_tip_samples() {
    let chain = Arc::new(MockChain::new());
    let base = 30 * GWEI;
    chain.set_block_number(100);
    chain.set_base_fee(Some(base));
    // Transactions paying exactly the base fee carry no usable tip.
    chain.insert_block(block(100, base, &[0, 0, 7 * GWEI]));

    let quote = estimator(chain).fee_market_quote().await.unwrap();
    assert_eq!(quote.priority_fee.medium, 7 * GWEI);
}

#[tokio::test]
async fn test_market_quote_unsupported_without_base_fee() {
    let chain = Arc::new(MockChain::new());
    chain.set_base_fee(None);

    let result = estimator(chain).fee_market_quote().await;
    assert!(matches!(result, Err(WalletError::ProtocolUnsupported)));
}

#[tokio::test]
async fn test_fee_market_detection() {
    let chain = Arc::new(MockChain::new());
    chain.set_base_fee(Some(GWEI));
    assert!(estimator(chain.clone()).supports_fee_market().await);

    chain.set_base_fee(None);
    assert!(!estimator(chain).supports_fee_market().await);
}
