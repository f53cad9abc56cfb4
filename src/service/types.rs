//! Request and response types for the transaction pipeline.

use alloy::primitives::{Address, Bytes, B256, U256};

use crate::fees::{FeeMarketQuote, FeeQuote};

/// A value-transfer request. `None` fields are filled in by the service.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,

    /// Explicit nonce. When set, the allocator is bypassed and the service
    /// neither releases nor confirms it.
    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,

    /// Legacy fee field. Mutually exclusive with the fee-market pair.
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TransferRequest {
    /// A plain transfer with every optional field left to the service.
    pub fn value_transfer(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            data: Bytes::new(),
            nonce: None,
            gas_limit: None,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }
}

/// A fungible-token transfer request.
#[derive(Debug, Clone)]
pub struct TokenTransferRequest {
    pub from: Address,
    /// Token contract address.
    pub token: Address,
    /// Token recipient.
    pub to: Address,
    /// Amount in the token's smallest unit.
    pub amount: U256,

    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TokenTransferRequest {
    pub fn new(from: Address, token: Address, to: Address, amount: U256) -> Self {
        Self {
            from,
            token,
            to,
            amount,
            nonce: None,
            gas_limit: None,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }
}

/// Result of a successful broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub hash: B256,
    pub nonce: u64,
}

/// Combined gas and fee estimate. Exactly one quote is present, matching the
/// chain's pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub gas_limit: u64,
    pub market: Option<FeeMarketQuote>,
    pub legacy: Option<FeeQuote>,
}

/// Chain-level status of a transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Unknown to the node; dropped or never broadcast.
    Dropped,
    /// In the mempool, not yet mined.
    Pending,
    /// Mined but below the required confirmation depth.
    Confirming { confirmations: u64 },
    /// Mined with the required depth.
    Confirmed { confirmations: u64 },
    /// Mined and reverted.
    Failed,
}
