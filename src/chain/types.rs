//! Node response types.
//!
//! Optional chain capabilities (fee-market support) are explicit typed fields
//! here, never probed via reflection.

use alloy::primitives::{Address, Bytes, U256};

/// Block header fields the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,

    /// Base fee in wei. `None` on chains without fee-market support.
    pub base_fee_per_gas: Option<u128>,
}

/// A block fetched with its transactions, reduced to fee-sampling inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSample {
    pub number: u64,
    pub base_fee_per_gas: Option<u128>,
    pub transactions: Vec<SampledTx>,
}

/// Per-transaction fee data sampled from a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledTx {
    /// Effective gas price paid by the transaction, in wei.
    pub gas_price: u128,
}

/// Parameters for a gas simulation.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Transaction lookup result (`eth_getTransactionByHash`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxLookup {
    /// Block the transaction was mined in. `None` while still pending.
    pub block_number: Option<u64>,
}

/// Receipt lookup result (`eth_getTransactionReceipt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptInfo {
    /// Block the receipt was issued in.
    pub block_number: Option<u64>,

    /// Whether the transaction executed successfully.
    pub succeeded: bool,
}
