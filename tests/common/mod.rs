//! In-memory chain for integration tests.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use wallet_engine::chain::{
    BlockHeader, BlockSample, CallRequest, ChainClient, ReceiptInfo, TxLookup,
};
use wallet_engine::{WalletError, WalletResult};

/// How the mock responds to raw-transaction broadcasts.
#[derive(Debug, Clone)]
pub enum SendBehavior {
    /// Accept and return keccak256 of the raw bytes.
    Accept,
    /// Node-level rejection (maps to `WalletError::Broadcast`).
    Reject(String),
    /// Transport failure (maps to `WalletError::Network`).
    Unreachable,
}

/// A scriptable [`ChainClient`] holding its whole state in memory.
pub struct MockChain {
    block_number: AtomicU64,
    base_fee: Mutex<Option<u128>>,
    gas_price: Mutex<u128>,
    blocks: Mutex<HashMap<u64, BlockSample>>,
    pending_counts: Mutex<HashMap<Address, u64>>,
    /// `None` makes gas simulation fail.
    gas_estimate: Mutex<Option<u64>>,
    send_behavior: Mutex<SendBehavior>,
    lookups: Mutex<HashMap<B256, TxLookup>>,
    receipts: Mutex<HashMap<B256, ReceiptInfo>>,
    /// Contract call responses keyed by (contract, 4-byte selector).
    call_results: Mutex<HashMap<(Address, [u8; 4]), Bytes>>,
    receipt_polls: AtomicU64,
    pub sent: Mutex<Vec<Bytes>>,
}

#[allow(dead_code)]
impl MockChain {
    pub fn new() -> Self {
        Self {
            block_number: AtomicU64::new(100),
            base_fee: Mutex::new(None),
            gas_price: Mutex::new(20_000_000_000),
            blocks: Mutex::new(HashMap::new()),
            pending_counts: Mutex::new(HashMap::new()),
            gas_estimate: Mutex::new(Some(21_000)),
            send_behavior: Mutex::new(SendBehavior::Accept),
            lookups: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            call_results: Mutex::new(HashMap::new()),
            receipt_polls: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_block_number(&self, number: u64) {
        self.block_number.store(number, Ordering::SeqCst);
    }

    pub fn set_base_fee(&self, base_fee: Option<u128>) {
        *self.base_fee.lock().unwrap() = base_fee;
    }

    pub fn set_gas_price(&self, price: u128) {
        *self.gas_price.lock().unwrap() = price;
    }

    pub fn set_gas_estimate(&self, estimate: Option<u64>) {
        *self.gas_estimate.lock().unwrap() = estimate;
    }

    pub fn set_pending_count(&self, address: Address, count: u64) {
        self.pending_counts.lock().unwrap().insert(address, count);
    }

    pub fn set_send_behavior(&self, behavior: SendBehavior) {
        *self.send_behavior.lock().unwrap() = behavior;
    }

    pub fn insert_block(&self, block: BlockSample) {
        self.blocks.lock().unwrap().insert(block.number, block);
    }

    pub fn insert_lookup(&self, hash: B256, block_number: Option<u64>) {
        self.lookups
            .lock()
            .unwrap()
            .insert(hash, TxLookup { block_number });
    }

    pub fn insert_receipt(&self, hash: B256, block_number: u64, succeeded: bool) {
        self.receipts.lock().unwrap().insert(
            hash,
            ReceiptInfo {
                block_number: Some(block_number),
                succeeded,
            },
        );
    }

    /// Fix the ABI-encoded return data for calls to `contract` whose calldata
    /// starts with `selector`.
    pub fn set_call_result(&self, contract: Address, selector: [u8; 4], data: Bytes) {
        self.call_results
            .lock()
            .unwrap()
            .insert((contract, selector), data);
    }

    /// Number of receipt lookups served so far.
    pub fn receipt_poll_count(&self) -> u64 {
        self.receipt_polls.load(Ordering::SeqCst)
    }

    /// ABI-encode a uint word, e.g. a `balanceOf` or `decimals` return value.
    pub fn encode_uint(value: U256) -> Bytes {
        Bytes::from(value.to_be_bytes::<32>().to_vec())
    }

    /// ABI-encode a dynamic string return value: offset, length, padded data.
    pub fn encode_string(value: &str) -> Bytes {
        let bytes = value.as_bytes();
        let mut out = Vec::new();
        out.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(bytes.len() as u64).to_be_bytes::<32>());
        out.extend_from_slice(bytes);
        out.resize(64 + bytes.len().div_ceil(32) * 32, 0);
        Bytes::from(out)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn block_number(&self) -> WalletResult<u64> {
        Ok(self.block_number.load(Ordering::SeqCst))
    }

    async fn gas_price(&self) -> WalletResult<u128> {
        Ok(*self.gas_price.lock().unwrap())
    }

    async fn latest_block(&self) -> WalletResult<BlockHeader> {
        Ok(BlockHeader {
            number: self.block_number.load(Ordering::SeqCst),
            base_fee_per_gas: *self.base_fee.lock().unwrap(),
        })
    }

    async fn block_with_transactions(&self, number: u64) -> WalletResult<Option<BlockSample>> {
        Ok(self.blocks.lock().unwrap().get(&number).cloned())
    }

    async fn pending_transaction_count(&self, address: Address) -> WalletResult<u64> {
        Ok(*self
            .pending_counts
            .lock()
            .unwrap()
            .get(&address)
            .unwrap_or(&0))
    }

    async fn estimate_gas(&self, _request: &CallRequest) -> WalletResult<u64> {
        self.gas_estimate
            .lock()
            .unwrap()
            .ok_or_else(|| WalletError::Network("simulation reverted".into()))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> WalletResult<B256> {
        let behavior = self.send_behavior.lock().unwrap().clone();
        match behavior {
            SendBehavior::Accept => {
                self.sent.lock().unwrap().push(Bytes::from(raw.to_vec()));
                Ok(keccak256(raw))
            }
            SendBehavior::Reject(reason) => Err(WalletError::Broadcast(reason)),
            SendBehavior::Unreachable => {
                Err(WalletError::Network("all RPC providers failed".into()))
            }
        }
    }

    async fn transaction_by_hash(&self, hash: B256) -> WalletResult<Option<TxLookup>> {
        Ok(self.lookups.lock().unwrap().get(&hash).copied())
    }

    async fn transaction_receipt(&self, hash: B256) -> WalletResult<Option<ReceiptInfo>> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.lock().unwrap().get(&hash).copied())
    }

    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes> {
        let mut selector = [0u8; 4];
        if data.len() >= 4 {
            selector.copy_from_slice(&data[..4]);
        }
        self.call_results
            .lock()
            .unwrap()
            .get(&(to, selector))
            .cloned()
            .ok_or_else(|| WalletError::Network("no contract at address".into()))
    }
}
