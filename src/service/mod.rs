//! Transaction orchestration.
//!
//! # Responsibilities
//! - Validate transfer requests before anything touches the chain
//! - Fill in nonce, gas limit and fee fields that the caller left open
//! - Sign, broadcast, and hand the hash to the confirmation tracker
//! - Release the nonce when the node rejects a broadcast
//!
//! # Data Flow
//! 1. `send` validates the request and resolves the sender key
//! 2. Missing pieces come from the allocator and the fee estimator
//! 3. The signed bytes are broadcast; the tracker takes over from there,
//!    confirming the nonce with the allocator on a terminal `Confirmed`

pub mod types;

use alloy::primitives::{Address, Bytes, B256, U256};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::{CallRequest, ChainClient};
use crate::config::WalletConfig;
use crate::confirm::{ConfirmationEvent, ConfirmationOutcome, ConfirmationTracker};
use crate::error::{WalletError, WalletResult};
use crate::fees::{FeeEstimator, FeeQuote};
use crate::keys::address::is_valid_address;
use crate::nonce::NonceAllocator;
use crate::token::{transfer_calldata, Erc20};
use crate::transaction::{self, FeeFields, UnsignedTransaction};

pub use types::{FeeEstimate, SendReceipt, TokenTransferRequest, TransactionStatus, TransferRequest};

/// Parse a 0x-prefixed address string, rejecting malformed input.
pub fn parse_address(s: &str) -> WalletResult<Address> {
    if !is_valid_address(s) {
        return Err(WalletError::Validation(format!(
            "malformed address: {}",
            s
        )));
    }
    Address::from_str(s).map_err(|e| WalletError::Validation(format!("malformed address: {}", e)))
}

/// End-to-end transaction pipeline over a [`ChainClient`].
pub struct TransactionService {
    client: Arc<dyn ChainClient>,
    estimator: FeeEstimator,
    nonces: Arc<NonceAllocator>,
    tracker: Arc<ConfirmationTracker>,
    chain_id: u64,
    token_gas_limit: u64,
    required_confirmations: u64,
}

impl TransactionService {
    pub fn new(client: Arc<dyn ChainClient>, config: WalletConfig) -> Self {
        Self {
            estimator: FeeEstimator::new(client.clone(), config.fees.clone()),
            nonces: Arc::new(NonceAllocator::new(client.clone())),
            tracker: Arc::new(ConfirmationTracker::new(
                client.clone(),
                config.confirmations.clone(),
            )),
            chain_id: config.chain.chain_id,
            token_gas_limit: config.fees.token_gas_limit,
            required_confirmations: config.confirmations.required_confirmations,
            client,
        }
    }

    /// Send a value transfer.
    ///
    /// The caller may pin any of nonce, gas limit, and fee fields; the rest
    /// are filled in from the allocator and the estimator. On a node-level
    /// rejection the allocated nonce is released before the error surfaces.
    pub async fn send(
        &self,
        request: TransferRequest,
        private_key: &B256,
    ) -> WalletResult<SendReceipt> {
        let from = self.verify_sender(request.from, private_key)?;

        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => self.nonces.next_nonce(from).await?,
        };
        let owns_nonce = request.nonce.is_none();

        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => {
                self.estimator
                    .estimate_gas_limit(&CallRequest {
                        from,
                        to: request.to,
                        value: request.value,
                        data: request.data.clone(),
                    })
                    .await
            }
        };

        let fee = match self
            .resolve_fee(
                request.gas_price,
                request.max_fee_per_gas,
                request.max_priority_fee_per_gas,
            )
            .await
        {
            Ok(fee) => fee,
            Err(e) => {
                if owns_nonce {
                    self.nonces.release_nonce(from, nonce).await;
                }
                return Err(e);
            }
        };

        let unsigned = UnsignedTransaction {
            nonce,
            to: request.to,
            value: request.value,
            data: request.data,
            gas_limit,
            chain_id: self.chain_id,
            fee,
        };

        self.broadcast(from, nonce, owns_nonce, &unsigned, private_key)
            .await
    }

    /// Send a fungible-token transfer.
    ///
    /// Checks the sender's token balance, encodes `transfer(to, amount)`, and
    /// runs the same pipeline as [`send`](Self::send) with zero value.
    pub async fn send_token_transfer(
        &self,
        request: TokenTransferRequest,
        private_key: &B256,
    ) -> WalletResult<SendReceipt> {
        let from = self.verify_sender(request.from, private_key)?;

        if request.amount.is_zero() {
            return Err(WalletError::Validation(
                "token transfer amount must be positive".into(),
            ));
        }

        let token = Erc20::new(self.client.clone(), request.token);
        let balance = token.balance_of(from).await?;
        if balance < request.amount {
            return Err(WalletError::Validation(format!(
                "token balance {} is below transfer amount {}",
                balance, request.amount
            )));
        }

        self.send(
            TransferRequest {
                from,
                to: request.token,
                value: U256::ZERO,
                data: transfer_calldata(request.to, request.amount),
                nonce: request.nonce,
                gas_limit: Some(request.gas_limit.unwrap_or(self.token_gas_limit)),
                gas_price: request.gas_price,
                max_fee_per_gas: request.max_fee_per_gas,
                max_priority_fee_per_gas: request.max_priority_fee_per_gas,
            },
            private_key,
        )
        .await
    }

    /// Gas limit plus a fee quote for a prospective call.
    ///
    /// Returns the fee-market quote when the chain supports it, otherwise the
    /// legacy quote.
    pub async fn estimate_fees(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> WalletResult<FeeEstimate> {
        let gas_limit = self
            .estimator
            .estimate_gas_limit(&CallRequest {
                from,
                to,
                value,
                data,
            })
            .await;

        if self.estimator.supports_fee_market().await {
            Ok(FeeEstimate {
                gas_limit,
                market: Some(self.estimator.fee_market_quote().await?),
                legacy: None,
            })
        } else {
            Ok(FeeEstimate {
                gas_limit,
                market: None,
                legacy: Some(self.estimator.legacy_quote().await?),
            })
        }
    }

    /// Chain-level status of a transaction hash.
    pub async fn transaction_status(&self, hash: B256) -> WalletResult<TransactionStatus> {
        let Some(lookup) = self.client.transaction_by_hash(hash).await? else {
            return Ok(TransactionStatus::Dropped);
        };
        let Some(mined_in) = lookup.block_number else {
            return Ok(TransactionStatus::Pending);
        };

        let current = self.client.block_number().await?;
        let confirmations = current.saturating_sub(mined_in) + 1;

        match self.client.transaction_receipt(hash).await? {
            Some(receipt) if !receipt.succeeded => Ok(TransactionStatus::Failed),
            Some(_) if confirmations >= self.required_confirmations => {
                Ok(TransactionStatus::Confirmed { confirmations })
            }
            _ => Ok(TransactionStatus::Confirming { confirmations }),
        }
    }

    /// The confirmation tracker driving post-broadcast lifecycle.
    pub fn tracker(&self) -> &Arc<ConfirmationTracker> {
        &self.tracker
    }

    /// The per-address nonce allocator.
    pub fn nonces(&self) -> &Arc<NonceAllocator> {
        &self.nonces
    }

    fn verify_sender(&self, from: Address, private_key: &B256) -> WalletResult<Address> {
        let derived = transaction::address_for_key(private_key)?;
        if derived != from {
            return Err(WalletError::Validation(format!(
                "private key controls {}, not the requested sender {}",
                derived, from
            )));
        }
        Ok(from)
    }

    /// Classify explicit fee fields, or pick the medium tier of the quote the
    /// chain supports.
    async fn resolve_fee(
        &self,
        gas_price: Option<u128>,
        max_fee_per_gas: Option<u128>,
        max_priority_fee_per_gas: Option<u128>,
    ) -> WalletResult<FeeFields> {
        if gas_price.is_some() || max_fee_per_gas.is_some() || max_priority_fee_per_gas.is_some() {
            return FeeFields::classify(gas_price, max_fee_per_gas, max_priority_fee_per_gas);
        }

        if self.estimator.supports_fee_market().await {
            let quote = self.estimator.fee_market_quote().await?;
            Ok(FeeFields::Market {
                max_fee_per_gas: quote.max_fee.medium,
                max_priority_fee_per_gas: quote.priority_fee.medium,
            })
        } else {
            let FeeQuote { medium, .. } = self.estimator.legacy_quote().await?;
            Ok(FeeFields::Legacy { gas_price: medium })
        }
    }

    async fn broadcast(
        &self,
        from: Address,
        nonce: u64,
        owns_nonce: bool,
        unsigned: &UnsignedTransaction,
        private_key: &B256,
    ) -> WalletResult<SendReceipt> {
        let signed = match transaction::sign(unsigned, private_key) {
            Ok(signed) => signed,
            Err(e) => {
                if owns_nonce {
                    self.nonces.release_nonce(from, nonce).await;
                }
                return Err(e);
            }
        };

        match self.client.send_raw_transaction(&signed.raw).await {
            Ok(hash) => {
                info!(%from, nonce, %hash, "Transaction broadcast");
                self.track(from, nonce, owns_nonce, hash);
                Ok(SendReceipt { hash, nonce })
            }
            Err(e @ WalletError::Broadcast(_)) => {
                if owns_nonce {
                    self.nonces.release_nonce(from, nonce).await;
                }
                warn!(%from, nonce, error = %e, "Broadcast rejected by node");
                Err(e)
            }
            Err(e) => {
                if owns_nonce {
                    self.nonces.release_nonce(from, nonce).await;
                }
                Err(e)
            }
        }
    }

    /// Hand a broadcast hash to the tracker; a terminal `Confirmed` outcome
    /// confirms the nonce with the allocator.
    fn track(&self, from: Address, nonce: u64, owns_nonce: bool, hash: B256) {
        let nonces = self.nonces.clone();
        let result = self.tracker.watch_with_callback(
            hash,
            self.required_confirmations,
            Box::new(move |event| {
                if let ConfirmationEvent::Terminal(ConfirmationOutcome::Confirmed { .. }) = event {
                    if owns_nonce {
                        let nonces = nonces.clone();
                        tokio::spawn(async move {
                            nonces.confirm_nonce(from, nonce).await;
                        });
                    }
                }
            }),
        );
        if let Err(e) = result {
            warn!(%hash, error = %e, "Could not start confirmation watch");
        }
    }
}

impl std::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionService")
            .field("chain_id", &self.chain_id)
            .field("required_confirmations", &self.required_confirmations)
            .finish()
    }
}
