//! Transaction signing.
//!
//! Legacy transactions are signed over (nonce, gasPrice, gasLimit, to, value,
//! data, chainId, 0, 0) for replay protection; fee-market transactions use the
//! 0x02-typed envelope with an empty access list. Signatures are deterministic:
//! the same (transaction, key) pair always produces the same bytes.

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, TxKind, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::network::TxSignerSync;

use crate::error::{WalletError, WalletResult};
use crate::transaction::types::{FeeFields, SignedTransaction, UnsignedTransaction};

/// Sign a transaction with the given private key.
pub fn sign(unsigned: &UnsignedTransaction, private_key: &B256) -> WalletResult<SignedTransaction> {
    let signer = PrivateKeySigner::from_bytes(private_key)
        .map_err(|e| WalletError::Crypto(format!("invalid private key: {}", e)))?;

    let envelope: TxEnvelope = match unsigned.fee {
        FeeFields::Legacy { gas_price } => {
            let mut tx = TxLegacy {
                chain_id: Some(unsigned.chain_id),
                nonce: unsigned.nonce,
                gas_price,
                gas_limit: unsigned.gas_limit,
                to: TxKind::Call(unsigned.to),
                value: unsigned.value,
                input: unsigned.data.clone(),
            };
            let signature = signer
                .sign_transaction_sync(&mut tx)
                .map_err(|e| WalletError::Crypto(format!("signing failed: {}", e)))?;
            tx.into_signed(signature).into()
        }
        FeeFields::Market {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            let mut tx = TxEip1559 {
                chain_id: unsigned.chain_id,
                nonce: unsigned.nonce,
                gas_limit: unsigned.gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                to: TxKind::Call(unsigned.to),
                value: unsigned.value,
                access_list: Default::default(),
                input: unsigned.data.clone(),
            };
            let signature = signer
                .sign_transaction_sync(&mut tx)
                .map_err(|e| WalletError::Crypto(format!("signing failed: {}", e)))?;
            tx.into_signed(signature).into()
        }
    };

    let raw = envelope.encoded_2718();
    let hash = *envelope.tx_hash();

    Ok(SignedTransaction {
        raw: raw.into(),
        hash,
    })
}

/// Address controlled by a private key.
///
/// Used to verify that a request's `from` matches the supplied key before
/// anything is broadcast.
pub fn address_for_key(private_key: &B256) -> WalletResult<Address> {
    let signer = PrivateKeySigner::from_bytes(private_key)
        .map_err(|e| WalletError::Crypto(format!("invalid private key: {}", e)))?;
    Ok(signer.address())
}
