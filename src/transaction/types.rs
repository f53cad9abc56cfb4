//! Transaction types and fee-model classification.

use alloy::primitives::{Address, Bytes, B256, U256};

use crate::error::{WalletError, WalletResult};

/// Fee fields of a transaction. Exactly one model applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeFields {
    /// Single gas price (pre-fee-market).
    Legacy { gas_price: u128 },
    /// Fee-market pair: max total fee and max priority fee (tip), in wei.
    Market {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl FeeFields {
    /// Classify optional request fields into exactly one fee model.
    ///
    /// Supplying both models, neither, or only half of the fee-market pair is
    /// ambiguous and rejected.
    pub fn classify(
        gas_price: Option<u128>,
        max_fee_per_gas: Option<u128>,
        max_priority_fee_per_gas: Option<u128>,
    ) -> WalletResult<Self> {
        match (gas_price, max_fee_per_gas, max_priority_fee_per_gas) {
            (Some(gas_price), None, None) => Ok(FeeFields::Legacy { gas_price }),
            (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => {
                Ok(FeeFields::Market {
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                })
            }
            (None, None, None) => Err(WalletError::AmbiguousFeeModel(
                "no fee fields supplied".into(),
            )),
            (Some(_), _, _) => Err(WalletError::AmbiguousFeeModel(
                "both legacy and fee-market fields supplied".into(),
            )),
            _ => Err(WalletError::AmbiguousFeeModel(
                "fee-market model requires both max fee and max priority fee".into(),
            )),
        }
    }
}

/// A fully assembled transaction awaiting signature.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: u64,
    pub chain_id: u64,
    pub fee: FeeFields,
}

/// Signed raw transaction bytes plus the transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: B256,
}

impl SignedTransaction {
    /// 0x-prefixed hex rendering of the raw bytes, as nodes expect them.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_legacy() {
        let fee = FeeFields::classify(Some(100), None, None).unwrap();
        assert_eq!(fee, FeeFields::Legacy { gas_price: 100 });
    }

    #[test]
    fn test_classify_market() {
        let fee = FeeFields::classify(None, Some(200), Some(2)).unwrap();
        assert_eq!(
            fee,
            FeeFields::Market {
                max_fee_per_gas: 200,
                max_priority_fee_per_gas: 2,
            }
        );
    }

    #[test]
    fn test_classify_rejects_both_models() {
        let result = FeeFields::classify(Some(100), Some(200), Some(2));
        assert!(matches!(result, Err(WalletError::AmbiguousFeeModel(_))));
    }

    #[test]
    fn test_classify_rejects_neither() {
        let result = FeeFields::classify(None, None, None);
        assert!(matches!(result, Err(WalletError::AmbiguousFeeModel(_))));
    }

    #[test]
    fn test_classify_rejects_partial_pair() {
        let result = FeeFields::classify(None, Some(200), None);
        assert!(matches!(result, Err(WalletError::AmbiguousFeeModel(_))));
        let result = FeeFields::classify(None, None, Some(2));
        assert!(matches!(result, Err(WalletError::AmbiguousFeeModel(_))));
    }
}
