//! Fungible-token (ERC-20) support.
//!
//! Read calls go through [`ChainClient::call`]; transfers are encoded here
//! and sent through the normal transaction path with `value = 0`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::error::{WalletError, WalletResult};

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Static metadata of a token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// Calldata for an ERC-20 `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Read-side client for a token contract.
pub struct Erc20 {
    client: Arc<dyn ChainClient>,
    address: Address,
}

impl Erc20 {
    pub fn new(client: Arc<dyn ChainClient>, address: Address) -> Self {
        Self { client, address }
    }

    /// Token balance of `owner`.
    pub async fn balance_of(&self, owner: Address) -> WalletResult<U256> {
        let data = IERC20::balanceOfCall { owner }.abi_encode();
        let raw = self.client.call(self.address, data.into()).await?;
        IERC20::balanceOfCall::abi_decode_returns(&raw)
            .map_err(|e| decode_error("balanceOf", e))
    }

    /// Fetch the token's static metadata.
    pub async fn info(&self) -> WalletResult<TokenInfo> {
        let name_raw = self
            .client
            .call(self.address, IERC20::nameCall {}.abi_encode().into())
            .await?;
        let symbol_raw = self
            .client
            .call(self.address, IERC20::symbolCall {}.abi_encode().into())
            .await?;
        let decimals_raw = self
            .client
            .call(self.address, IERC20::decimalsCall {}.abi_encode().into())
            .await?;
        let supply_raw = self
            .client
            .call(self.address, IERC20::totalSupplyCall {}.abi_encode().into())
            .await?;

        Ok(TokenInfo {
            address: self.address,
            name: IERC20::nameCall::abi_decode_returns(&name_raw)
                .map_err(|e| decode_error("name", e))?,
            symbol: IERC20::symbolCall::abi_decode_returns(&symbol_raw)
                .map_err(|e| decode_error("symbol", e))?,
            decimals: IERC20::decimalsCall::abi_decode_returns(&decimals_raw)
                .map_err(|e| decode_error("decimals", e))?,
            total_supply: IERC20::totalSupplyCall::abi_decode_returns(&supply_raw)
                .map_err(|e| decode_error("totalSupply", e))?,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl std::fmt::Debug for Erc20 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erc20").field("address", &self.address).finish()
    }
}

fn decode_error(what: &str, e: alloy::sol_types::Error) -> WalletError {
    WalletError::Network(format!("token {} call returned malformed data: {}", what, e))
}
