//! BIP44 account derivation for the engine's coin type.
//!
//! Path layout: m/44'/60'/account'/change/index. The first three levels are
//! hardened, the last two are not, so account-level extended public keys can
//! derive receive addresses without private material.

use alloy::primitives::{Bytes, B256};
use bip39::Language;

use crate::error::{WalletError, WalletResult};
use crate::keys::address::{address_from_public_key, to_checksum_address};
use crate::keys::extended::ExtendedKey;
use crate::keys::mnemonic;

const BIP44_PURPOSE: u32 = 44;
const ETH_COIN_TYPE: u32 = 60;

/// A fully derived signing key.
#[derive(Clone)]
pub struct DerivedKey {
    /// 32-byte private key.
    pub private_key: B256,
    /// Uncompressed SEC1 public key (65 bytes).
    pub public_key: Bytes,
    /// EIP-55 checksummed address.
    pub address: String,
    /// Derivation path, e.g. `m/44'/60'/0'/0/0`.
    pub path: String,
}

// Private keys must never appear in logs.
impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("private_key", &"<redacted>")
            .field("address", &self.address)
            .field("path", &self.path)
            .finish()
    }
}

/// Hierarchical-deterministic wallet engine.
///
/// Holds the wordlist selection; all other state is the caller's. Derivation
/// is pure and needs no network access.
#[derive(Debug, Clone)]
pub struct HdWallet {
    language: Language,
}

impl Default for HdWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl HdWallet {
    pub fn new() -> Self {
        Self {
            language: Language::English,
        }
    }

    /// Generate a mnemonic phrase with 12 or 24 words.
    pub fn generate_mnemonic(&self, word_count: usize) -> WalletResult<String> {
        mnemonic::generate_mnemonic(self.language, word_count)
    }

    /// Derive the 64-byte seed from a mnemonic and optional passphrase.
    pub fn seed_from_mnemonic(&self, phrase: &str, passphrase: &str) -> WalletResult<[u8; 64]> {
        mnemonic::seed_from_mnemonic(self.language, phrase, passphrase)
    }

    /// Derive the BIP32 master key from a 64-byte seed.
    pub fn master_from_seed(&self, seed: &[u8]) -> WalletResult<ExtendedKey> {
        ExtendedKey::master_from_seed(seed)
    }

    /// Derive the key at m/44'/60'/account'/change/index.
    pub fn derive_key(
        &self,
        root: &ExtendedKey,
        account: u32,
        change: u32,
        index: u32,
    ) -> WalletResult<DerivedKey> {
        let leaf = self
            .account_key(root, account)?
            .derive_child(change, false)?
            .derive_child(index, false)?;

        let private_key = leaf
            .private_key_bytes()
            .ok_or_else(|| WalletError::Crypto("derived key lost private material".into()))?;
        let address = address_from_public_key(leaf.public_key());

        Ok(DerivedKey {
            private_key: B256::from(private_key),
            public_key: Bytes::from(leaf.public_key_uncompressed()),
            address: to_checksum_address(&address),
            path: bip44_path(account, change, index),
        })
    }

    /// Derive the account-level extended key at m/44'/60'/account'.
    ///
    /// The returned key serializes to both forms; hand out
    /// [`ExtendedKey::xpub`] for watch-only derivation.
    pub fn derive_account_xpub(
        &self,
        root: &ExtendedKey,
        account: u32,
    ) -> WalletResult<ExtendedKey> {
        self.account_key(root, account)
    }

    fn account_key(&self, root: &ExtendedKey, account: u32) -> WalletResult<ExtendedKey> {
        if !root.has_private() {
            return Err(WalletError::Crypto(
                "root key must carry private material".into(),
            ));
        }
        root.derive_child(BIP44_PURPOSE, true)?
            .derive_child(ETH_COIN_TYPE, true)?
            .derive_child(account, true)
    }
}

/// Render a BIP44 path string.
pub fn bip44_path(account: u32, change: u32, index: u32) -> String {
    format!("m/44'/{}'/{}'/{}/{}", ETH_COIN_TYPE, account, change, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    fn root() -> ExtendedKey {
        let wallet = HdWallet::new();
        let seed = wallet.seed_from_mnemonic(TEST_MNEMONIC, "").unwrap();
        wallet.master_from_seed(&seed).unwrap()
    }

    #[test]
    fn test_known_first_address() {
        let wallet = HdWallet::new();
        let key = wallet.derive_key(&root(), 0, 0, 0).unwrap();

        assert_eq!(key.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(
            format!("0x{}", hex::encode(key.private_key)),
            "0x1837c1be8e2995ec11cda2b066151be2cfb48adf9e47b151d46adab3a21cdf67"
        );
        assert_eq!(key.path, "m/44'/60'/0'/0/0");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let wallet = HdWallet::new();
        let a = wallet.derive_key(&root(), 0, 0, 3).unwrap();
        let b = wallet.derive_key(&root(), 0, 0, 3).unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(a.private_key, b.private_key);
    }

    #[test]
    fn test_distinct_paths_distinct_addresses() {
        let wallet = HdWallet::new();
        let root = root();

        let tuples = [(0, 0, 0), (0, 0, 1), (0, 1, 0), (1, 0, 0)];
        let mut addresses: Vec<String> = tuples
            .iter()
            .map(|&(a, c, i)| wallet.derive_key(&root, a, c, i).unwrap().address)
            .collect();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), tuples.len());
    }

    #[test]
    fn test_account_xpub_shape() {
        let wallet = HdWallet::new();
        let account = wallet.derive_account_xpub(&root(), 0).unwrap();

        let xpub = account.xpub();
        assert!(xpub.starts_with("xpub"));
        // version(4) + depth(1) + fingerprint(4) + child(4) + chain(32) + key(33)
        let decoded = bs58::decode(&xpub).with_check(None).into_vec().unwrap();
        assert_eq!(decoded.len(), 78);
        assert_eq!(decoded[4], 3); // account level sits at depth 3
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let wallet = HdWallet::new();
        let key = wallet.derive_key(&root(), 0, 0, 0).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("1837c1be"));
    }
}
