//! BIP39 mnemonic generation and seed derivation.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{WalletError, WalletResult};

/// Generate a mnemonic phrase with the given word count (12 or 24).
///
/// Entropy bits follow BIP39: `words * 11 - words / 3` (128 for 12 words,
/// 256 for 24), drawn from the operating system's CSPRNG.
pub fn generate_mnemonic(language: Language, word_count: usize) -> WalletResult<String> {
    if word_count != 12 && word_count != 24 {
        return Err(WalletError::Validation(format!(
            "word count must be 12 or 24, got {}",
            word_count
        )));
    }

    let entropy_bits = word_count * 11 - word_count / 3;
    let mut entropy = vec![0u8; entropy_bits / 8];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy_in(language, &entropy)
        .map_err(|e| WalletError::Crypto(format!("mnemonic encoding failed: {}", e)))?;

    Ok(mnemonic.to_string())
}

/// Derive the 64-byte seed from a mnemonic and optional passphrase.
///
/// The mnemonic's checksum is validated against the wordlist before the
/// 2048-round PBKDF2-HMAC-SHA512 stretch.
pub fn seed_from_mnemonic(
    language: Language,
    mnemonic: &str,
    passphrase: &str,
) -> WalletResult<[u8; 64]> {
    let trimmed = mnemonic.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Validation("mnemonic cannot be empty".into()));
    }

    let parsed = Mnemonic::parse_in_normalized(language, trimmed)
        .map_err(|e| WalletError::Validation(format!("invalid mnemonic: {}", e)))?;

    Ok(parsed.to_seed(passphrase))
}
