//! BIP32 extended keys and child derivation.
//!
//! An extended key is a secp256k1 key plus a 32-byte chain code. The private
//! variant can derive both hardened and normal children; the public variant
//! can derive normal children only (point addition).

use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, PublicKey, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{WalletError, WalletResult};

type HmacSha512 = Hmac<Sha512>;

/// Offset added to an index for hardened derivation.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC domain-separation key for master key derivation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Version prefix for base58check-serialized private keys (`xprv`).
const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];

/// Version prefix for base58check-serialized public keys (`xpub`).
const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];

/// A BIP32 extended key.
///
/// Invariant: the serialized private form ([`ExtendedKey::xprv`]) is available
/// iff the private key is present.
#[derive(Clone)]
pub struct ExtendedKey {
    secret: Option<SecretKey>,
    public: PublicKey,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl ExtendedKey {
    /// Derive the master key from a 64-byte seed.
    pub fn master_from_seed(seed: &[u8]) -> WalletResult<Self> {
        if seed.len() != 64 {
            return Err(WalletError::Validation(format!(
                "seed must be exactly 64 bytes, got {}",
                seed.len()
            )));
        }

        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| WalletError::Crypto(e.to_string()))?;
        mac.update(seed);
        let digest = mac.finalize().into_bytes();
        let (key_bytes, chain_code_bytes) = digest.split_at(32);

        let secret = SecretKey::from_slice(key_bytes)
            .map_err(|_| WalletError::Crypto("master key outside curve order".into()))?;
        let public = secret.public_key();

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(chain_code_bytes);

        Ok(Self {
            secret: Some(secret),
            public,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
        })
    }

    /// Derive a child key at `index`.
    ///
    /// Hardened derivation requires the private component and fails with a
    /// crypto error without it. `index` must be below [`HARDENED_OFFSET`];
    /// the offset is applied internally when `hardened` is set.
    pub fn derive_child(&self, index: u32, hardened: bool) -> WalletResult<Self> {
        if index >= HARDENED_OFFSET {
            return Err(WalletError::Validation(format!(
                "child index {} exceeds 2^31 - 1",
                index
            )));
        }
        let child_number = if hardened { index + HARDENED_OFFSET } else { index };

        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|e| WalletError::Crypto(e.to_string()))?;
        if hardened {
            let secret = self.secret.as_ref().ok_or_else(|| {
                WalletError::Crypto("hardened derivation requires a private key".into())
            })?;
            mac.update(&[0u8]);
            mac.update(&secret.to_bytes());
        } else {
            mac.update(&self.public_key_compressed());
        }
        mac.update(&child_number.to_be_bytes());
        let digest = mac.finalize().into_bytes();
        let (tweak_bytes, chain_code_bytes) = digest.split_at(32);

        let tweak = SecretKey::from_slice(tweak_bytes)
            .map_err(|_| WalletError::Crypto("derived tweak outside curve order".into()))?;

        let (secret, public) = match &self.secret {
            Some(parent_secret) => {
                let child_scalar =
                    *tweak.to_nonzero_scalar() + *parent_secret.to_nonzero_scalar();
                let child_secret = SecretKey::from_bytes(&child_scalar.to_bytes())
                    .map_err(|_| WalletError::Crypto("derived child key is zero".into()))?;
                let public = child_secret.public_key();
                (Some(child_secret), public)
            }
            None => {
                let child_point = ProjectivePoint::GENERATOR * *tweak.to_nonzero_scalar()
                    + self.public.to_projective();
                let public = PublicKey::from_affine(child_point.to_affine())
                    .map_err(|_| WalletError::Crypto("derived child point is invalid".into()))?;
                (None, public)
            }
        };

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(chain_code_bytes);

        Ok(Self {
            secret,
            public,
            chain_code,
            depth: self.depth + 1,
            parent_fingerprint: self.fingerprint(),
            child_number,
        })
    }

    /// Whether this key carries private material.
    pub fn has_private(&self) -> bool {
        self.secret.is_some()
    }

    /// Private key bytes, if present.
    pub fn private_key_bytes(&self) -> Option<[u8; 32]> {
        self.secret.as_ref().map(|s| s.to_bytes().into())
    }

    /// Public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Compressed SEC1 public key (33 bytes).
    pub fn public_key_compressed(&self) -> Vec<u8> {
        self.public.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Uncompressed SEC1 public key (65 bytes, leading 0x04).
    pub fn public_key_uncompressed(&self) -> Vec<u8> {
        self.public.to_encoded_point(false).as_bytes().to_vec()
    }

    /// First 4 bytes of hash160 of the compressed public key.
    fn fingerprint(&self) -> [u8; 4] {
        let digest = hash160(&self.public_key_compressed());
        let mut fp = [0u8; 4];
        fp.copy_from_slice(&digest[..4]);
        fp
    }

    /// Serialized private form (base58check `xprv...`).
    ///
    /// Fails with a crypto error when no private component is present.
    pub fn xprv(&self) -> WalletResult<String> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| WalletError::Crypto("no private component to serialize".into()))?;

        let mut key_field = [0u8; 33];
        key_field[1..].copy_from_slice(&secret.to_bytes());
        Ok(self.serialize(XPRV_VERSION, &key_field))
    }

    /// Serialized public form (base58check `xpub...`).
    pub fn xpub(&self) -> String {
        let mut key_field = [0u8; 33];
        key_field.copy_from_slice(&self.public_key_compressed());
        self.serialize(XPUB_VERSION, &key_field)
    }

    /// version ‖ depth ‖ parent fingerprint ‖ child number ‖ chain code ‖ key,
    /// base58-encoded with a 4-byte double-SHA256 checksum.
    fn serialize(&self, version: [u8; 4], key_field: &[u8; 33]) -> String {
        let mut payload = Vec::with_capacity(78);
        payload.extend_from_slice(&version);
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child_number.to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        payload.extend_from_slice(key_field);
        bs58::encode(payload).with_check().into_string()
    }
}

/// RIPEMD160(SHA256(data)).
fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("has_private", &self.has_private())
            .finish()
    }
}
