//! Address rendering and validation.

use alloy::primitives::{keccak256, Address};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;

/// Compute the account address for a public key: the last 20 bytes of
/// keccak-256 over the uncompressed point without its 0x04 format byte.
pub fn address_from_public_key(public: &PublicKey) -> Address {
    let point = public.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Render an address with the EIP-55 mixed-case checksum.
///
/// A hex digit is uppercased when the corresponding nibble of
/// keccak256(lowercase address text) is >= 8.
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            digest[i / 2] >> 4
        } else {
            digest[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether `s` is a 0x-prefixed 40-hex-digit address.
pub fn is_valid_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_eip55_known_vectors() {
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for expected in cases {
            let address = Address::from_str(&expected.to_lowercase()).unwrap();
            assert_eq!(to_checksum_address(&address), expected);
        }
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        ));
        assert!(!is_valid_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("0x5aaeb6053f3e94c9"));
        assert!(!is_valid_address(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaeg"
        ));
    }
}
