//! Hash and Encoding Primitives
//!
//! Digest helpers shared by the key tree and the address encoders, plus
//! Base58Check framing.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use tiny_keccak::{Hasher, Keccak};

use crate::error::{WalletError, WalletResult};

type HmacSha512 = Hmac<Sha512>;

/// Length of the Base58Check checksum suffix
pub const CHECKSUM_LEN: usize = 4;

/// Single SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice (Bitcoin checksums)
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// Keccak256 hash (used for Ethereum addresses)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// HMAC-SHA512 keyed with `key`
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> WalletResult<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| WalletError::internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(data);

    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Append a 4-byte double-SHA256 checksum and Base58-encode.
///
/// Leading zero bytes are kept as leading `'1'` characters.
pub fn base58check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut full = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    full.extend_from_slice(payload);
    full.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(full).into_string()
}

/// Decode Base58Check text and verify the trailing checksum.
pub fn base58check_decode(encoded: &str) -> WalletResult<Vec<u8>> {
    let mut data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| WalletError::invalid_address(format!("Invalid Base58: {}", e)))?;

    if data.len() <= CHECKSUM_LEN {
        return Err(WalletError::invalid_address("Base58Check payload too short")
            .with_details(format!("{} bytes", data.len())));
    }

    let split = data.len() - CHECKSUM_LEN;
    let expected = sha256d(&data[..split]);
    if !bool::from(data[split..].ct_eq(&expected[..CHECKSUM_LEN])) {
        return Err(WalletError::invalid_address("Base58Check checksum mismatch"));
    }

    data.truncate(split);
    Ok(data)
}

/// Convert raw address bytes to an EIP-55 checksummed Ethereum address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::with_capacity(2 + lower.len());
    result.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() || nibble < 8 {
            result.push(ch);
        } else {
            result.push(ch.to_ascii_uppercase());
        }
    }

    result
}
