//! Address Encoding
//!
//! Two independent formats derived from a public key:
//! - Bitcoin P2PKH: Base58Check(version ‖ HASH160(pubkey))
//! - Ethereum: last 20 bytes of Keccak-256(x ‖ y), EIP-55 mixed case

use crate::crypto::PublicKey;
use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::log_debug;
use crate::types::Network;
use crate::utils::crypto::{base58check_decode, base58check_encode, hash160, keccak256, to_checksum_address};

/// Decoded P2PKH payload length (version + HASH160)
pub const P2PKH_PAYLOAD_LEN: usize = 21;

/// `0x` plus 40 hex digits
pub const ETH_ADDRESS_LEN: usize = 42;

// =============================================================================
// Bitcoin P2PKH
// =============================================================================

/// P2PKH address over the uncompressed public key encoding
pub fn p2pkh_address(public_key: &PublicKey, network: Network) -> String {
    p2pkh_from_bytes(&public_key.serialize_uncompressed(), network)
}

/// P2PKH address over the compressed public key encoding
pub fn p2pkh_address_compressed(public_key: &PublicKey, network: Network) -> String {
    p2pkh_from_bytes(&public_key.serialize_compressed(), network)
}

fn p2pkh_from_bytes(encoded_key: &[u8], network: Network) -> String {
    let mut payload = Vec::with_capacity(P2PKH_PAYLOAD_LEN);
    payload.push(network.p2pkh_version());
    payload.extend_from_slice(&hash160(encoded_key));

    log_debug!(
        "wallet::address",
        "Encoded P2PKH address",
        network = network.name(),
        key_len = encoded_key.len(),
    );
    base58check_encode(&payload)
}

/// Decode a P2PKH address and return its 20-byte public key hash.
///
/// Checks checksum, payload length and the network's version byte.
pub fn validate_p2pkh_address(address: &str, network: Network) -> WalletResult<[u8; 20]> {
    let payload = base58check_decode(address.trim())?;

    if payload.len() != P2PKH_PAYLOAD_LEN {
        return Err(WalletError::new(
            ErrorCode::InvalidAddressLength,
            "P2PKH payload must be 21 bytes",
        )
        .with_details(format!("got {} bytes", payload.len())));
    }

    if payload[0] != network.p2pkh_version() {
        return Err(WalletError::new(
            ErrorCode::InvalidAddressPrefix,
            format!("Address is not a {} P2PKH address", network.name()),
        )
        .with_details(format!("version byte {:#04x}", payload[0])));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

// =============================================================================
// Ethereum EIP-55
// =============================================================================

/// Checksummed Ethereum address for `public_key`
pub fn eip55_address(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    // Drop the 0x04 prefix
    let hash = keccak256(&uncompressed[1..]);

    log_debug!("wallet::address", "Encoded EIP-55 address");
    to_checksum_address(&hash[12..])
}

/// Re-case a `0x`-prefixed 40-hex-digit address per EIP-55
pub fn eip55_checksum(address: &str) -> WalletResult<String> {
    if address.len() != ETH_ADDRESS_LEN {
        return Err(WalletError::new(
            ErrorCode::InvalidAddressLength,
            "Ethereum address must be 42 characters",
        )
        .with_details(format!("got {} characters", address.len())));
    }

    let digits = address.strip_prefix("0x").ok_or_else(|| {
        WalletError::new(ErrorCode::InvalidAddressPrefix, "Ethereum address must start with 0x")
    })?;

    let bytes = hex::decode(digits)
        .map_err(|e| WalletError::invalid_address("Ethereum address is not hex").with_details(e.to_string()))?;

    Ok(to_checksum_address(&bytes))
}

/// True when `address` already carries the correct EIP-55 casing
pub fn is_eip55_checksummed(address: &str) -> bool {
    eip55_checksum(address).map(|checked| checked == address).unwrap_or(false)
}
