//! secp256k1 Key Codec
//!
//! Private scalars and public points with their byte encodings:
//! - 32-byte big-endian private scalar
//! - 33-byte compressed and 65-byte uncompressed public points
//! - Recoverable ECDSA over a pre-hashed 32-byte digest
//!
//! The curve context is built once and shared read-only.

use lazy_static::lazy_static;
use secp256k1::ecdsa::{RecoverableSignature as SecpRecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey as SecpPublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::types::Network;
use crate::utils::crypto::base58check_encode;

lazy_static! {
    /// Shared signing + verification context
    pub(crate) static ref SECP: Secp256k1<All> = Secp256k1::new();
}

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

// =============================================================================
// Private Key
// =============================================================================

/// A private scalar `D` with `0 < D < n`
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Parse a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(WalletError::new(
                ErrorCode::InvalidPrivateKeyLength,
                "Private key must be 32 bytes",
            )
            .with_details(format!("got {} bytes", bytes.len())));
        }

        if bytes.iter().all(|b| *b == 0) {
            return Err(WalletError::new(
                ErrorCode::InvalidPrivateKeyValue,
                "Private key must not be zero",
            ));
        }

        let secret = SecretKey::from_slice(bytes).map_err(|_| {
            WalletError::new(
                ErrorCode::InvalidPrivateKeyValue,
                "Private key must be below the curve order",
            )
        })?;

        Ok(Self { secret })
    }

    /// Parse hex, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> WalletResult<Self> {
        let trimmed = text.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(stripped)?);
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_secret(secret: SecretKey) -> Self {
        Self { secret }
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Fixed 32-byte big-endian serialization (left-padded)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// `0x`-prefixed lowercase hex of the scalar
    pub fn to_hex(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        format!("0x{}", hex::encode(bytes.as_ref()))
    }

    /// Public point `D·G`
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: SecpPublicKey::from_secret_key(&SECP, &self.secret),
        }
    }

    /// Wallet Import Format
    pub fn to_wif(&self, network: Network, compressed: bool) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(network.wif_version());
        payload.extend_from_slice(&self.secret.secret_bytes());
        if compressed {
            payload.push(0x01);
        }
        base58check_encode(&payload)
    }

    /// Sign a 32-byte digest; the digest is not hashed again.
    pub fn sign_digest(&self, digest: &[u8]) -> WalletResult<RecoverableSignature> {
        let message = digest_message(digest)?;
        let signature = SECP.sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Ok(RecoverableSignature {
            r,
            s,
            recovery_id: recovery_id.to_i32() as u8,
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Public Key
// =============================================================================

/// A curve point; never the point at infinity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    inner: SecpPublicKey,
}

impl PublicKey {
    /// Parse a 33-byte compressed or 65-byte uncompressed encoding.
    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        let well_formed = matches!(
            (bytes.len(), bytes.first().copied()),
            (COMPRESSED_PUBLIC_KEY_SIZE, Some(0x02 | 0x03)) | (UNCOMPRESSED_PUBLIC_KEY_SIZE, Some(0x04))
        );
        if !well_formed {
            return Err(WalletError::new(
                ErrorCode::InvalidPublicKeyEncoding,
                "Public key must be 33 bytes with prefix 0x02/0x03 or 65 bytes with prefix 0x04",
            )
            .with_details(format!(
                "len={} prefix={}",
                bytes.len(),
                bytes.first().map(|b| format!("{:#04x}", b)).unwrap_or_else(|| "none".into())
            )));
        }

        if bytes[1..].iter().all(|b| *b == 0) {
            return Err(WalletError::new(ErrorCode::InvalidPoint, "Point at infinity"));
        }

        let inner = SecpPublicKey::from_slice(bytes).map_err(|e| {
            WalletError::new(ErrorCode::InvalidPoint, "Point is not on the curve")
                .with_details(e.to_string())
        })?;

        Ok(Self { inner })
    }

    /// Parse hex, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> WalletResult<Self> {
        let trimmed = text.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        Self::from_bytes(&hex::decode(stripped)?)
    }

    pub(crate) fn from_inner(inner: SecpPublicKey) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &SecpPublicKey {
        &self.inner
    }

    /// `0x02`/`0x03` parity prefix followed by the 32-byte x coordinate
    pub fn serialize_compressed(&self) -> [u8; 33] {
        self.inner.serialize()
    }

    /// `0x04` followed by the 32-byte x and y coordinates
    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        self.inner.serialize_uncompressed()
    }

    /// Affine coordinates as big-endian 32-byte buffers
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let raw = self.serialize_uncompressed();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&raw[1..33]);
        y.copy_from_slice(&raw[33..]);
        (x, y)
    }

    /// Compressed encoding as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize_compressed())
    }

    /// Recover the signer of `digest` from a recoverable signature.
    pub fn recover(digest: &[u8], signature: &RecoverableSignature) -> WalletResult<Self> {
        let message = digest_message(digest)?;
        let recovery_id = RecoveryId::from_i32(signature.recovery_id as i32).map_err(|e| {
            WalletError::new(ErrorCode::InvalidDigest, "Invalid recovery id").with_details(e.to_string())
        })?;
        let sig = SecpRecoverableSignature::from_compact(&signature.to_compact(), recovery_id)
            .map_err(|e| {
                WalletError::new(ErrorCode::InvalidDigest, "Malformed signature").with_details(e.to_string())
            })?;
        let inner = SECP.recover_ecdsa(&message, &sig).map_err(|e| {
            WalletError::new(ErrorCode::InvalidPoint, "Public key recovery failed")
                .with_details(e.to_string())
        })?;
        Ok(Self { inner })
    }
}

// =============================================================================
// Signature
// =============================================================================

/// ECDSA signature with the recovery bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// `r ‖ s`
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// `r ‖ s ‖ v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.to_compact());
        out[64] = self.recovery_id;
        out
    }
}

fn digest_message(digest: &[u8]) -> WalletResult<Message> {
    let digest: [u8; 32] = digest.try_into().map_err(|_| {
        WalletError::new(ErrorCode::InvalidDigest, "Digest must be 32 bytes")
            .with_details(format!("got {} bytes", digest.len()))
    })?;
    Ok(Message::from_digest(digest))
}
