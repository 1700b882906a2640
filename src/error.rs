//! Unified error types for the derivation core
//!
//! Every derivation and encoding function returns `WalletResult`; nothing is
//! retried or auto-corrected on the caller's behalf.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all wallet operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_entropy_length(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidEntropyLength, msg)
    }

    pub fn random_source_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RandomSourceFailure, msg)
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPath, msg)
    }

    /// The caller should retry with the next index.
    pub fn derivation_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DerivationInvalid, msg)
    }

    pub fn hardened_from_public(index: u32) -> Self {
        Self::new(
            ErrorCode::HardenedFromPublicKey,
            "Hardened child cannot be derived from a public-only key",
        )
        .with_details(format!("index: {:#010x}", index))
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn invalid_extended_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidExtendedKey, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Mnemonic and entropy errors
    InvalidEntropyLength,
    RandomSourceFailure,
    InvalidMnemonic,

    // Derivation errors
    InvalidPath,
    DerivationInvalid,
    HardenedFromPublicKey,
    InvalidExtendedKey,

    // Key codec errors
    InvalidPrivateKeyLength,
    InvalidPrivateKeyValue,
    InvalidPublicKeyEncoding,
    InvalidPoint,
    InvalidDigest,

    // Address errors
    InvalidAddressLength,
    InvalidAddressPrefix,
    InvalidAddress,

    // Parse and configuration errors
    ConfigError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

// Conversions from common error types

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(e: hex::FromHexError) -> Self {
        WalletError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::new(ErrorCode::Internal, e.to_string())
    }
}
