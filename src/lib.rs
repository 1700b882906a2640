//! HD Wallet Core Library
//!
//! Deterministic key generation for Bitcoin and Ethereum.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: Entropy, BIP-39 mnemonics and seeds, the BIP-32 key tree,
//!   derivation paths, address encoding and the key pipeline
//! - **crypto**: secp256k1 private/public key codec and recoverable signatures
//! - **utils**: Hash/Base58Check primitives, logging, configuration
//!
//! # Security
//!
//! This crate uses `zeroize` to securely clear sensitive data from memory.
//! Mnemonics, seeds, entropy and intermediate HMAC output are zeroed when dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use hdwallet_core::{wallet, WalletSettings};
//!
//! let (mnemonic, keys) = wallet::create_new_wallet(&WalletSettings::bitcoin())?;
//! println!("Mnemonic: {}", mnemonic.as_str());
//! println!("Bitcoin address: {}", keys.bitcoin.address);
//! ```

pub mod crypto;
pub mod error;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use crypto::{PrivateKey, PublicKey, RecoverableSignature};
pub use error::{ErrorCode, WalletError, WalletResult};
pub use types::*;
pub use utils::config::WalletSettings;

// Re-export wallet functions
pub use wallet::{
    create_new_wallet, restore_from_mnemonic, validate_mnemonic, DerivationPath, ExtendedKey,
    Mnemonic, Seed,
};

// Re-export encoding utilities for binaries and tests
pub use utils::crypto::{keccak256, to_checksum_address};
