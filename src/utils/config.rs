//! Wallet Configuration
//!
//! Settings consumed by the key pipeline and the binary:
//! - Network presets (mainnet, testnet)
//! - Mnemonic strength
//! - Derivation paths for the Bitcoin and Ethereum keys
//!
//! Loaded from JSON; missing fields fall back to the mainnet preset.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{WalletError, WalletResult};
use crate::types::Network;
use crate::wallet::derivation_path::DerivationPath;
use crate::wallet::entropy::ENTROPY_BITS;

pub const DEFAULT_BITCOIN_PATH: &str = "m/44'/0'/0'/0/0";
pub const TESTNET_BITCOIN_PATH: &str = "m/44'/1'/0'/0/0";
pub const DEFAULT_ETHEREUM_PATH: &str = "m/44'/60'/0'/0/0";

/// Wallet settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSettings {
    /// Mnemonic strength in bits (128 or 256)
    pub entropy_bits: usize,
    /// Selects address and extended key version bytes
    pub network: Network,
    pub bitcoin_path: String,
    pub ethereum_path: String,
    /// Emit debug log lines
    pub debug_logging: bool,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self::bitcoin()
    }
}

impl WalletSettings {
    /// Mainnet preset
    pub fn bitcoin() -> Self {
        Self {
            entropy_bits: 128,
            network: Network::Mainnet,
            bitcoin_path: DEFAULT_BITCOIN_PATH.to_string(),
            ethereum_path: DEFAULT_ETHEREUM_PATH.to_string(),
            debug_logging: false,
        }
    }

    /// Testnet preset (coin type 1)
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            bitcoin_path: TESTNET_BITCOIN_PATH.to_string(),
            ..Self::bitcoin()
        }
    }

    /// Parse settings from JSON text
    pub fn from_json(text: &str) -> WalletResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> WalletResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            WalletError::config_error(format!("Cannot read {}", path.as_ref().display()))
                .with_details(e.to_string())
        })?;
        Self::from_json(&text)
    }

    /// Validate the settings and return every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !ENTROPY_BITS.contains(&self.entropy_bits) {
            problems.push(format!(
                "entropy_bits must be 128 or 256, got {}",
                self.entropy_bits
            ));
        }

        for (name, path) in [
            ("bitcoin_path", &self.bitcoin_path),
            ("ethereum_path", &self.ethereum_path),
        ] {
            if let Err(e) = path.parse::<DerivationPath>() {
                problems.push(format!("{}: {}", name, e));
            }
        }

        problems
    }

    /// Fail with `ConfigError` listing every problem
    pub fn require_valid(&self) -> WalletResult<()> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(WalletError::config_error("Invalid wallet settings").with_details(problems.join("; ")))
        }
    }
}
