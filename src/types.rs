//! Shared types
//!
//! Data structures that cross module boundaries or leave the crate as JSON.

use serde::{Deserialize, Serialize};

// =============================================================================
// Network
// =============================================================================

/// Bitcoin network selector for version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// P2PKH address version byte
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6F,
        }
    }

    /// WIF private key version byte
    pub fn wif_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xEF,
        }
    }

    /// BIP-32 version bytes for extended private keys (xprv / tprv)
    pub fn xprv_version(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    /// BIP-32 version bytes for extended public keys (xpub / tpub)
    pub fn xpub_version(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xB2, 0x1E],
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

// =============================================================================
// Derived Key Bundles
// =============================================================================

/// Everything the pipeline derives from one mnemonic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletKeys {
    pub network: Network,
    pub master_xpub: String,
    pub bitcoin: BitcoinKeys,
    pub ethereum: EthereumKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinKeys {
    pub path: String,
    pub private_hex: String,
    pub private_wif: String,
    pub public_compressed_hex: String,
    pub public_uncompressed_hex: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumKeys {
    pub path: String,
    pub private_hex: String,
    pub public_uncompressed_hex: String,
    pub address: String,
}
