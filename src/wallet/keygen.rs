//! Key Generation
//!
//! Creates wallets from fresh entropy or restores them from a mnemonic phrase,
//! then derives the configured Bitcoin and Ethereum keys.
//!
//! SECURITY: Entropy and seeds are zeroized on drop.

use crate::crypto::PrivateKey;
use crate::error::{WalletError, WalletResult};
use crate::log_debug;
use crate::types::{BitcoinKeys, EthereumKeys, Network, WalletKeys};
use crate::utils::config::WalletSettings;

use super::address::{eip55_address, p2pkh_address};
use super::derivation::ExtendedKey;
use super::entropy::{EntropySource, OsEntropy};
use super::mnemonic::{generate_mnemonic_with, seed_from_mnemonic, validate_mnemonic, Mnemonic, Seed};

/// Create a new wallet from OS randomness with an empty passphrase
pub fn create_new_wallet(settings: &WalletSettings) -> WalletResult<(Mnemonic, WalletKeys)> {
    create_wallet_with(settings, "", &mut OsEntropy)
}

/// Create a new wallet drawing entropy from `source`
pub fn create_wallet_with<S: EntropySource + ?Sized>(
    settings: &WalletSettings,
    passphrase: &str,
    source: &mut S,
) -> WalletResult<(Mnemonic, WalletKeys)> {
    settings.require_valid()?;

    let mnemonic = generate_mnemonic_with(settings.entropy_bits, source)?;
    let seed = mnemonic.to_seed(passphrase)?;
    let keys = derive_wallet_keys(&seed, settings)?;

    Ok((mnemonic, keys))
}

/// Restore wallet keys from a mnemonic phrase and optional passphrase.
///
/// The phrase checksum is verified before anything is derived.
pub fn restore_from_mnemonic(
    phrase: &str,
    passphrase: &str,
    settings: &WalletSettings,
) -> WalletResult<WalletKeys> {
    settings.require_valid()?;
    validate_mnemonic(phrase)?;

    let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let seed = seed_from_mnemonic(&normalized, passphrase)?;
    derive_wallet_keys(&seed, settings)
}

/// Derive the configured key bundle from a seed
pub fn derive_wallet_keys(seed: &Seed, settings: &WalletSettings) -> WalletResult<WalletKeys> {
    let network = settings.network;
    let master = ExtendedKey::new_master(seed)?;

    let bitcoin = derive_bitcoin_keys(&master, &settings.bitcoin_path, network)?;
    let ethereum = derive_ethereum_keys(&master, &settings.ethereum_path)?;

    log_debug!(
        "wallet::keygen",
        "Derived wallet keys",
        network = network.name(),
        bitcoin_address = bitcoin.address,
        ethereum_address = ethereum.address,
    );

    Ok(WalletKeys {
        network,
        master_xpub: master.neuter().to_base58(network),
        bitcoin,
        ethereum,
    })
}

fn derive_bitcoin_keys(master: &ExtendedKey, path: &str, network: Network) -> WalletResult<BitcoinKeys> {
    let node = master.derive_path(path)?;
    let private_key = node_private_key(&node)?;
    let public_key = node.public_key();

    Ok(BitcoinKeys {
        path: path.to_string(),
        private_hex: private_key.to_hex(),
        // Matches the uncompressed P2PKH address
        private_wif: private_key.to_wif(network, false),
        public_compressed_hex: hex::encode(public_key.serialize_compressed()),
        public_uncompressed_hex: hex::encode(public_key.serialize_uncompressed()),
        address: p2pkh_address(public_key, network),
    })
}

fn derive_ethereum_keys(master: &ExtendedKey, path: &str) -> WalletResult<EthereumKeys> {
    let node = master.derive_path(path)?;
    let private_key = node_private_key(&node)?;
    let public_key = node.public_key();

    Ok(EthereumKeys {
        path: path.to_string(),
        private_hex: private_key.to_hex(),
        public_uncompressed_hex: hex::encode(public_key.serialize_uncompressed()),
        address: eip55_address(public_key),
    })
}

fn node_private_key(node: &ExtendedKey) -> WalletResult<&PrivateKey> {
    node.private_key()
        .ok_or_else(|| WalletError::internal("Derived node has no private key"))
}
