//! Wallet Module
//!
//! Entropy, BIP-39 mnemonics and seeds, the BIP-32 key tree, derivation
//! paths, address encoding and the end-to-end key pipeline.

pub mod address;
pub mod derivation;
pub mod derivation_path;
pub mod entropy;
pub mod keygen;
pub mod mnemonic;

pub use address::{
    eip55_address, eip55_checksum, is_eip55_checksummed, p2pkh_address, p2pkh_address_compressed,
    validate_p2pkh_address,
};
pub use derivation::ExtendedKey;
pub use derivation_path::{ChildNumber, DerivationPath, PathError, HARDENED};
pub use entropy::{generate_entropy, EntropySource, OsEntropy};
pub use keygen::{create_new_wallet, create_wallet_with, derive_wallet_keys, restore_from_mnemonic};
pub use mnemonic::{
    entropy_to_mnemonic, generate_mnemonic, generate_mnemonic_with, mnemonic_to_entropy,
    seed_from_mnemonic, validate_mnemonic, Mnemonic, Seed,
};
