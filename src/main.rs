//! hdwallet command line
//!
//! Generates and restores BIP-39/BIP-32 wallets, derives child keys from
//! extended keys and encodes addresses.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use hdwallet_core::utils::config::WalletSettings;
use hdwallet_core::utils::logging;
use hdwallet_core::wallet::{
    self, eip55_address, eip55_checksum, p2pkh_address, ExtendedKey, OsEntropy,
};
use hdwallet_core::{log_info, log_warn, Network, PublicKey, WalletKeys};

/// BIP-39 / BIP-32 key generator
#[derive(Parser)]
#[command(name = "hdwallet", version, about)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit debug log lines on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new mnemonic and derive its keys
    Generate {
        /// Mnemonic length (12 or 24)
        #[arg(long)]
        words: Option<usize>,
        #[arg(long, default_value = "")]
        passphrase: String,
        #[arg(long)]
        testnet: bool,
    },
    /// Derive keys from an existing mnemonic
    Restore {
        #[arg(long)]
        mnemonic: String,
        #[arg(long, default_value = "")]
        passphrase: String,
        #[arg(long)]
        testnet: bool,
    },
    /// Derive a child from an xprv/xpub
    Derive {
        #[arg(long)]
        xkey: String,
        #[arg(long)]
        path: String,
    },
    /// Encode a public key as an address
    Address {
        /// Compressed or uncompressed public key hex
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        testnet: bool,
        /// EIP-55 Ethereum address instead of P2PKH
        #[arg(long)]
        ethereum: bool,
    },
    /// Apply EIP-55 casing to an Ethereum address
    Checksum { address: String },
}

#[derive(Serialize)]
struct GenerateOutput {
    mnemonic: String,
    #[serde(flatten)]
    keys: WalletKeys,
}

#[derive(Serialize)]
struct DeriveOutput {
    path: String,
    depth: u8,
    extended_key: String,
    public_key: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    if cli.verbose || settings.debug_logging {
        logging::enable_debug();
    }

    match cli.command {
        Commands::Generate {
            words,
            passphrase,
            testnet,
        } => {
            let mut settings = with_network(settings, testnet, cli.config.is_some());
            if let Some(words) = words {
                settings.entropy_bits = match words {
                    12 => 128,
                    24 => 256,
                    other => bail!("--words must be 12 or 24, got {}", other),
                };
            }

            let (mnemonic, keys) = wallet::create_wallet_with(&settings, &passphrase, &mut OsEntropy)?;
            let output = GenerateOutput {
                mnemonic: mnemonic.as_str().to_string(),
                keys,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Mnemonic: {}", output.mnemonic);
                print_keys(&output.keys);
            }
        }
        Commands::Restore {
            mnemonic,
            passphrase,
            testnet,
        } => {
            let settings = with_network(settings, testnet, cli.config.is_some());
            let keys = wallet::restore_from_mnemonic(&mnemonic, &passphrase, &settings)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else {
                print_keys(&keys);
            }
        }
        Commands::Derive { xkey, path } => {
            let (parent, network) = ExtendedKey::from_base58(&xkey)?;
            let child = parent.derive_path(&path)?;
            let output = DeriveOutput {
                path,
                depth: child.depth(),
                extended_key: child.to_base58(network),
                public_key: child.public_key().to_hex(),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", output.extended_key);
            }
        }
        Commands::Address {
            public_key,
            testnet,
            ethereum,
        } => {
            let key = PublicKey::from_hex(&public_key)?;
            let address = if ethereum {
                eip55_address(&key)
            } else {
                let network = if testnet { Network::Testnet } else { settings.network };
                p2pkh_address(&key, network)
            };
            println!("{}", address);
        }
        Commands::Checksum { address } => {
            println!("{}", eip55_checksum(&address)?);
        }
    }

    Ok(())
}

fn load_settings(path: Option<&str>) -> Result<WalletSettings> {
    let settings = match path {
        Some(path) => {
            let settings = WalletSettings::from_file(path)
                .with_context(|| format!("loading settings from {}", path))?;
            log_info!("cli", "Loaded settings", config = path, network = settings.network.name());
            settings
        }
        None => WalletSettings::bitcoin(),
    };
    settings.require_valid()?;
    Ok(settings)
}

/// `--testnet` switches to the testnet preset unless a config file chose the paths
fn with_network(settings: WalletSettings, testnet: bool, from_file: bool) -> WalletSettings {
    match (testnet, from_file) {
        (false, _) => settings,
        (true, true) => {
            log_warn!(
                "cli",
                "--testnet keeps the derivation paths from the config file",
                bitcoin_path = settings.bitcoin_path,
            );
            WalletSettings {
                network: Network::Testnet,
                ..settings
            }
        }
        (true, false) => WalletSettings {
            entropy_bits: settings.entropy_bits,
            debug_logging: settings.debug_logging,
            ..WalletSettings::testnet()
        },
    }
}

fn print_keys(keys: &WalletKeys) {
    println!("Network: {}", keys.network.name());
    println!("Master xpub: {}", keys.master_xpub);
    println!();
    println!("Bitcoin ({})", keys.bitcoin.path);
    println!("  Address:            {}", keys.bitcoin.address);
    println!("  Private key (hex):  {}", keys.bitcoin.private_hex);
    println!("  Private key (WIF):  {}", keys.bitcoin.private_wif);
    println!("  Public key:         {}", keys.bitcoin.public_compressed_hex);
    println!();
    println!("Ethereum ({})", keys.ethereum.path);
    println!("  Address:            {}", keys.ethereum.address);
    println!("  Private key (hex):  {}", keys.ethereum.private_hex);
}
