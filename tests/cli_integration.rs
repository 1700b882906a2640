use hdwallet_core::wallet::{p2pkh_address, validate_mnemonic, ExtendedKey};
use hdwallet_core::{Network, PrivateKey, PublicKey, WalletKeys};
use serde_json::Value;
use std::process::{Command, Output};

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn run_cli(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("hdwallet");
    Command::new(binary_path)
        .args(args)
        .output()
        .expect("cli run succeeds")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "cli exited unsuccessfully: {:?}",
        output
    );
    String::from_utf8(output.stdout.clone()).expect("stdout is utf8")
}

fn decode_keys(stdout: &str) -> WalletKeys {
    // sanity check: ensure output parses as json before struct deserialization
    let _: Value = serde_json::from_str(stdout).expect("stdout is valid json");
    serde_json::from_str(stdout).expect("json matches WalletKeys schema")
}

#[test]
fn generate_emits_consistent_key_material() {
    let stdout = stdout_of(&run_cli(&["generate", "--json"]));
    let value: Value = serde_json::from_str(&stdout).expect("json");
    let mnemonic = value["mnemonic"].as_str().expect("mnemonic field");
    assert_eq!(mnemonic.split(' ').count(), 12);
    assert!(validate_mnemonic(mnemonic).is_ok());

    let keys = decode_keys(&stdout);
    assert_eq!(keys.network, Network::Mainnet);

    // Bitcoin
    let btc_private = PrivateKey::from_hex(&keys.bitcoin.private_hex).expect("bitcoin private hex");
    let btc_public = btc_private.public_key();
    assert_eq!(
        hex::encode(btc_public.serialize_compressed()),
        keys.bitcoin.public_compressed_hex,
        "bitcoin compressed matches",
    );
    assert_eq!(
        p2pkh_address(&btc_public, Network::Mainnet),
        keys.bitcoin.address,
        "bitcoin address matches"
    );
    let wif = bitcoin::PrivateKey::from_wif(&keys.bitcoin.private_wif).expect("bitcoin wif valid");
    assert_eq!(
        format!("0x{}", hex::encode(wif.inner.secret_bytes())),
        keys.bitcoin.private_hex,
        "bitcoin hex matches wif",
    );

    // Restoring the printed mnemonic reproduces the same keys
    let restored = stdout_of(&run_cli(&["restore", "--mnemonic", mnemonic, "--json"]));
    assert_eq!(decode_keys(&restored), keys);
}

#[test]
fn generate_honours_word_count_and_testnet() {
    let stdout = stdout_of(&run_cli(&["generate", "--words", "24", "--testnet", "--json"]));
    let value: Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(value["mnemonic"].as_str().expect("mnemonic").split(' ').count(), 24);

    let keys = decode_keys(&stdout);
    assert_eq!(keys.network, Network::Testnet);
    assert_eq!(keys.bitcoin.path, "m/44'/1'/0'/0/0");
    assert!(keys.master_xpub.starts_with("tpub"));
    assert!(keys.bitcoin.address.starts_with('m') || keys.bitcoin.address.starts_with('n'));
}

#[test]
fn restore_reproduces_known_addresses() {
    let output = run_cli(&["restore", "--mnemonic", ABANDON, "--json"]);
    let keys = decode_keys(&stdout_of(&output));

    // Library derivation logs at debug level only
    assert!(output.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(keys.ethereum.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert_eq!(keys.bitcoin.address, "18LhnLKXjcTw5xJFiTxntnKit2Gd63eWFm");
}

#[test]
fn restore_rejects_bad_checksum() {
    let bad = ABANDON.replace("about", "abandon");
    let output = run_cli(&["restore", "--mnemonic", &bad]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InvalidMnemonic"), "stderr: {}", stderr);
}

#[test]
fn derive_from_xprv_and_xpub() {
    let xprv = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    let stdout = stdout_of(&run_cli(&["derive", "--xkey", xprv, "--path", "m/0'"]));
    assert_eq!(
        stdout.trim(),
        "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
    );

    let (master, _) = ExtendedKey::from_base58(xprv).expect("xprv");
    let xpub = master.neuter().to_base58(Network::Mainnet);
    let output = run_cli(&["derive", "--xkey", &xpub, "--path", "m/0'"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("HardenedFromPublicKey"));

    let stdout = stdout_of(&run_cli(&["--json", "derive", "--xkey", &xpub, "--path", "m/1/2"]));
    let value: Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(value["depth"], 2);
    let expected = master.derive_path("m/1/2").expect("derive").neuter();
    assert_eq!(value["extended_key"], expected.to_base58(Network::Mainnet));
}

#[test]
fn address_and_checksum_commands() {
    let fixture = "0408f439970bbe897385d9b6dbfac9be9590e8d5310af429833eda8858f61f141c5fae7a077e89cdb808a7bdd97d0cf70fd60310ddaf5d0c719de88dbb037540c0";
    let stdout = stdout_of(&run_cli(&["address", "--public-key", fixture, "--testnet"]));
    assert_eq!(stdout.trim(), "mfywV2MgWJncjcxV8SkmoT72A1Tc9HjNsP");

    let eth = "0425d199a0d145e028a5bf0fbd76a20b72564b17a51c6f429aca4b1d1276f90bc4eb9304ec4ed4ae85364d858cfee634b02b476186077274a8fb33fc9042af7221";
    let stdout = stdout_of(&run_cli(&["address", "--public-key", eth, "--ethereum"]));
    assert_eq!(stdout.trim(), "0x3996aD797e1EE14e4db94F772660945c690b9CB4");
    PublicKey::from_hex(eth).expect("fixture parses");

    let stdout = stdout_of(&run_cli(&["checksum", "0x3996ad797e1ee14e4db94f772660945c690b9cb4"]));
    assert_eq!(stdout.trim(), "0x3996aD797e1EE14e4db94F772660945c690b9CB4");

    let output = run_cli(&["checksum", "0x1234"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("InvalidAddressLength"));
}

#[test]
fn config_file_selects_network() {
    let dir = std::env::temp_dir().join(format!("hdwallet-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let config = dir.join("settings.json");
    std::fs::write(
        &config,
        r#"{"network": "testnet", "bitcoin_path": "m/44'/1'/0'/0/0"}"#,
    )
    .expect("write config");

    let stdout = stdout_of(&run_cli(&[
        "--config",
        config.to_str().expect("utf8 path"),
        "restore",
        "--mnemonic",
        ABANDON,
        "--json",
    ]));
    let keys = decode_keys(&stdout);
    assert_eq!(keys.network, Network::Testnet);
    assert_eq!(keys.bitcoin.path, "m/44'/1'/0'/0/0");
    assert_eq!(keys.ethereum.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");

    let output = run_cli(&[
        "--config",
        config.to_str().expect("utf8 path"),
        "restore",
        "--mnemonic",
        ABANDON,
        "--testnet",
    ]);
    stdout_of(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INFO [cli] Loaded settings"), "stderr: {}", stderr);
    assert!(stderr.contains("WARN [cli]"), "stderr: {}", stderr);

    std::fs::write(&config, r#"{"entropy_bits": 100}"#).expect("rewrite config");
    let output = run_cli(&["--config", config.to_str().expect("utf8 path"), "generate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ConfigError"));

    let _ = std::fs::remove_dir_all(&dir);
}
