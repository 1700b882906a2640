use bitcoin::bip32::{DerivationPath as BtcPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use hdwallet_core::wallet::{
    eip55_checksum, entropy_to_mnemonic, is_eip55_checksummed, mnemonic_to_entropy, p2pkh_address,
    validate_p2pkh_address, ExtendedKey, HARDENED,
};
use hdwallet_core::{to_checksum_address, Network, PrivateKey, PublicKey};
use proptest::prelude::*;

fn any_private_key() -> impl Strategy<Value = PrivateKey> {
    prop::array::uniform32(any::<u8>())
        .prop_filter_map("valid secp256k1 scalar", |bytes| PrivateKey::from_bytes(&bytes).ok())
}

fn any_seed() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 16..=64)
}

fn any_path() -> impl Strategy<Value = Vec<(u32, bool)>> {
    prop::collection::vec((0u32..HARDENED, any::<bool>()), 0..5)
}

fn render_path(segments: &[(u32, bool)]) -> String {
    let mut path = String::from("m");
    for (index, hardened) in segments {
        path.push('/');
        path.push_str(&index.to_string());
        if *hardened {
            path.push('\'');
        }
    }
    path
}

proptest! {
    #[test]
    fn private_keys_roundtrip(key in any_private_key()) {
        let decoded = PrivateKey::from_bytes(&key.to_bytes()).expect("decode bytes");
        prop_assert_eq!(&decoded, &key);

        let from_hex = PrivateKey::from_hex(&key.to_hex()).expect("decode hex");
        prop_assert_eq!(from_hex, key);
    }

    #[test]
    fn public_keys_roundtrip(key in any_private_key()) {
        let public = key.public_key();

        let compressed = PublicKey::from_bytes(&public.serialize_compressed()).expect("compressed");
        prop_assert_eq!(compressed, public);

        let uncompressed = PublicKey::from_bytes(&public.serialize_uncompressed()).expect("uncompressed");
        prop_assert_eq!(uncompressed, public);
        prop_assert_eq!(&public.serialize_uncompressed()[1..33], &public.serialize_compressed()[1..]);
    }

    #[test]
    fn public_derivation_commutes(seed in any_seed(), index in 0u32..HARDENED) {
        let master = ExtendedKey::from_seed_bytes(&seed).expect("master");
        let account = master.derive(HARDENED).expect("hardened child");

        let via_private = account.derive(index).expect("private child").neuter();
        let via_public = account.neuter().derive(index).expect("public child");
        prop_assert_eq!(via_private.public_key(), via_public.public_key());
        prop_assert_eq!(via_private.chain_code(), via_public.chain_code());
    }

    #[test]
    fn hardened_from_public_always_rejected(seed in any_seed(), index in HARDENED..=u32::MAX) {
        let public = ExtendedKey::from_seed_bytes(&seed).expect("master").neuter();
        let err = public.derive(index).unwrap_err();
        prop_assert_eq!(err.code, hdwallet_core::ErrorCode::HardenedFromPublicKey);
    }

    #[test]
    fn derivation_matches_bitcoin_crate(seed in any_seed(), segments in any_path()) {
        let path = render_path(&segments);

        let ours = ExtendedKey::from_seed_bytes(&seed)
            .and_then(|master| master.derive_path(&path))
            .expect("derive");

        let secp = Secp256k1::new();
        let btc_path: BtcPath = path.parse().expect("bitcoin path");
        let theirs = Xpriv::new_master(bitcoin::Network::Bitcoin, &seed)
            .and_then(|master| master.derive_priv(&secp, &btc_path))
            .expect("bitcoin derive");

        prop_assert_eq!(ours.to_base58(Network::Mainnet), theirs.to_string());
    }

    #[test]
    fn eip55_is_idempotent(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert_eq!(eip55_checksum(&checksummed).expect("checksum"), checksummed.clone());
        prop_assert_eq!(
            eip55_checksum(&checksummed.to_ascii_lowercase()).expect("checksum lower"),
            checksummed.clone()
        );
        prop_assert!(is_eip55_checksummed(&checksummed));
    }

    #[test]
    fn p2pkh_addresses_validate(key in any_private_key(), testnet in any::<bool>()) {
        let network = if testnet { Network::Testnet } else { Network::Mainnet };
        let address = p2pkh_address(&key.public_key(), network);
        prop_assert!(validate_p2pkh_address(&address, network).is_ok());
        if !testnet {
            prop_assert!(address.starts_with('1'));
        }
    }

    #[test]
    fn mnemonic_entropy_recovered(entropy in prop::collection::vec(any::<u8>(), 16)) {
        let mnemonic = entropy_to_mnemonic(&entropy).expect("encode");
        prop_assert_eq!(mnemonic.word_count(), 12);
        let recovered = mnemonic_to_entropy(mnemonic.as_str()).expect("decode");
        prop_assert_eq!(recovered.as_slice(), entropy.as_slice());
    }
}
