//! BIP-32 Extended Key Tree
//!
//! Master generation from a seed, single-step child derivation (private or
//! public-only parent), path derivation and xprv/xpub serialization.
//!
//! Nodes are immutable: every derivation borrows the parent and returns a new
//! child. An index that yields `IL >= n` or a zero key fails with
//! `DerivationInvalid`; retrying with the next index is left to the caller.
//!
//! SECURITY: Intermediate HMAC output is zeroized when dropped.

use secp256k1::{Scalar, SecretKey};
use std::fmt;
use zeroize::Zeroizing;

use crate::crypto::keys::SECP;
use crate::crypto::{PrivateKey, PublicKey};
use crate::error::{WalletError, WalletResult};
use crate::log_debug;
use crate::types::Network;
use crate::utils::crypto::{base58check_decode, base58check_encode, hash160, hmac_sha512};

use super::derivation_path::{ChildNumber, DerivationPath, HARDENED};
use super::mnemonic::Seed;

/// HMAC key for master key generation
pub const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Serialized extended key length before the checksum
pub const EXTENDED_KEY_LEN: usize = 78;

/// Chain code length in bytes
pub const CHAIN_CODE_LEN: usize = 32;

/// Tree position shared by both variants
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyMeta {
    chain_code: [u8; CHAIN_CODE_LEN],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
}

/// A node of the key tree.
///
/// Hardened children can only be derived from the `Private` variant.
#[derive(Clone, PartialEq, Eq)]
pub enum ExtendedKey {
    Private {
        private_key: PrivateKey,
        public_key: PublicKey,
        meta: KeyMeta,
    },
    PublicOnly {
        public_key: PublicKey,
        meta: KeyMeta,
    },
}

impl ExtendedKey {
    /// Master node: `I = HMAC-SHA512("Bitcoin seed", seed)`
    pub fn new_master(seed: &Seed) -> WalletResult<Self> {
        Self::from_seed_bytes(seed.as_bytes())
    }

    /// Master node from raw seed bytes of any length
    pub fn from_seed_bytes(seed: &[u8]) -> WalletResult<Self> {
        let i = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, seed)?);
        let (il, ir) = split_hmac(&i);

        let secret = SecretKey::from_slice(&il[..])
            .map_err(|_| WalletError::derivation_invalid("Master key is zero or not below the curve order"))?;
        let private_key = PrivateKey::from_secret(secret);
        let public_key = private_key.public_key();

        log_debug!("wallet::derivation", "Generated master key", depth = 0);

        Ok(ExtendedKey::Private {
            private_key,
            public_key,
            meta: KeyMeta {
                chain_code: *ir,
                depth: 0,
                parent_fingerprint: [0u8; 4],
                child_number: ChildNumber::from_raw(0),
            },
        })
    }

    /// Derive the child at `index`; `index >= 2^31` is hardened
    pub fn derive(&self, index: u32) -> WalletResult<Self> {
        self.derive_child(ChildNumber::from_raw(index))
    }

    pub fn derive_child(&self, child: ChildNumber) -> WalletResult<Self> {
        match self {
            ExtendedKey::Private {
                private_key,
                public_key,
                meta,
            } => derive_private_child(private_key, public_key, meta, child),
            ExtendedKey::PublicOnly { public_key, meta } => {
                derive_public_child(public_key, meta, child)
            }
        }
    }

    /// Parse `path` and apply each segment left to right
    pub fn derive_path(&self, path: &str) -> WalletResult<Self> {
        let parsed: DerivationPath = path.parse()?;
        self.derive_path_parsed(&parsed)
    }

    pub fn derive_path_parsed(&self, path: &DerivationPath) -> WalletResult<Self> {
        let mut node = self.clone();
        for child in path {
            node = node.derive_child(*child)?;
        }

        log_debug!(
            "wallet::derivation",
            "Derived path",
            path = path,
            depth = node.depth(),
            variant = if node.is_private() { "private" } else { "public" },
        );
        Ok(node)
    }

    /// Public-only counterpart with the same position in the tree
    pub fn neuter(&self) -> Self {
        match self {
            ExtendedKey::Private {
                public_key, meta, ..
            } => ExtendedKey::PublicOnly {
                public_key: *public_key,
                meta: *meta,
            },
            public => public.clone(),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, ExtendedKey::Private { .. })
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            ExtendedKey::Private { private_key, .. } => Some(private_key),
            ExtendedKey::PublicOnly { .. } => None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        match self {
            ExtendedKey::Private { public_key, .. } | ExtendedKey::PublicOnly { public_key, .. } => {
                public_key
            }
        }
    }

    fn meta(&self) -> &KeyMeta {
        match self {
            ExtendedKey::Private { meta, .. } | ExtendedKey::PublicOnly { meta, .. } => meta,
        }
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_LEN] {
        &self.meta().chain_code
    }

    pub fn depth(&self) -> u8 {
        self.meta().depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.meta().parent_fingerprint
    }

    pub fn child_number(&self) -> ChildNumber {
        self.meta().child_number
    }

    /// First 4 bytes of HASH160 of the compressed public key
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(self.public_key())
    }

    /// BIP-32 Base58Check serialization (xprv/xpub, tprv/tpub on testnet)
    pub fn to_base58(&self, network: Network) -> String {
        let meta = self.meta();
        let mut payload = Zeroizing::new(Vec::with_capacity(EXTENDED_KEY_LEN));

        match self {
            ExtendedKey::Private { .. } => payload.extend_from_slice(&network.xprv_version()),
            ExtendedKey::PublicOnly { .. } => payload.extend_from_slice(&network.xpub_version()),
        }
        payload.push(meta.depth);
        payload.extend_from_slice(&meta.parent_fingerprint);
        payload.extend_from_slice(&meta.child_number.raw().to_be_bytes());
        payload.extend_from_slice(&meta.chain_code);

        match self {
            ExtendedKey::Private { private_key, .. } => {
                payload.push(0x00);
                payload.extend_from_slice(&private_key.to_bytes());
            }
            ExtendedKey::PublicOnly { public_key, .. } => {
                payload.extend_from_slice(&public_key.serialize_compressed());
            }
        }

        base58check_encode(&payload)
    }

    /// Parse an xprv/xpub/tprv/tpub string
    pub fn from_base58(text: &str) -> WalletResult<(Self, Network)> {
        let payload = Zeroizing::new(base58check_decode(text.trim()).map_err(|e| {
            WalletError::invalid_extended_key("Invalid extended key encoding").with_details(e.message)
        })?);

        if payload.len() != EXTENDED_KEY_LEN {
            return Err(WalletError::invalid_extended_key("Extended key must be 78 bytes")
                .with_details(format!("got {} bytes", payload.len())));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&payload[0..4]);
        let (network, private) = [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find_map(|network| {
                if version == network.xprv_version() {
                    Some((network, true))
                } else if version == network.xpub_version() {
                    Some((network, false))
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                WalletError::invalid_extended_key("Unknown extended key version")
                    .with_details(hex::encode(version))
            })?;

        let depth = payload[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let mut child_raw = [0u8; 4];
        child_raw.copy_from_slice(&payload[9..13]);
        let child_number = ChildNumber::from_raw(u32::from_be_bytes(child_raw));
        let mut chain_code = [0u8; CHAIN_CODE_LEN];
        chain_code.copy_from_slice(&payload[13..45]);

        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_number.raw() != 0) {
            return Err(WalletError::invalid_extended_key(
                "Master key must have zero parent fingerprint and child number",
            ));
        }

        let meta = KeyMeta {
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        };
        let key_data = &payload[45..];

        let key = if private {
            if key_data[0] != 0x00 {
                return Err(WalletError::invalid_extended_key("Private key data must start with 0x00"));
            }
            let private_key = PrivateKey::from_bytes(&key_data[1..]).map_err(|e| {
                WalletError::invalid_extended_key("Invalid private key data").with_details(e.message)
            })?;
            let public_key = private_key.public_key();
            ExtendedKey::Private {
                private_key,
                public_key,
                meta,
            }
        } else {
            let public_key = PublicKey::from_bytes(key_data).map_err(|e| {
                WalletError::invalid_extended_key("Invalid public key data").with_details(e.message)
            })?;
            ExtendedKey::PublicOnly { public_key, meta }
        };

        Ok((key, network))
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("private", &self.is_private())
            .field("public_key", &self.public_key().to_hex())
            .field("depth", &self.depth())
            .field("child_number", &self.child_number().to_string())
            .finish_non_exhaustive()
    }
}

/// Child of a private parent; hardened or normal
fn derive_private_child(
    private_key: &PrivateKey,
    public_key: &PublicKey,
    meta: &KeyMeta,
    child: ChildNumber,
) -> WalletResult<ExtendedKey> {
    let depth = next_depth(meta)?;

    let mut data = Zeroizing::new(Vec::with_capacity(37));
    if child.is_hardened() {
        data.push(0x00);
        data.extend_from_slice(&private_key.to_bytes());
    } else {
        data.extend_from_slice(&public_key.serialize_compressed());
    }
    data.extend_from_slice(&child.raw().to_be_bytes());

    let i = Zeroizing::new(hmac_sha512(&meta.chain_code, &data)?);
    let (il, ir) = split_hmac(&i);
    let tweak = tweak_scalar(&il, child)?;

    let parent_secret: SecretKey = *private_key.secret();
    let child_secret = parent_secret.add_tweak(&tweak).map_err(|_| {
        WalletError::derivation_invalid("Derived private key is zero")
            .with_details(format!("index: {:#010x}", child.raw()))
    })?;

    let child_private = PrivateKey::from_secret(child_secret);
    let child_public = child_private.public_key();

    Ok(ExtendedKey::Private {
        private_key: child_private,
        public_key: child_public,
        meta: KeyMeta {
            chain_code: *ir,
            depth,
            parent_fingerprint: fingerprint_of(public_key),
            child_number: child,
        },
    })
}

/// Child of a public-only parent; normal indices only
fn derive_public_child(
    public_key: &PublicKey,
    meta: &KeyMeta,
    child: ChildNumber,
) -> WalletResult<ExtendedKey> {
    if child.raw() >= HARDENED {
        return Err(WalletError::hardened_from_public(child.raw()));
    }
    let depth = next_depth(meta)?;

    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(&public_key.serialize_compressed());
    data.extend_from_slice(&child.raw().to_be_bytes());

    let i = Zeroizing::new(hmac_sha512(&meta.chain_code, &data)?);
    let (il, ir) = split_hmac(&i);
    let tweak = tweak_scalar(&il, child)?;

    // IL·G + parent point
    let point = public_key.inner().add_exp_tweak(&SECP, &tweak).map_err(|_| {
        WalletError::derivation_invalid("Derived public key is the point at infinity")
            .with_details(format!("index: {:#010x}", child.raw()))
    })?;

    Ok(ExtendedKey::PublicOnly {
        public_key: PublicKey::from_inner(point),
        meta: KeyMeta {
            chain_code: *ir,
            depth,
            parent_fingerprint: fingerprint_of(public_key),
            child_number: child,
        },
    })
}

fn next_depth(meta: &KeyMeta) -> WalletResult<u8> {
    meta.depth
        .checked_add(1)
        .ok_or_else(|| WalletError::derivation_invalid("Maximum derivation depth (255) exceeded"))
}

/// IL as a scalar; fails when `IL >= n`
fn tweak_scalar(il: &[u8; 32], child: ChildNumber) -> WalletResult<Scalar> {
    Scalar::from_be_bytes(*il).map_err(|_| {
        WalletError::derivation_invalid("IL is not below the curve order")
            .with_details(format!("index: {:#010x}", child.raw()))
    })
}

/// Split the HMAC output into (IL, IR)
fn split_hmac(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}

fn fingerprint_of(public_key: &PublicKey) -> [u8; 4] {
    let id = hash160(&public_key.serialize_compressed());
    [id[0], id[1], id[2], id[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const TV1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn tv1_master() -> ExtendedKey {
        ExtendedKey::from_seed_bytes(&hex::decode(TV1_SEED).unwrap()).unwrap()
    }

    fn private_hex(key: &ExtendedKey) -> String {
        hex::encode(key.private_key().unwrap().to_bytes())
    }

    #[test]
    fn test_master_vector() {
        let master = tv1_master();
        assert_eq!(
            private_hex(&master),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            master.public_key().to_hex(),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(master.depth(), 0);
        assert_eq!(master.parent_fingerprint(), [0u8; 4]);
    }

    #[test]
    fn test_master_serialization() {
        let master = tv1_master();
        assert_eq!(
            master.to_base58(Network::Mainnet),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            master.neuter().to_base58(Network::Mainnet),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }

    #[test]
    fn test_hardened_child_vector() {
        let child = tv1_master().derive(HARDENED).unwrap();
        assert_eq!(
            private_hex(&child),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(child.depth(), 1);
        assert_eq!(child.parent_fingerprint(), tv1_master().fingerprint());
        assert_eq!(
            child.to_base58(Network::Mainnet),
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
    }

    #[test]
    fn test_path_vector_chain() {
        let node = tv1_master().derive_path("m/0'/1/2'/2/1000000000").unwrap();
        assert_eq!(
            private_hex(&node),
            "471b76e389e528d6de6d816857e012c5455051cad6660850e58372a6c3e6e7c8"
        );
        assert_eq!(
            node.public_key().to_hex(),
            "022a471424da5e657499d1ff51cb43c47481a03b1e77f951fe64cec9f5a48f7011"
        );
        assert_eq!(node.depth(), 5);
        assert_eq!(
            node.to_base58(Network::Mainnet),
            "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76"
        );
    }

    #[test]
    fn test_step_by_step_equals_path() {
        let master = tv1_master();
        let stepped = master
            .derive(HARDENED)
            .and_then(|k| k.derive(1))
            .and_then(|k| k.derive(HARDENED + 2))
            .unwrap();
        assert_eq!(stepped, master.derive_path("m/0'/1/2h").unwrap());
        assert_eq!(
            private_hex(&stepped),
            "cbce0d719ecf7431d88e6a89fa1483e02e35092af60c042b1df2ff59fa424dca"
        );
    }

    #[test]
    fn test_public_derivation_commutes() {
        let parent = tv1_master().derive_path("m/0'/1/2'").unwrap();
        let via_private = parent.derive(2).unwrap().neuter();
        let via_public = parent.neuter().derive(2).unwrap();

        assert_eq!(via_private, via_public);
        assert_eq!(
            via_public.public_key().to_hex(),
            "02e8445082a72f29b75ca48748a914df60622a609cacfce8ed0e35804560741d29"
        );
        assert_eq!(
            via_public.to_base58(Network::Mainnet),
            "xpub6FHa3pjLCk84BayeJxFW2SP4XRrFd1JYnxeLeU8EqN3vDfZmbqBqaGJAyiLjTAwm6ZLRQUMv1ZACTj37sR62cfN7fe5JnJ7dh8zL4fiyLHV"
        );
    }

    #[test]
    fn test_hardened_from_public_rejected() {
        let public = tv1_master().neuter();
        for index in [HARDENED, HARDENED + 1, HARDENED + 44, u32::MAX] {
            let err = public.derive(index).unwrap_err();
            assert_eq!(err.code, ErrorCode::HardenedFromPublicKey);
        }
        let err = public.derive_path("m/0/1'").unwrap_err();
        assert_eq!(err.code, ErrorCode::HardenedFromPublicKey);
    }

    #[test]
    fn test_derive_does_not_mutate_parent() {
        let master = tv1_master();
        let before = master.clone();
        let _ = master.derive(7).unwrap();
        assert_eq!(master, before);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let master = tv1_master();
        for path in ["", "0/1", "n/0", "m/x", "m/0//1", "m/2147483648"] {
            let err = master.derive_path(path).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidPath, "path {:?}", path);
        }
        assert_eq!(master.derive_path("m").unwrap(), master);
    }

    #[test]
    fn test_depth_overflow() {
        let master = tv1_master();
        let deep = match master {
            ExtendedKey::Private {
                private_key,
                public_key,
                meta,
            } => ExtendedKey::Private {
                private_key,
                public_key,
                meta: KeyMeta { depth: 255, ..meta },
            },
            ExtendedKey::PublicOnly { .. } => unreachable!(),
        };
        assert_eq!(deep.derive(0).unwrap_err().code, ErrorCode::DerivationInvalid);
        assert_eq!(deep.neuter().derive(0).unwrap_err().code, ErrorCode::DerivationInvalid);
    }

    #[test]
    fn test_il_not_below_order_rejected() {
        let err = tweak_scalar(&[0xff; 32], ChildNumber::from_raw(0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DerivationInvalid);
        assert!(err.details.as_deref().unwrap_or("").contains("0x00000000"));

        let err = tweak_scalar(&[0xff; 32], ChildNumber::from_raw(HARDENED + 7)).unwrap_err();
        assert!(err.details.as_deref().unwrap_or("").contains("0x80000007"));

        // n - 1 is still a valid tweak
        let below = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140").unwrap();
        let mut il = [0u8; 32];
        il.copy_from_slice(&below);
        assert!(tweak_scalar(&il, ChildNumber::from_raw(0)).is_ok());
    }

    #[test]
    fn test_base58_round_trip() {
        let node = tv1_master().derive_path("m/0'/1").unwrap();
        let xprv = node.to_base58(Network::Testnet);
        assert!(xprv.starts_with("tprv"));

        let (parsed, network) = ExtendedKey::from_base58(&xprv).unwrap();
        assert_eq!(network, Network::Testnet);
        assert_eq!(parsed, node);

        let xpub = "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ";
        let (public, network) = ExtendedKey::from_base58(xpub).unwrap();
        assert_eq!(network, Network::Mainnet);
        assert!(!public.is_private());
        assert_eq!(public, node.neuter());
    }

    #[test]
    fn test_from_base58_rejects_garbage() {
        let master = tv1_master().to_base58(Network::Mainnet);

        let mut corrupted = master.clone();
        corrupted.pop();
        corrupted.push(if master.ends_with('1') { '2' } else { '1' });
        let err = ExtendedKey::from_base58(&corrupted).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidExtendedKey);

        let short = base58check_encode(&[0u8; 40]);
        assert_eq!(
            ExtendedKey::from_base58(&short).unwrap_err().code,
            ErrorCode::InvalidExtendedKey
        );
    }

    #[test]
    fn test_from_base58_rejects_master_with_parent() {
        let mut payload = Vec::with_capacity(EXTENDED_KEY_LEN);
        payload.extend_from_slice(&Network::Mainnet.xpub_version());
        payload.push(0);
        payload.extend_from_slice(&[1, 2, 3, 4]);
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(tv1_master().chain_code());
        payload.extend_from_slice(&tv1_master().public_key().serialize_compressed());

        let err = ExtendedKey::from_base58(&base58check_encode(&payload)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidExtendedKey);
    }

    #[test]
    fn test_debug_hides_private_key() {
        let master = tv1_master();
        let debug = format!("{:?}", master);
        assert!(!debug.contains("e8f32e723decf405"));
        assert!(!debug.contains("873dff81c02f5256"));
    }
}
