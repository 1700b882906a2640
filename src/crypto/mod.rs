//! Cryptographic primitives
//!
//! secp256k1 key encodings and recoverable signing. Hash helpers live in
//! `utils::crypto`.

pub mod keys;

pub use keys::{
    PrivateKey, PublicKey, RecoverableSignature,
    COMPRESSED_PUBLIC_KEY_SIZE, PRIVATE_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE,
};
