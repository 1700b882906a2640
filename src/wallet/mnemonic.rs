//! BIP-39 Mnemonic Codec
//!
//! entropy ‖ checksum → 11-bit groups → dictionary words, and back.
//! Seeds come from PBKDF2-HMAC-SHA512 (2048 rounds, salt `"mnemonic" + passphrase`).
//!
//! SECURITY: `Mnemonic` and `Seed` are zeroized on drop.

use bip39::Language;
use hmac::Hmac;
use sha2::Sha512;
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{WalletError, WalletResult};
use crate::log_debug;
use crate::utils::crypto::sha256;

use super::entropy::{check_entropy_bits, generate_entropy, EntropySource, OsEntropy};

/// Number of entries in the word dictionary
pub const DICTIONARY_SIZE: usize = 2048;

/// Bits encoded by each word
const BITS_PER_WORD: usize = 11;

/// PBKDF2 rounds fixed by BIP-39
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Seed length in bytes
pub const SEED_LEN: usize = 64;

// =============================================================================
// Dictionary
// =============================================================================

/// The fixed 2048-word English dictionary, index 0-2047
pub fn dictionary() -> &'static [&'static str; DICTIONARY_SIZE] {
    Language::English.word_list()
}

/// Word at `index`, if in range
pub fn word(index: u16) -> Option<&'static str> {
    dictionary().get(index as usize).copied()
}

/// Dictionary index of `word`
pub fn index_of(word: &str) -> Option<u16> {
    // The English list is sorted
    dictionary().binary_search(&word).ok().map(|i| i as u16)
}

// =============================================================================
// Mnemonic
// =============================================================================

/// Space-separated dictionary words; 12 or 24 of them
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    phrase: String,
}

impl Mnemonic {
    /// Parse a phrase, normalizing whitespace and verifying the checksum.
    pub fn parse(phrase: &str) -> WalletResult<Self> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        validate_mnemonic(&normalized)?;
        Ok(Self { phrase: normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split(' ').collect()
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split(' ').count()
    }

    /// Stretch into a 64-byte seed
    pub fn to_seed(&self, passphrase: &str) -> WalletResult<Seed> {
        seed_from_mnemonic(&self.phrase, passphrase)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Seed
// =============================================================================

/// 64-byte PBKDF2 output; only ever used as HMAC key material.
///
/// Deliberately neither `Clone` nor `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        bool::from(self.0.ct_eq(&other.0))
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Generate a fresh mnemonic from `entropy_bits` (128 or 256) of OS randomness
pub fn generate_mnemonic(entropy_bits: usize) -> WalletResult<Mnemonic> {
    generate_mnemonic_with(entropy_bits, &mut OsEntropy)
}

/// Generate a mnemonic drawing entropy from `source` exactly once
pub fn generate_mnemonic_with<S: EntropySource + ?Sized>(
    entropy_bits: usize,
    source: &mut S,
) -> WalletResult<Mnemonic> {
    let entropy = generate_entropy(entropy_bits, source)?;
    let mnemonic = entropy_to_mnemonic(&entropy)?;

    log_debug!("wallet::mnemonic", "Generated mnemonic", word_count = mnemonic.word_count());
    Ok(mnemonic)
}

/// Deterministic core of mnemonic generation
pub fn entropy_to_mnemonic(entropy: &[u8]) -> WalletResult<Mnemonic> {
    let entropy_bits = entropy.len() * 8;
    check_entropy_bits(entropy_bits)?;

    let checksum_bits = entropy_bits / 32;
    let total_bits = entropy_bits + checksum_bits;

    // At most 8 checksum bits, all taken from the first digest byte
    let mut buffer = Zeroizing::new(Vec::with_capacity(entropy.len() + 1));
    buffer.extend_from_slice(entropy);
    buffer.push(sha256(entropy)[0]);

    let words = (0..total_bits / BITS_PER_WORD)
        .map(|group| {
            let index = read_bits(&buffer, group * BITS_PER_WORD, BITS_PER_WORD);
            word(index).ok_or_else(|| {
                WalletError::internal(format!("Word index {} out of range", index))
            })
        })
        .collect::<WalletResult<Vec<_>>>()?;

    Ok(Mnemonic {
        phrase: words.join(" "),
    })
}

/// Recover the entropy from a phrase, verifying words and checksum
pub fn mnemonic_to_entropy(phrase: &str) -> WalletResult<Zeroizing<Vec<u8>>> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let entropy_bits = match words.len() {
        12 => 128,
        24 => 256,
        n => {
            return Err(WalletError::invalid_mnemonic("Mnemonic must have 12 or 24 words")
                .with_details(format!("got {} words", n)))
        }
    };
    let checksum_bits = entropy_bits / 32;

    let mut buffer = Zeroizing::new(vec![0u8; entropy_bits / 8 + 1]);
    for (position, w) in words.iter().enumerate() {
        let index = index_of(w).ok_or_else(|| {
            WalletError::invalid_mnemonic("Unknown word in mnemonic")
                .with_details(format!("position {}", position + 1))
        })?;
        write_bits(&mut buffer, position * BITS_PER_WORD, index, BITS_PER_WORD);
    }

    let entropy = Zeroizing::new(buffer[..entropy_bits / 8].to_vec());
    let provided = read_bits(&buffer, entropy_bits, checksum_bits);
    let expected = read_bits(&sha256(&entropy), 0, checksum_bits);

    if provided != expected {
        return Err(WalletError::invalid_mnemonic("Mnemonic checksum mismatch"));
    }

    Ok(entropy)
}

/// Check word count, dictionary membership and checksum
pub fn validate_mnemonic(phrase: &str) -> WalletResult<()> {
    mnemonic_to_entropy(phrase).map(|_| ())
}

/// PBKDF2-HMAC-SHA512 stretch of `mnemonic` with salt `"mnemonic" + passphrase`.
///
/// The mnemonic checksum is NOT verified here; use [`validate_mnemonic`] at the
/// boundary where phrases enter the system.
pub fn seed_from_mnemonic(mnemonic: &str, passphrase: &str) -> WalletResult<Seed> {
    let password = Zeroizing::new(mnemonic.nfkd().collect::<String>());
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase.nfkd().collect::<String>()));

    let mut seed = Seed([0u8; SEED_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed.0)
        .map_err(|e| WalletError::internal(format!("PBKDF2-HMAC-SHA512 failed: {}", e)))?;

    Ok(seed)
}

/// Read `count` bits (MSB first) starting at bit `offset`
fn read_bits(data: &[u8], offset: usize, count: usize) -> u16 {
    (offset..offset + count).fold(0u16, |acc, bit| {
        let value = (data[bit / 8] >> (7 - bit % 8)) & 1;
        (acc << 1) | value as u16
    })
}

/// Write the low `count` bits of `value` (MSB first) at bit `offset`
fn write_bits(data: &mut [u8], offset: usize, value: u16, count: usize) {
    for i in 0..count {
        if (value >> (count - 1 - i)) & 1 == 1 {
            let bit = offset + i;
            data[bit / 8] |= 1 << (7 - bit % 8);
        }
    }
}
