//! Key Derivation Paths
//!
//! Parses `m/<seg>/<seg>/...` strings. A segment is a decimal index below 2^31,
//! optionally followed by a hardened marker (`'`, `h` or `H`) that adds 2^31.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::WalletError;

/// Standard BIP purposes
pub mod bip_purposes {
    pub const BIP44: u32 = 44; // Legacy (P2PKH)
}

/// Coin types from SLIP-0044
pub mod coin_types {
    pub const BITCOIN: u32 = 0;
    pub const BITCOIN_TESTNET: u32 = 1;
    pub const ETHEREUM: u32 = 60;
}

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x80000000;

/// Path parse failures; all surface as `InvalidPath`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("derivation path must start with 'm'")]
    MissingRoot,
    #[error("empty path segment at position {0}")]
    EmptySegment(usize),
    #[error("invalid path segment '{0}'")]
    InvalidSegment(String),
    #[error("path segment '{0}' exceeds 2^31 - 1")]
    IndexOutOfRange(String),
}

impl From<PathError> for WalletError {
    fn from(err: PathError) -> Self {
        WalletError::invalid_path("Invalid derivation path").with_details(err.to_string())
    }
}

/// Single child index, hardened bit folded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// Non-hardened child; `index` must be below 2^31
    pub fn normal(index: u32) -> Result<Self, PathError> {
        if index >= HARDENED {
            return Err(PathError::IndexOutOfRange(index.to_string()));
        }
        Ok(Self(index))
    }

    /// Hardened child; `index` must be below 2^31
    pub fn hardened(index: u32) -> Result<Self, PathError> {
        if index >= HARDENED {
            return Err(PathError::IndexOutOfRange(format!("{}'", index)));
        }
        Ok(Self(index | HARDENED))
    }

    /// Full 32-bit index including the hardened bit
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn is_hardened(&self) -> bool {
        self.0 >= HARDENED
    }

    /// Index without the hardened bit
    pub fn index(&self) -> u32 {
        self.0 & !HARDENED
    }
}

impl From<ChildNumber> for u32 {
    fn from(child: ChildNumber) -> Self {
        child.0
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildNumber {
    type Err = PathError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
            Some(rest) => (rest, true),
            None => (segment, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }

        let index: u32 = digits
            .parse()
            .map_err(|_| PathError::IndexOutOfRange(segment.to_string()))?;
        if index >= HARDENED {
            return Err(PathError::IndexOutOfRange(segment.to_string()));
        }

        if hardened {
            Ok(Self(index | HARDENED))
        } else {
            Ok(Self(index))
        }
    }
}

/// Parsed derivation path; `m` alone is the empty path
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    components: Vec<ChildNumber>,
}

impl DerivationPath {
    /// The master path `m`
    pub fn master() -> Self {
        Self::default()
    }

    /// `m/44'/coin'/account'/change/index`
    pub fn bip44(coin_type: u32, account: u32, change: u32, index: u32) -> Result<Self, PathError> {
        Ok(Self {
            components: vec![
                ChildNumber::hardened(bip_purposes::BIP44)?,
                ChildNumber::hardened(coin_type)?,
                ChildNumber::hardened(account)?,
                ChildNumber::normal(change)?,
                ChildNumber::normal(index)?,
            ],
        })
    }

    pub fn components(&self) -> &[ChildNumber] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.split('/');
        if segments.next() != Some("m") {
            return Err(PathError::MissingRoot);
        }

        let components = segments
            .enumerate()
            .map(|(position, segment)| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment(position + 1))
                } else {
                    segment.parse()
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(components: Vec<ChildNumber>) -> Self {
        Self { components }
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = std::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}
