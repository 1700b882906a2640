//! Entropy Source
//!
//! SECURITY: Entropy buffers are zeroized on drop.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// Supported entropy sizes in bits (12 and 24 words)
pub const ENTROPY_BITS: [usize; 2] = [128, 256];

/// Source of cryptographically secure random bytes
pub trait EntropySource {
    /// Fill `buf` completely or fail
    fn fill(&mut self, buf: &mut [u8]) -> WalletResult<()>;
}

/// Operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> WalletResult<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| WalletError::random_source_failure(format!("OS random source failed: {}", e)))
    }
}

/// Check that `bits` is a supported entropy size
pub fn check_entropy_bits(bits: usize) -> WalletResult<()> {
    if ENTROPY_BITS.contains(&bits) {
        Ok(())
    } else {
        Err(WalletError::invalid_entropy_length("Entropy must be 128 or 256 bits")
            .with_details(format!("got {} bits", bits)))
    }
}

/// Draw `bits / 8` bytes from `source`, reading it exactly once
pub fn generate_entropy<S: EntropySource + ?Sized>(
    bits: usize,
    source: &mut S,
) -> WalletResult<Zeroizing<Vec<u8>>> {
    check_entropy_bits(bits)?;

    let mut entropy = Zeroizing::new(vec![0u8; bits / 8]);
    source.fill(entropy.as_mut_slice())?;
    Ok(entropy)
}
