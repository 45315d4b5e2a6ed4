//! Seeded CSPRNG
//!
//! The provisioning tool seeds one generator per run from operator-supplied
//! material (a seed file, a passphrase, or OS entropy). The raw material is
//! hashed to a 32-byte seed so that any length of input lands on the full
//! `ChaCha20` key space.

use std::fmt;

use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::ImsError;

/// Seed size in bytes.
pub const SEED_SIZE: usize = 32;

/// SHA-256 digest of raw seed material.
#[derive(Clone)]
pub struct PrngSeed {
    bytes: [u8; SEED_SIZE],
}

impl PrngSeed {
    /// Hash raw seed material into a seed.
    ///
    /// # Errors
    ///
    /// - `SeedUnavailable`: `material` is empty
    pub fn from_material(material: &[u8]) -> Result<Self, ImsError> {
        if material.is_empty() {
            return Err(ImsError::SeedUnavailable { reason: "seed material is empty".into() });
        }

        tracing::debug!(material_len = material.len(), "hashing seed material");
        Ok(Self { bytes: Sha256::digest(material).into() })
    }
}

impl fmt::Debug for PrngSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrngSeed(..)")
    }
}

impl Drop for PrngSeed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// `ChaCha20` generator seeded once per run.
///
/// Call [`deinit`](Self::deinit) when done; dropping has the same effect
/// but without the log line.
pub struct Csprng {
    rng: ChaCha20Rng,
    seed: [u8; SEED_SIZE],
}

impl Csprng {
    /// Seed a generator.
    pub fn init(seed: &PrngSeed) -> Self {
        tracing::debug!("initializing CSPRNG");
        Self { rng: ChaCha20Rng::from_seed(seed.bytes), seed: seed.bytes }
    }

    /// Tear the generator down: zeroize the seed and discard the state.
    pub fn deinit(self) {
        tracing::debug!("tearing down CSPRNG");
        drop(self);
    }

    fn wipe(&mut self) {
        self.seed.zeroize();
        self.rng = ChaCha20Rng::from_seed([0u8; SEED_SIZE]);
    }
}

impl RngCore for Csprng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl CryptoRng for Csprng {}

impl fmt::Debug for Csprng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Csprng(..)")
    }
}

impl Drop for Csprng {
    fn drop(&mut self) {
        self.wipe();
    }
}
