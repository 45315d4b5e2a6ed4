//! PRNG seed sources.
//!
//! Raw material comes from exactly one place: the head of a seed file, a
//! passphrase given on the command line, or the OS entropy pool. Whatever
//! the source, the engine hashes it down to a 32-byte seed.

use std::{fs::File, io::Read, path::PathBuf};

use imsgen_core::{ImsError, PrngSeed};
use zeroize::Zeroizing;

/// Bytes of raw material taken from a seed file or the OS.
pub const SEED_MATERIAL_LEN: usize = 128;

/// Where the PRNG seed material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// First [`SEED_MATERIAL_LEN`] bytes of a file.
    File(PathBuf),
    /// Every byte of a command-line string.
    Passphrase(String),
    /// [`SEED_MATERIAL_LEN`] bytes from the operating system.
    OsEntropy,
}

impl SeedSource {
    /// Collect raw seed material.
    ///
    /// # Errors
    ///
    /// - `SeedUnavailable`: the file cannot be read or the OS RNG failed
    pub fn material(&self) -> Result<Zeroizing<Vec<u8>>, ImsError> {
        match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|err| ImsError::SeedUnavailable {
                    reason: format!("cannot open {}: {err}", path.display()),
                })?;

                let mut material = Zeroizing::new(Vec::with_capacity(SEED_MATERIAL_LEN));
                file.take(SEED_MATERIAL_LEN as u64).read_to_end(&mut material).map_err(|err| {
                    ImsError::SeedUnavailable {
                        reason: format!("cannot read {}: {err}", path.display()),
                    }
                })?;

                tracing::debug!(path = %path.display(), len = material.len(), "read seed file");
                Ok(material)
            },
            Self::Passphrase(text) => Ok(Zeroizing::new(text.as_bytes().to_vec())),
            Self::OsEntropy => {
                let mut material = Zeroizing::new(vec![0u8; SEED_MATERIAL_LEN]);
                getrandom::fill(&mut material).map_err(|err| ImsError::SeedUnavailable {
                    reason: format!("OS entropy unavailable: {err}"),
                })?;
                Ok(material)
            },
        }
    }

    /// Collect raw material and hash it into a seed.
    ///
    /// # Errors
    ///
    /// - `SeedUnavailable`: no material could be read, or it was empty
    pub fn resolve(&self) -> Result<PrngSeed, ImsError> {
        let material = self.material()?;
        PrngSeed::from_material(&material)
    }
}
