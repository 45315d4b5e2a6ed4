//! IMS sources.
//!
//! An IMS file holds one 70-digit hex IMS per line, IMS\[0\] first. Blank
//! lines are skipped when counting the index.

use std::path::PathBuf;

use imsgen_core::{Csprng, Ims};
use zeroize::Zeroizing;

use crate::error::CliError;

/// Where the IMS comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImsSource {
    /// Hex text given on the command line.
    Hex(String),
    /// Entry `index` (zero-based) of an IMS file.
    File {
        /// IMS file
        path: PathBuf,
        /// Zero-based entry, blank lines excluded
        index: usize,
    },
    /// A fresh balanced IMS drawn from the CSPRNG.
    Generate,
}

impl ImsSource {
    /// Produce the IMS. Only [`ImsSource::Generate`] draws from `rng`.
    pub fn load(&self, rng: &mut Csprng) -> Result<Ims, CliError> {
        match self {
            Self::Hex(text) => Ok(Ims::from_hex(text)?),
            Self::File { path, index } => {
                let contents = Zeroizing::new(
                    std::fs::read_to_string(path)
                        .map_err(|source| CliError::Read { path: path.clone(), source })?,
                );

                let mut entries = contents.lines().map(str::trim).filter(|line| !line.is_empty());
                let Some(line) = entries.nth(*index) else {
                    let count = contents.lines().filter(|line| !line.trim().is_empty()).count();
                    return Err(CliError::ImsIndex { index: *index, count });
                };

                tracing::debug!(path = %path.display(), index, "loaded IMS from file");
                Ok(Ims::from_hex(line)?)
            },
            Self::Generate => Ok(Ims::generate(rng)),
        }
    }
}
