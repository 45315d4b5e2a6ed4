//! CLI error types.

use std::path::PathBuf;

use imsgen_core::ImsError;
use thiserror::Error;

/// Errors surfaced by the `imsgen` front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine rejected an input or produced an invalid key.
    #[error(transparent)]
    Derivation(#[from] ImsError),

    /// An input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `--ims-index` points past the last IMS in the file.
    #[error("IMS index {index} out of range: file holds {count} entries")]
    ImsIndex {
        /// Requested zero-based index
        index: usize,
        /// Number of IMS lines in the file
        count: usize,
    },

    /// The ECC keys were derived but the RSA stage did not complete.
    #[error("RSA stage incomplete: {0}")]
    RsaIncomplete(ImsError),
}

impl CliError {
    /// Returns true if this error indicates an engine defect rather than bad
    /// input.
    pub fn is_defect(&self) -> bool {
        match self {
            Self::Derivation(err) | Self::RsaIncomplete(err) => err.is_defect(),
            Self::Read { .. } | Self::ImsIndex { .. } => false,
        }
    }
}
