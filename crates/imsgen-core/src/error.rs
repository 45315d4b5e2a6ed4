//! Error types for the IMS derivation engine

use std::fmt;

use thiserror::Error;

/// Public key whose curve validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKey {
    /// Endpoint Primary Verification Key (Ed448)
    Epvk,
    /// Endpoint Secondary Verification Key (Curve25519)
    Esvk,
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epvk => f.write_str("EPVK"),
            Self::Esvk => f.write_str("ESVK"),
        }
    }
}

/// Errors from IMS key derivation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImsError {
    /// No seed source resolved to usable bytes
    #[error("PRNG seed unavailable: {reason}")]
    SeedUnavailable {
        /// Why the seed could not be resolved
        reason: String,
    },

    /// A generated public key failed curve-membership validation
    #[error("{key} failed curve validation: {reason}")]
    KeyValidation {
        /// Which public key was rejected
        key: VerificationKey,
        /// Which validation rule failed
        reason: &'static str,
    },

    /// RSA secret derivation invoked with unusable prime candidates
    #[error("RSA precondition violated: {reason}")]
    PreconditionViolation {
        /// The violated precondition
        reason: String,
    },

    /// IMS text or bytes of the wrong shape
    #[error("invalid IMS: {reason}")]
    InvalidIms {
        /// What was wrong with the input
        reason: String,
    },

    /// Value does not fit the requested width
    #[error("invalid length: expected at most {expected} bytes, got {actual}")]
    InvalidLength {
        /// Maximum accepted length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Derivation options that cannot be honoured
    #[error("invalid option: {reason}")]
    InvalidOption {
        /// Which option was rejected and why
        reason: String,
    },
}

impl ImsError {
    /// Returns true if this error indicates an implementation defect.
    ///
    /// Derivation is deterministic, so no error is worth retrying with the
    /// same inputs. Defects additionally mean the engine itself produced
    /// something impossible and must be investigated; everything else is a
    /// caller-level problem (different IMS, different mode, fix the input).
    pub fn is_defect(&self) -> bool {
        match self {
            Self::KeyValidation { .. } => true,

            Self::SeedUnavailable { .. }
            | Self::PreconditionViolation { .. }
            | Self::InvalidIms { .. }
            | Self::InvalidLength { .. }
            | Self::InvalidOption { .. } => false,
        }
    }

    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(%reason, "RSA precondition violated");
        Self::PreconditionViolation { reason }
    }

    pub(crate) fn key_validation(key: VerificationKey, reason: &'static str) -> Self {
        tracing::error!(%key, reason, "generated public key failed validation");
        Self::KeyValidation { key, reason }
    }
}
