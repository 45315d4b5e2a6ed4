//! Derivation options
//!
//! The engine carries two complete algorithm families: the production
//! derivation and the legacy one that reproduces a previously distributed
//! sample set bit for bit. Which one runs is a tagged option, never a
//! build-time switch, so both stay testable side by side.

use crate::error::ImsError;

/// Default RSA public exponent (F4).
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65_537;

/// Default production odd modulus for P/Q bias forcing.
pub const DEFAULT_ODD_MODULUS: u8 = 4;

/// Largest odd modulus the single-byte mask can express.
pub const MAX_ODD_MODULUS: u8 = 128;

/// Odd modulus used by the legacy bias step.
const LEGACY_ODD_MODULUS: u8 = 2;

/// Odd-bias mask used by legacy candidates.
const LEGACY_ODD_MASK: u8 = 0x03;

/// Which derivation family produces ESSK and the ERRK primes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityMode {
    /// Bit-exact with the legacy sample set: single-step ESSK, 32-byte
    /// big-endian primes.
    Legacy,
    /// Two-step ESSK, 128-byte little-endian primes.
    #[default]
    Production,
}

/// Which `EP_UID` algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpUidVariant {
    /// What the shipped boot ROM computes: only the low byte of each word
    /// reaches the hash.
    #[default]
    Legacy,
    /// Every word is hashed in full.
    Corrected,
}

/// How `rsa_secret` turns a prime into the exponent modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PqArithmetic {
    /// `t = prime >> 1`.
    #[default]
    Halve,
    /// `t = (prime - 1) >> 1`. Only honoured in legacy mode.
    DecrementThenHalve,
}

/// Options for one derivation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    /// Algorithm family for ESSK and ERRK.
    pub mode: CompatibilityMode,
    /// `EP_UID` algorithm.
    pub ep_uid_variant: EpUidVariant,
    /// Legacy RSA exponent arithmetic.
    pub pq_arithmetic: PqArithmetic,
    /// RSA public exponent `e`.
    pub public_exponent: u32,
    /// Production odd modulus; the candidate mask is `odd_modulus - 1`.
    pub odd_modulus: u8,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            mode: CompatibilityMode::Production,
            ep_uid_variant: EpUidVariant::Legacy,
            pq_arithmetic: PqArithmetic::Halve,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            odd_modulus: DEFAULT_ODD_MODULUS,
        }
    }
}

impl DeriveOptions {
    /// Default options in legacy sample-compatibility mode.
    pub fn legacy() -> Self {
        Self { mode: CompatibilityMode::Legacy, ..Self::default() }
    }

    /// Check that every option can be honoured.
    ///
    /// # Errors
    ///
    /// - `InvalidOption`: odd modulus is not a power of two in `2..=128`
    /// - `InvalidOption`: public exponent is even or zero
    pub fn validate(&self) -> Result<(), ImsError> {
        if self.odd_modulus < 2 || !self.odd_modulus.is_power_of_two() {
            return Err(ImsError::InvalidOption {
                reason: format!(
                    "odd modulus {} must be a power of two in 2..={MAX_ODD_MODULUS}",
                    self.odd_modulus
                ),
            });
        }

        if self.public_exponent.is_multiple_of(2) {
            return Err(ImsError::InvalidOption {
                reason: format!("public exponent {} must be odd", self.public_exponent),
            });
        }

        Ok(())
    }

    /// Mask OR-ed into byte 0 of each prime candidate.
    pub fn odd_mask(&self) -> u8 {
        match self.mode {
            CompatibilityMode::Legacy => LEGACY_ODD_MASK,
            CompatibilityMode::Production => self.odd_modulus.wrapping_sub(1),
        }
    }

    /// Step size applied to the IMS bias when offsetting P and Q.
    pub fn bias_step(&self) -> u8 {
        match self.mode {
            CompatibilityMode::Legacy => LEGACY_ODD_MODULUS,
            CompatibilityMode::Production => self.odd_modulus,
        }
    }

    /// Prime arithmetic actually in effect for this mode.
    ///
    /// `DecrementThenHalve` outside legacy mode collapses to `Halve`.
    pub fn effective_pq_arithmetic(&self) -> PqArithmetic {
        match (self.mode, self.pq_arithmetic) {
            (CompatibilityMode::Legacy, PqArithmetic::DecrementThenHalve) => {
                PqArithmetic::DecrementThenHalve
            },
            _ => PqArithmetic::Halve,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_production() {
        let options = DeriveOptions::default();
        assert_eq!(options.mode, CompatibilityMode::Production);
        assert_eq!(options.ep_uid_variant, EpUidVariant::Legacy);
        assert_eq!(options.pq_arithmetic, PqArithmetic::Halve);
        assert_eq!(options.public_exponent, 65_537);
        assert_eq!(options.odd_mask(), 0x03);
        assert_eq!(options.bias_step(), 4);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn legacy_mask_ignores_odd_modulus() {
        let options = DeriveOptions { odd_modulus: 16, ..DeriveOptions::legacy() };
        assert_eq!(options.odd_mask(), 0x03);
        assert_eq!(options.bias_step(), 2);
    }

    #[test]
    fn production_mask_follows_odd_modulus() {
        let options = DeriveOptions { odd_modulus: 128, ..DeriveOptions::default() };
        assert!(options.validate().is_ok());
        assert_eq!(options.odd_mask(), 0x7F);
    }

    #[test]
    fn rejects_bad_odd_modulus() {
        for odd_modulus in [0u8, 1, 3, 6, 255] {
            let options = DeriveOptions { odd_modulus, ..DeriveOptions::default() };
            assert!(matches!(options.validate(), Err(ImsError::InvalidOption { .. })));
        }
    }

    #[test]
    fn rejects_even_exponent() {
        for public_exponent in [0u32, 2, 65_536] {
            let options = DeriveOptions { public_exponent, ..DeriveOptions::default() };
            assert!(matches!(options.validate(), Err(ImsError::InvalidOption { .. })));
        }
    }

    #[test]
    fn decrement_only_in_legacy() {
        let production = DeriveOptions {
            pq_arithmetic: PqArithmetic::DecrementThenHalve,
            ..DeriveOptions::default()
        };
        assert_eq!(production.effective_pq_arithmetic(), PqArithmetic::Halve);

        let legacy = DeriveOptions {
            pq_arithmetic: PqArithmetic::DecrementThenHalve,
            ..DeriveOptions::legacy()
        };
        assert_eq!(legacy.effective_pq_arithmetic(), PqArithmetic::DecrementThenHalve);
    }
}
