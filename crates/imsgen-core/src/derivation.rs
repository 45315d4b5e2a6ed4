//! Per-run derivation context
//!
//! [`Derivation`] owns one IMS, computes Y2 once, and hands it to every
//! deriver. Nothing is shared between runs, so independent IMS values can
//! be derived on independent threads.

use crate::{
    ep_uid::{EpUid, derive_ep_uid},
    errk::{PrimeCandidates, bias_prime_candidates, derive_prime_candidates},
    error::ImsError,
    ims::{Ims, Y2, derive_y2},
    mode::DeriveOptions,
    primary::{PrimaryKeyPair, derive_primary},
    rsa::{RsaKeyPair, rsa_secret},
    secondary::{SecondaryKeyPair, derive_secondary},
};

/// Derivation context for one IMS.
#[derive(Debug, Clone)]
pub struct Derivation {
    ims: Ims,
    y2: Y2,
    options: DeriveOptions,
}

impl Derivation {
    /// Validate `options` and compute Y2.
    ///
    /// # Errors
    ///
    /// - `InvalidOption`: `options` fail validation
    pub fn new(ims: &Ims, options: DeriveOptions) -> Result<Self, ImsError> {
        options.validate()?;
        Ok(Self { ims: ims.clone(), y2: derive_y2(ims), options })
    }

    /// Options in effect.
    pub fn options(&self) -> &DeriveOptions {
        &self.options
    }

    /// The shared Y2 term.
    pub fn y2(&self) -> &Y2 {
        &self.y2
    }

    /// `EP_UID` with the configured variant.
    pub fn ep_uid(&self) -> EpUid {
        derive_ep_uid(&self.ims, self.options.ep_uid_variant)
    }

    /// EPSK/EPVK.
    pub fn primary(&self) -> Result<PrimaryKeyPair, ImsError> {
        derive_primary(&self.y2)
    }

    /// ESSK/ESVK in the configured mode.
    pub fn secondary(&self) -> Result<SecondaryKeyPair, ImsError> {
        derive_secondary(&self.y2, self.options.mode)
    }

    /// P/Q candidates in the configured mode.
    pub fn prime_candidates(&self) -> PrimeCandidates {
        derive_prime_candidates(&self.y2, &self.options)
    }

    /// Bias `candidates` with this IMS and derive the RSA key pair.
    pub fn rsa(&self, candidates: &PrimeCandidates) -> Result<RsaKeyPair, ImsError> {
        let (p, q) = bias_prime_candidates(candidates, &self.ims, &self.options)?;
        rsa_secret(&p, &q, self.options.public_exponent, &self.options)
    }

    /// Run every deriver.
    ///
    /// ECC validation failures abort the run. The RSA stage depends on the
    /// IMS bias having been chosen to land on primes, so its outcome is
    /// recorded in the key set instead of aborting.
    ///
    /// # Errors
    ///
    /// - `KeyValidation`: EPVK or ESVK failed curve validation
    pub fn derive_all(&self) -> Result<KeySet, ImsError> {
        let _span = tracing::debug_span!(
            "derive_all",
            mode = ?self.options.mode,
            ep_uid_variant = ?self.options.ep_uid_variant
        )
        .entered();

        let ep_uid = self.ep_uid();
        let primary = self.primary()?;
        let secondary = self.secondary()?;
        let candidates = self.prime_candidates();
        let rsa = self.rsa(&candidates);

        if let Err(err) = &rsa {
            tracing::warn!(%err, "RSA stage did not complete");
        }

        Ok(KeySet { ep_uid, primary, secondary, candidates, rsa })
    }
}

/// Everything derived from one IMS.
#[derive(Debug, Clone)]
pub struct KeySet {
    ep_uid: EpUid,
    primary: PrimaryKeyPair,
    secondary: SecondaryKeyPair,
    candidates: PrimeCandidates,
    rsa: Result<RsaKeyPair, ImsError>,
}

impl KeySet {
    /// Endpoint identifier.
    pub fn ep_uid(&self) -> EpUid {
        self.ep_uid
    }

    /// EPSK/EPVK.
    pub fn primary(&self) -> &PrimaryKeyPair {
        &self.primary
    }

    /// ESSK/ESVK.
    pub fn secondary(&self) -> &SecondaryKeyPair {
        &self.secondary
    }

    /// ERRK P/Q candidates before the bias step.
    pub fn prime_candidates(&self) -> &PrimeCandidates {
        &self.candidates
    }

    /// RSA key pair, or why the RSA stage failed.
    pub fn rsa(&self) -> Result<&RsaKeyPair, &ImsError> {
        self.rsa.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ims::IMS_SIZE,
        mode::{CompatibilityMode, EpUidVariant},
    };

    fn zero_ims() -> Ims {
        Ims::from_bytes([0u8; IMS_SIZE])
    }

    #[test]
    fn rejects_invalid_options() {
        let options = DeriveOptions { odd_modulus: 3, ..DeriveOptions::default() };
        assert!(matches!(
            Derivation::new(&zero_ims(), options),
            Err(ImsError::InvalidOption { .. })
        ));
    }

    #[test]
    fn matches_free_functions() {
        let ims = zero_ims();
        let derivation = Derivation::new(&ims, DeriveOptions::default()).unwrap();

        assert_eq!(derivation.y2().as_bytes(), derive_y2(&ims).as_bytes());
        assert_eq!(derivation.ep_uid(), derive_ep_uid(&ims, EpUidVariant::Legacy));
        assert_eq!(
            derivation.secondary().unwrap().essk(),
            derive_secondary(&derive_y2(&ims), CompatibilityMode::Production).unwrap().essk()
        );
    }

    #[test]
    fn legacy_zero_ims_keeps_ecc_keys_when_rsa_fails() {
        let derivation = Derivation::new(&zero_ims(), DeriveOptions::legacy()).unwrap();
        let keys = derivation.derive_all().unwrap();

        assert_eq!(keys.primary().epsk().len(), 55);
        assert_eq!(keys.secondary().essk().len(), 32);
        assert_eq!(keys.prime_candidates().p().len(), 32);
        assert_eq!(keys.prime_candidates().q().len(), 32);
        assert!(matches!(keys.rsa(), Err(ImsError::PreconditionViolation { .. })));
    }

    #[test]
    fn production_zero_ims_completes() {
        let derivation = Derivation::new(&zero_ims(), DeriveOptions::default()).unwrap();
        let keys = derivation.derive_all().unwrap();

        let rsa = keys.rsa().unwrap();
        assert_eq!(rsa.modulus().to_be_bytes().len(), 256);
        assert_eq!(rsa.dp().to_be_bytes().len(), 128);
        assert_eq!(rsa.public_exponent(), 65_537);
    }

    #[test]
    fn corrected_variant_is_honoured() {
        let options =
            DeriveOptions { ep_uid_variant: EpUidVariant::Corrected, ..DeriveOptions::default() };
        let derivation = Derivation::new(&zero_ims(), options).unwrap();
        assert_eq!(derivation.ep_uid().to_hex(), "0498eafd5f31a445");
    }
}
