//! Fuzz target for the full key hierarchy
//!
//! Drives every derivation stage from an arbitrary IMS and option set.
//!
//! # Strategy
//!
//! - Arbitrary 35-byte IMS values, including all-zero and all-ones
//! - Every compatibility mode and `EP_UID` variant
//! - Odd moduli inside and outside the accepted set
//!
//! # Invariants
//!
//! - Derivation never panics; bad options are rejected with `InvalidOption`
//! - Derivation is deterministic
//! - Every public key passes curve validation
//! - Prime candidates carry the odd-residue mask

#![no_main]

use arbitrary::Arbitrary;
use imsgen_core::{
    CompatibilityMode, Derivation, DeriveOptions, EpUidVariant, IMS_SIZE, Ims, ImsError,
    PqArithmetic, primary::EPVK_SIZE, secondary::ESVK_SIZE, validate_epvk, validate_esvk,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Scenario {
    ims: [u8; IMS_SIZE],
    legacy: bool,
    corrected_ep_uid: bool,
    decrement_then_halve: bool,
    odd_modulus: u8,
}

impl Scenario {
    fn options(&self) -> DeriveOptions {
        DeriveOptions {
            mode: if self.legacy { CompatibilityMode::Legacy } else { CompatibilityMode::Production },
            ep_uid_variant: if self.corrected_ep_uid {
                EpUidVariant::Corrected
            } else {
                EpUidVariant::Legacy
            },
            pq_arithmetic: if self.decrement_then_halve {
                PqArithmetic::DecrementThenHalve
            } else {
                PqArithmetic::Halve
            },
            odd_modulus: self.odd_modulus,
            ..DeriveOptions::default()
        }
    }
}

fuzz_target!(|scenario: Scenario| {
    let ims = Ims::from_bytes(scenario.ims);
    let options = scenario.options();

    let derivation = match Derivation::new(&ims, options) {
        Ok(derivation) => derivation,
        Err(err) => {
            assert!(matches!(err, ImsError::InvalidOption { .. }));
            assert!(options.validate().is_err());
            return;
        },
    };

    let Ok(keys) = derivation.derive_all() else {
        panic!("valid options must derive ECC keys");
    };
    let Ok(again) = derivation.derive_all() else {
        panic!("derivation must be repeatable");
    };

    assert_eq!(keys.ep_uid(), again.ep_uid());
    assert_eq!(keys.primary().epsk(), again.primary().epsk());
    assert_eq!(keys.secondary().essk(), again.secondary().essk());
    assert_eq!(keys.prime_candidates().p(), again.prime_candidates().p());

    let epvk: [u8; EPVK_SIZE] = keys.primary().epvk().try_into().unwrap_or([0; EPVK_SIZE]);
    assert!(validate_epvk(&epvk).is_ok());
    let esvk: [u8; ESVK_SIZE] = keys.secondary().esvk().try_into().unwrap_or([0; ESVK_SIZE]);
    assert!(validate_esvk(&esvk).is_ok());

    let mask = options.odd_mask();
    assert_eq!(keys.prime_candidates().p()[0] & mask, mask);
    assert_eq!(keys.prime_candidates().q()[0] & mask, mask);

    if let Err(err) = keys.rsa() {
        assert!(matches!(err, ImsError::PreconditionViolation { .. }));
    }
});
