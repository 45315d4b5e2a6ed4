//! Property-based tests for IMS key derivation
//!
//! These tests verify the invariants of the key hierarchy for arbitrary IMS
//! values:
//!
//! 1. **Determinism**: the same IMS and options always give the same keys
//! 2. **Separation**: legacy and production disagree where they should and
//!    agree where they share a derivation
//! 3. **Odd bias**: every prime candidate has its low residue forced
//! 4. **Validity**: every public key passes curve validation
//! 5. **RSA identities**: whenever the RSA stage completes, in either mode,
//!    its CRT components invert correctly and `P·Q` is the modulus

use imsgen_core::{
    CompatibilityMode, Derivation, DeriveOptions, EpUidVariant, Ff1024, IMS_SIZE, Ims, ImsError,
    bias_prime_candidates, derive_ep_uid, derive_prime_candidates, derive_primary,
    derive_secondary, derive_y2, primary::EPVK_SIZE, rsa_secret, secondary::ESVK_SIZE,
    validate_epvk, validate_esvk,
};
use proptest::{prelude::*, test_runner::TestCaseError};

fn arb_ims() -> impl Strategy<Value = Ims> {
    prop::collection::vec(any::<u8>(), IMS_SIZE).prop_map(|bytes| Ims::from_slice(&bytes).unwrap())
}

fn arb_odd_modulus() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![2u8, 4, 8, 16, 32, 64, 128])
}

/// Either the RSA stage completes with consistent components, or it stops
/// on a precondition.
fn check_rsa_stage(ims: &Ims, options: DeriveOptions) -> Result<(), TestCaseError> {
    let derivation = Derivation::new(ims, options).unwrap();
    let candidates = derivation.prime_candidates();

    match derivation.rsa(&candidates) {
        Ok(rsa) => {
            let (p, q) = bias_prime_candidates(&candidates, ims, derivation.options()).unwrap();
            prop_assert_eq!(rsa.p(), &p);
            prop_assert_eq!(rsa.q(), &q);

            let e = Ff1024::from_u64(u64::from(rsa.public_exponent()));
            for (prime, d) in [(&p, rsa.dp()), (&q, rsa.dq())] {
                prop_assert!(d.mul_mod(&e, &prime.half()).unwrap().is_one());
                prop_assert!(d.is_odd());
            }
            prop_assert!(q.mul_mod(rsa.c(), &p).unwrap().is_one());
            prop_assert_eq!(rsa.modulus(), &p.mul_wide(&q));
        },
        Err(err) => {
            let ImsError::PreconditionViolation { .. } = err else {
                return Err(TestCaseError::fail(format!("unexpected RSA error: {err:?}")));
            };
        },
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_derivation_is_deterministic(ims in arb_ims()) {
        let y2 = derive_y2(&ims);
        let again = derive_y2(&ims.clone());
        prop_assert_eq!(y2.as_bytes(), again.as_bytes());

        let first = derive_primary(&y2).unwrap();
        let second = derive_primary(&again).unwrap();
        prop_assert_eq!(first.epsk(), second.epsk());
        prop_assert_eq!(first.epvk(), second.epvk());

        for variant in [EpUidVariant::Legacy, EpUidVariant::Corrected] {
            prop_assert_eq!(derive_ep_uid(&ims, variant), derive_ep_uid(&ims, variant));
        }
    }

    #[test]
    fn prop_ep_uid_variants_disagree(ims in arb_ims()) {
        prop_assert_ne!(
            derive_ep_uid(&ims, EpUidVariant::Legacy),
            derive_ep_uid(&ims, EpUidVariant::Corrected)
        );
    }

    #[test]
    fn prop_modes_share_y2_but_separate_keys(ims in arb_ims()) {
        let legacy = Derivation::new(&ims, DeriveOptions::legacy()).unwrap();
        let production = Derivation::new(&ims, DeriveOptions::default()).unwrap();
        prop_assert_eq!(legacy.y2().as_bytes(), production.y2().as_bytes());

        let legacy_keys = legacy.derive_all().unwrap();
        let production_keys = production.derive_all().unwrap();

        // EPSK does not depend on the mode
        prop_assert_eq!(legacy_keys.primary().epsk(), production_keys.primary().epsk());

        prop_assert_ne!(legacy_keys.secondary().essk(), production_keys.secondary().essk());
        prop_assert_ne!(
            legacy_keys.prime_candidates().p(),
            production_keys.prime_candidates().p()
        );
        prop_assert_ne!(
            legacy_keys.prime_candidates().q(),
            production_keys.prime_candidates().q()
        );
    }

    #[test]
    fn prop_candidates_are_odd_biased(ims in arb_ims()) {
        let y2 = derive_y2(&ims);
        for options in [DeriveOptions::legacy(), DeriveOptions::default()] {
            let candidates = derive_prime_candidates(&y2, &options);
            prop_assert_eq!(candidates.p()[0] & 0x03, 0x03);
            prop_assert_eq!(candidates.q()[0] & 0x03, 0x03);
        }
    }

    #[test]
    fn prop_production_mask_tracks_odd_modulus(ims in arb_ims(), odd_modulus in arb_odd_modulus()) {
        let options = DeriveOptions { odd_modulus, ..DeriveOptions::default() };
        let candidates = derive_prime_candidates(&derive_y2(&ims), &options);
        let mask = odd_modulus - 1;
        prop_assert_eq!(candidates.p()[0] & mask, mask);
        prop_assert_eq!(candidates.q()[0] & mask, mask);
    }

    #[test]
    fn prop_public_keys_validate(ims in arb_ims()) {
        let y2 = derive_y2(&ims);

        let primary = derive_primary(&y2).unwrap();
        let epvk: [u8; EPVK_SIZE] = primary.epvk().try_into().unwrap();
        prop_assert!(validate_epvk(&epvk).is_ok());

        for mode in [CompatibilityMode::Legacy, CompatibilityMode::Production] {
            let secondary = derive_secondary(&y2, mode).unwrap();
            let esvk: [u8; ESVK_SIZE] = secondary.esvk().try_into().unwrap();
            prop_assert!(validate_esvk(&esvk).is_ok());
        }
    }

    #[test]
    fn prop_rsa_identities_when_complete(ims in arb_ims()) {
        check_rsa_stage(&ims, DeriveOptions::default())?;
    }

    #[test]
    fn prop_legacy_rsa_identities_when_complete(ims in arb_ims()) {
        check_rsa_stage(&ims, DeriveOptions::legacy())?;
    }

    #[test]
    fn prop_rsa_rejects_even_primes(p in any::<u64>(), q in any::<u64>()) {
        let p = Ff1024::from_u64(p & !1);
        let q = Ff1024::from_u64(q | 1);
        let result = rsa_secret(&p, &q, 65_537, &DeriveOptions::default());
        prop_assert!(
            matches!(result, Err(ImsError::PreconditionViolation { .. })),
            "even P accepted: {:?}",
            result.map(|_| ())
        );
    }
}
