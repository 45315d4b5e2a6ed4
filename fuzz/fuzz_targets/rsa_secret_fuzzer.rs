//! Fuzz target for RSA secret derivation
//!
//! Feeds arbitrary prime-sized integers to `rsa_secret`. Most inputs are
//! not prime, so the target checks the arithmetic identities that hold
//! whenever a key pair is produced, and that everything else is refused
//! with a precondition error.
//!
//! # Invariants
//!
//! - Never panics
//! - Even P or Q is always rejected
//! - On success: `e * dp == 1 (mod P >> 1)`, dp and dq odd,
//!   `Q * c == 1 (mod P)`, `N == P * Q`

#![no_main]

use arbitrary::Arbitrary;
use imsgen_core::{DeriveOptions, Ff1024, ImsError, rsa_secret};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Scenario {
    p: Vec<u8>,
    q: Vec<u8>,
    e: u32,
}

fuzz_target!(|scenario: Scenario| {
    let (Ok(p), Ok(q)) = (
        Ff1024::from_be_bytes(&scenario.p),
        Ff1024::from_be_bytes(&scenario.q),
    ) else {
        return;
    };

    let result = rsa_secret(&p, &q, scenario.e, &DeriveOptions::default());
    let keys = match result {
        Ok(keys) => keys,
        Err(err) => {
            assert!(matches!(err, ImsError::PreconditionViolation { .. }));
            return;
        },
    };

    assert!(p.is_odd() && q.is_odd());
    assert!(!scenario.e.is_multiple_of(2));

    let e = Ff1024::from_u64(u64::from(scenario.e));
    for (prime, d) in [(&p, keys.dp()), (&q, keys.dq())] {
        let t = prime.half();
        assert!(d.is_odd());
        if !t.is_one() {
            let check = d.mul_mod(&e, &t);
            assert!(check.is_some_and(|value| value.is_one()));
        }
    }

    let check = q.mul_mod(keys.c(), &p);
    assert!(check.is_some_and(|value| value.is_one()));
    assert_eq!(*keys.modulus(), p.mul_wide(&q));
    assert_eq!((keys.p(), keys.q()), (&p, &q));
});
