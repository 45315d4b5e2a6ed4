//! ERRK/ERPK: RSA private components from finalized primes
//!
//! Given P and Q (already biased onto primes by the provisioning process),
//! compute the public modulus and the CRT private components:
//!
//! ```text
//! N  = P·Q
//! dp = e⁻¹ mod (P >> 1), bumped by (P >> 1) if even
//! dq = e⁻¹ mod (Q >> 1), bumped by (Q >> 1) if even
//! c  = Q⁻¹ mod P
//! ```
//!
//! Deterministic: no primality test and no exponent blinding.

use crate::{
    error::ImsError,
    ff::{Ff1024, Ff2048},
    mode::{DeriveOptions, PqArithmetic},
};

/// RSA key material derived from P and Q.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    p: Ff1024,
    q: Ff1024,
    modulus: Ff2048,
    public_exponent: u32,
    dp: Ff1024,
    dq: Ff1024,
    c: Ff1024,
}

impl RsaKeyPair {
    /// Finalized prime P, after the IMS bias.
    pub fn p(&self) -> &Ff1024 {
        &self.p
    }

    /// Finalized prime Q, after the IMS bias.
    pub fn q(&self) -> &Ff1024 {
        &self.q
    }

    /// ERPK modulus `N = P·Q` (2048-bit).
    pub fn modulus(&self) -> &Ff2048 {
        &self.modulus
    }

    /// ERPK public exponent.
    pub fn public_exponent(&self) -> u32 {
        self.public_exponent
    }

    /// CRT exponent for P.
    pub fn dp(&self) -> &Ff1024 {
        &self.dp
    }

    /// CRT exponent for Q.
    pub fn dq(&self) -> &Ff1024 {
        &self.dq
    }

    /// CRT coefficient `Q⁻¹ mod P`.
    pub fn c(&self) -> &Ff1024 {
        &self.c
    }
}

/// Derive the RSA key pair from finalized primes.
///
/// # Errors
///
/// - `PreconditionViolation`: `e` is even or zero, P or Q is even or not
///   greater than one, `e` has no inverse modulo either exponent modulus,
///   or Q has no inverse modulo P
pub fn rsa_secret(
    p: &Ff1024,
    q: &Ff1024,
    e: u32,
    options: &DeriveOptions,
) -> Result<RsaKeyPair, ImsError> {
    if e.is_multiple_of(2) {
        return Err(ImsError::precondition(format!("public exponent {e} must be odd")));
    }

    for (name, prime) in [("P", p), ("Q", q)] {
        if !prime.is_odd() {
            return Err(ImsError::precondition(format!("{name} is even")));
        }
        if prime.is_one() {
            return Err(ImsError::precondition(format!("{name} must be greater than one")));
        }
    }

    let arithmetic = options.effective_pq_arithmetic();
    if arithmetic == PqArithmetic::DecrementThenHalve {
        tracing::warn!("using legacy decrement-then-halve RSA exponent arithmetic");
    }

    let dp = crt_exponent(p, e, arithmetic)
        .ok_or_else(|| ImsError::precondition(format!("{e} has no inverse modulo P >> 1")))?;
    let dq = crt_exponent(q, e, arithmetic)
        .ok_or_else(|| ImsError::precondition(format!("{e} has no inverse modulo Q >> 1")))?;
    let c = q.inv_mod(p).ok_or_else(|| ImsError::precondition("Q has no inverse modulo P"))?;

    let modulus = p.mul_wide(q);

    tracing::debug!(
        modulus_bits = modulus.bit_len(),
        public_exponent = e,
        ?arithmetic,
        "derived RSA key pair"
    );
    Ok(RsaKeyPair { p: p.clone(), q: q.clone(), modulus, public_exponent: e, dp, dq, c })
}

/// `e⁻¹ mod t`, forced odd by adding `t`.
fn crt_exponent(prime: &Ff1024, e: u32, arithmetic: PqArithmetic) -> Option<Ff1024> {
    let t = match arithmetic {
        PqArithmetic::Halve => prime.half(),
        PqArithmetic::DecrementThenHalve => prime.checked_sub_u64(1)?.half(),
    };

    let d = Ff1024::from_u64(u64::from(e)).inv_mod(&t)?;
    if d.is_odd() { Some(d) } else { d.checked_add(&t) }
}
