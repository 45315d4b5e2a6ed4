//! ERRK prime candidates
//!
//! ```text
//! Y2 ──chain(0x03)──▶ Z3
//! Z3 ──chain(0x01..=0x04)──▶ P (128 bytes)
//! Z3 ──chain(0x05..=0x08)──▶ Q (128 bytes)
//! ```
//!
//! Legacy mode keeps the first 32 bytes of each candidate and reads them
//! big-endian; production keeps all 128 and reads them little-endian.
//! Byte 0 is OR-ed with the odd mask in both modes, which lands on the most
//! significant byte in legacy and the least significant byte in production.
//!
//! The bias step then offsets P and Q by multiples of the odd modulus taken
//! from the IMS bias field. The provisioning process chose that field so the
//! offsets land on primes; no primality search happens here.

use zeroize::Zeroize;

use crate::{
    error::ImsError,
    ff::Ff1024,
    hash_chain::{SEPARATOR_LEN, TERM_SIZE, chain},
    ims::{Ims, Y2},
    mode::{CompatibilityMode, DeriveOptions},
    octet::Octet,
};

/// Candidate storage in bytes.
pub const PRIME_CAPACITY: usize = 128;

/// Legacy candidate length in bytes.
pub const LEGACY_PRIME_SIZE: usize = 32;

/// Bias field split: high part offsets P, low part offsets Q.
const BIAS_SPLIT: u32 = 4096;

/// Separators for the four P terms.
const P_SEPARATORS: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

/// Separators for the four Q terms.
const Q_SEPARATORS: [u8; 4] = [0x05, 0x06, 0x07, 0x08];

/// P and Q candidates before the bias step.
#[derive(Debug, Clone)]
pub struct PrimeCandidates {
    p: Octet<PRIME_CAPACITY>,
    q: Octet<PRIME_CAPACITY>,
    mode: CompatibilityMode,
}

impl PrimeCandidates {
    /// P candidate bytes (32 in legacy mode, 128 in production).
    pub fn p(&self) -> &[u8] {
        self.p.as_bytes()
    }

    /// Q candidate bytes (32 in legacy mode, 128 in production).
    pub fn q(&self) -> &[u8] {
        self.q.as_bytes()
    }

    /// Mode the candidates were derived in.
    pub fn mode(&self) -> CompatibilityMode {
        self.mode
    }

    /// Load a candidate as an integer in the mode's byte order.
    fn load(&self, candidate: &Octet<PRIME_CAPACITY>) -> Result<Ff1024, ImsError> {
        match self.mode {
            CompatibilityMode::Legacy => Ff1024::from_be_bytes(candidate.as_bytes()),
            CompatibilityMode::Production => Ff1024::from_le_bytes(candidate.as_bytes()),
        }
    }
}

/// Derive the P/Q candidates from Y2 and force their low residue.
pub fn derive_prime_candidates(y2: &Y2, options: &DeriveOptions) -> PrimeCandidates {
    let mut z3 = chain(y2.as_bytes(), 0x03, SEPARATOR_LEN);

    let len = match options.mode {
        CompatibilityMode::Legacy => LEGACY_PRIME_SIZE,
        CompatibilityMode::Production => PRIME_CAPACITY,
    };
    let mask = options.odd_mask();

    let p = candidate(&z3, &P_SEPARATORS, len, mask);
    let q = candidate(&z3, &Q_SEPARATORS, len, mask);
    z3.zeroize();

    tracing::debug!(mode = ?options.mode, len, mask, "derived prime candidates");
    PrimeCandidates { p, q, mode: options.mode }
}

/// Apply the IMS bias to the candidates and load them as integers.
///
/// Returns `(P, Q)` at 1024-bit width.
///
/// # Errors
///
/// - `InvalidOption`: `options` disagree with the candidates' mode, or fail
///   validation
/// - `PreconditionViolation`: a biased candidate no longer fits 1024 bits
pub fn bias_prime_candidates(
    candidates: &PrimeCandidates,
    ims: &Ims,
    options: &DeriveOptions,
) -> Result<(Ff1024, Ff1024), ImsError> {
    options.validate()?;
    if options.mode != candidates.mode {
        return Err(ImsError::InvalidOption {
            reason: format!(
                "candidates derived in {:?} mode, biased in {:?} mode",
                candidates.mode, options.mode
            ),
        });
    }

    let bias = ims.bias();
    let step = u64::from(options.bias_step());
    let p_offset = u64::from(bias / BIAS_SPLIT) * step;
    let q_offset = u64::from(bias % BIAS_SPLIT) * step;

    let p = candidates
        .load(&candidates.p)?
        .checked_add_u64(p_offset)
        .ok_or_else(|| ImsError::precondition("P + bias exceeds 1024 bits"))?;
    let q = candidates
        .load(&candidates.q)?
        .checked_add_u64(q_offset)
        .ok_or_else(|| ImsError::precondition("Q + bias exceeds 1024 bits"))?;

    tracing::debug!(mode = ?options.mode, step, "applied IMS bias to prime candidates");
    Ok((p, q))
}

fn candidate(
    z3: &[u8; TERM_SIZE],
    separators: &[u8],
    len: usize,
    mask: u8,
) -> Octet<PRIME_CAPACITY> {
    let mut octet = Octet::<PRIME_CAPACITY>::new();
    let storage = octet.storage_mut();
    for (block, &separator) in storage.chunks_exact_mut(TERM_SIZE).zip(separators) {
        let mut term = chain(z3, separator, SEPARATOR_LEN);
        block.copy_from_slice(&term);
        term.zeroize();
    }

    // Bytes past the logical length never leave the buffer
    storage[len..].zeroize();
    storage[0] |= mask;
    octet.set_len(len);
    octet
}
