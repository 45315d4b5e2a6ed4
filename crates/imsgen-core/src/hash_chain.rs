//! Domain-separated hash chain step
//!
//! Every derived term below Y2 is one application of
//! `chain(Y, b, n) = SHA-256(Y || b repeated n times)`. The repeated byte is
//! the domain separator: different `b` values give independent outputs from
//! the same parent term.

use sha2::{Digest, Sha256};

/// Size of every chain term in bytes.
pub const TERM_SIZE: usize = 32;

/// Repetition count used by every chain step in the key hierarchy.
pub const SEPARATOR_LEN: usize = 32;

/// Compute `SHA-256(parent || separator * repeat)`.
///
/// No length prefix and no delimiter: the hash input is exactly
/// `TERM_SIZE + repeat` bytes.
pub fn chain(parent: &[u8; TERM_SIZE], separator: u8, repeat: usize) -> [u8; TERM_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(parent);
    for _ in 0..repeat {
        hasher.update([separator]);
    }
    hasher.finalize().into()
}
