//! Endpoint Primary Signing/Verification Key pair (Ed448)
//!
//! ```text
//! Y2 ──chain(0x01)──▶ Z1
//! Z1 ──chain(0x01)──▶ EPSK[0..32]
//! Z1 ──chain(0x02)──▶ EPSK[32..55]   (first 23 bytes only)
//! EPSK (big-endian) mod ℓ ──▶ scalar ──▶ scalar·B ──▶ EPVK (113 bytes)
//! ```
//!
//! EPVK is the uncompressed point `0x04 ‖ x ‖ y` with 56-byte big-endian
//! coordinates.

use ed448_goldilocks::{
    Scalar,
    curve::edwards::{CompressedEdwardsY, ExtendedPoint},
};
use zeroize::Zeroize;

use crate::{
    affine::{
        ED448_COMPRESSED_SIZE, ED448_UNCOMPRESSED_SIZE, ed448_compressed, ed448_uncompressed,
    },
    error::{ImsError, VerificationKey},
    hash_chain::{SEPARATOR_LEN, TERM_SIZE, chain},
    ims::Y2,
    octet::Octet,
};

/// EPSK length in bytes.
pub const EPSK_SIZE: usize = 55;

/// EPSK storage: two chain terms.
pub const EPSK_CAPACITY: usize = 2 * TERM_SIZE;

/// Uncompressed Ed448 point size.
pub const EPVK_SIZE: usize = ED448_UNCOMPRESSED_SIZE;

/// Width accepted by the Ed448 wide scalar reduction.
const WIDE_SCALAR_SIZE: usize = 114;

/// Ed448 key pair derived from Y2.
#[derive(Debug, Clone)]
pub struct PrimaryKeyPair {
    epsk: Octet<EPSK_CAPACITY>,
    epvk: Octet<EPVK_SIZE>,
}

impl PrimaryKeyPair {
    /// Endpoint Primary Signing Key, 55 bytes.
    pub fn epsk(&self) -> &[u8] {
        self.epsk.as_bytes()
    }

    /// Endpoint Primary Verification Key, `0x04 ‖ x ‖ y`.
    pub fn epvk(&self) -> &[u8] {
        self.epvk.as_bytes()
    }
}

/// Derive EPSK and its validated public key from Y2.
///
/// # Errors
///
/// - `KeyValidation`: the computed EPVK is not a valid prime-order point
pub fn derive_primary(y2: &Y2) -> Result<PrimaryKeyPair, ImsError> {
    let mut z1 = chain(y2.as_bytes(), 0x01, SEPARATOR_LEN);
    let mut head = chain(&z1, 0x01, SEPARATOR_LEN);
    let mut tail = chain(&z1, 0x02, SEPARATOR_LEN);

    let mut epsk = Octet::<EPSK_CAPACITY>::new();
    let storage = epsk.storage_mut();
    storage[..TERM_SIZE].copy_from_slice(&head);
    storage[TERM_SIZE..EPSK_SIZE].copy_from_slice(&tail[..EPSK_SIZE - TERM_SIZE]);
    epsk.set_len(EPSK_SIZE);

    z1.zeroize();
    head.zeroize();
    tail.zeroize();

    let encoded = ed448_uncompressed(&public_key(epsk.as_bytes()))
        .ok_or_else(|| ImsError::key_validation(VerificationKey::Epvk, "not a curve point"))?;
    validate_epvk(&encoded)?;

    let mut epvk = Octet::<EPVK_SIZE>::new();
    epvk.storage_mut().copy_from_slice(&encoded);
    epvk.set_len(EPVK_SIZE);

    tracing::debug!(epsk_len = epsk.len(), epvk_len = epvk.len(), "derived primary key pair");
    tracing::trace!(epvk = %epvk.to_hex(), "EPVK");
    Ok(PrimaryKeyPair { epsk, epvk })
}

/// Check that `encoded` is a usable Ed448 verification key.
///
/// # Errors
///
/// - `KeyValidation`: not an uncompressed curve point, not in the
///   prime-order subgroup, or the identity
pub fn validate_epvk(encoded: &[u8; EPVK_SIZE]) -> Result<(), ImsError> {
    let Some(point) = ed448_compressed(encoded)
        .and_then(|compressed| CompressedEdwardsY(compressed).decompress())
    else {
        return Err(ImsError::key_validation(VerificationKey::Epvk, "not a curve point"));
    };

    if !point.is_torsion_free() {
        return Err(ImsError::key_validation(VerificationKey::Epvk, "point is not torsion-free"));
    }

    if point == ExtendedPoint::identity() {
        return Err(ImsError::key_validation(VerificationKey::Epvk, "point is the identity"));
    }

    Ok(())
}

/// `scalar·B` for the big-endian secret, RFC 8032 compressed.
fn public_key(secret: &[u8]) -> [u8; ED448_COMPRESSED_SIZE] {
    let mut wide = [0u8; WIDE_SCALAR_SIZE];
    for (out, byte) in wide.iter_mut().zip(secret.iter().rev()) {
        *out = *byte;
    }

    let scalar = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();

    ExtendedPoint::generator().scalar_mul(&scalar).compress().0
}
