//! Endpoint Secondary Signing/Verification Key pair (Curve25519)
//!
//! Production derives ESSK two steps below Y2; the legacy sample set took
//! it directly from `chain(Y2, 0x01)`, which collides with Z1 of the
//! primary hierarchy. Both stay available through [`CompatibilityMode`].
//!
//! ESVK is the uncompressed point `0x04 ‖ x ‖ y` with 32-byte big-endian
//! coordinates.

use curve25519_dalek::{
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
    traits::IsIdentity,
};
use zeroize::Zeroize;

use crate::{
    affine::{ED25519_UNCOMPRESSED_SIZE, ed25519_compressed, ed25519_uncompressed},
    error::{ImsError, VerificationKey},
    hash_chain::{SEPARATOR_LEN, TERM_SIZE, chain},
    ims::Y2,
    mode::CompatibilityMode,
    octet::Octet,
};

/// ESSK length in bytes.
pub const ESSK_SIZE: usize = TERM_SIZE;

/// Uncompressed Edwards25519 point size.
pub const ESVK_SIZE: usize = ED25519_UNCOMPRESSED_SIZE;

/// Curve25519 key pair derived from Y2.
#[derive(Debug, Clone)]
pub struct SecondaryKeyPair {
    essk: Octet<ESSK_SIZE>,
    esvk: Octet<ESVK_SIZE>,
}

impl SecondaryKeyPair {
    /// Endpoint Secondary Signing Key, 32 bytes.
    pub fn essk(&self) -> &[u8] {
        self.essk.as_bytes()
    }

    /// Endpoint Secondary Verification Key, `0x04 ‖ x ‖ y`.
    pub fn esvk(&self) -> &[u8] {
        self.esvk.as_bytes()
    }
}

/// Derive ESSK and its validated public key from Y2.
///
/// # Errors
///
/// - `KeyValidation`: the computed ESVK is not a valid prime-order point
pub fn derive_secondary(y2: &Y2, mode: CompatibilityMode) -> Result<SecondaryKeyPair, ImsError> {
    let mut secret = match mode {
        CompatibilityMode::Legacy => chain(y2.as_bytes(), 0x01, SEPARATOR_LEN),
        CompatibilityMode::Production => {
            let mut z2 = chain(y2.as_bytes(), 0x02, SEPARATOR_LEN);
            let secret = chain(&z2, 0x01, SEPARATOR_LEN);
            z2.zeroize();
            secret
        },
    };

    let mut essk = Octet::<ESSK_SIZE>::new();
    essk.storage_mut().copy_from_slice(&secret);
    essk.set_len(ESSK_SIZE);
    secret.zeroize();

    let encoded = ed25519_uncompressed(&public_key(essk.as_bytes()))
        .ok_or_else(|| ImsError::key_validation(VerificationKey::Esvk, "not a curve point"))?;
    validate_esvk(&encoded)?;

    let mut esvk = Octet::<ESVK_SIZE>::new();
    esvk.storage_mut().copy_from_slice(&encoded);
    esvk.set_len(ESVK_SIZE);

    tracing::debug!(?mode, essk_len = essk.len(), "derived secondary key pair");
    tracing::trace!(esvk = %esvk.to_hex(), "ESVK");
    Ok(SecondaryKeyPair { essk, esvk })
}

/// Check that `encoded` is a usable Edwards25519 verification key.
///
/// # Errors
///
/// - `KeyValidation`: not an uncompressed curve point, small order, not in
///   the prime-order subgroup, or the identity
pub fn validate_esvk(encoded: &[u8; ESVK_SIZE]) -> Result<(), ImsError> {
    let Some(point) = ed25519_compressed(encoded)
        .and_then(|compressed| CompressedEdwardsY(compressed).decompress())
    else {
        return Err(ImsError::key_validation(VerificationKey::Esvk, "not a curve point"));
    };

    if point.is_identity() {
        return Err(ImsError::key_validation(VerificationKey::Esvk, "point is the identity"));
    }

    if point.is_small_order() {
        return Err(ImsError::key_validation(VerificationKey::Esvk, "point has small order"));
    }

    if !point.is_torsion_free() {
        return Err(ImsError::key_validation(VerificationKey::Esvk, "point is not torsion-free"));
    }

    Ok(())
}

/// `scalar·B` for the big-endian secret, compressed.
fn public_key(secret: &[u8]) -> [u8; ESSK_SIZE] {
    let mut little_endian = [0u8; ESSK_SIZE];
    for (out, byte) in little_endian.iter_mut().zip(secret.iter().rev()) {
        *out = *byte;
    }

    let mut scalar = Scalar::from_bytes_mod_order(little_endian);
    little_endian.zeroize();

    let encoded = EdwardsPoint::mul_base(&scalar).compress().to_bytes();
    scalar.zeroize();
    encoded
}
