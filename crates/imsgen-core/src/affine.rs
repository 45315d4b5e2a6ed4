//! Uncompressed verification key encoding
//!
//! EPVK and ESVK leave the engine as `0x04 ‖ x ‖ y`: affine coordinates,
//! each big-endian at the field width. The curve libraries only speak the
//! RFC 8032 compressed form (`y` little-endian, the parity of `x` in the
//! top bit), so this module converts between the two. `x` is recovered
//! from the curve equation; the way back in checks the curve equation
//! before anything is handed to the library.

use crypto_bigint::{
    Encoding, Integer, U256, U448, impl_modulus,
    modular::constant_mod::{Residue, ResidueParams},
};

/// Leading byte of an uncompressed point.
pub const UNCOMPRESSED_TAG: u8 = 0x04;

/// Ed448 coordinate size in bytes.
pub const ED448_COORDINATE_SIZE: usize = U448::BYTES;

/// Ed448 RFC 8032 encoding size.
pub const ED448_COMPRESSED_SIZE: usize = ED448_COORDINATE_SIZE + 1;

/// Ed448 uncompressed encoding size.
pub const ED448_UNCOMPRESSED_SIZE: usize = 1 + 2 * ED448_COORDINATE_SIZE;

/// Edwards25519 coordinate size in bytes.
pub const ED25519_COORDINATE_SIZE: usize = U256::BYTES;

/// Edwards25519 uncompressed encoding size.
pub const ED25519_UNCOMPRESSED_SIZE: usize = 1 + 2 * ED25519_COORDINATE_SIZE;

// 2^448 - 2^224 - 1
impl_modulus!(
    Ed448Field,
    U448,
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
);

// 2^255 - 19
impl_modulus!(
    Ed25519Field,
    U256,
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed"
);

type Fe448 = Residue<Ed448Field, { U448::LIMBS }>;
type Fe25519 = Residue<Ed25519Field, { U256::LIMBS }>;

/// Ed448 curve constant `d = -39081`.
const ED448_D: u32 = 39_081;

/// `(p + 1) / 4`: square root exponent for p ≡ 3 (mod 4).
const ED448_SQRT_EXP: U448 = U448::from_be_hex(
    "3fffffffffffffffffffffffffffffffffffffffffffffffffffffffc0000000000000000000000000000000000000000000000000000000",
);

/// Edwards25519 `d = -121665/121666`.
const ED25519_D: U256 =
    U256::from_be_hex("52036cee2b6ffe738cc740797779e89800700a4d4141d8ab75eb4dca135978a3");

/// `(p + 3) / 8`: square root candidate exponent for p ≡ 5 (mod 8).
const ED25519_SQRT_EXP: U256 =
    U256::from_be_hex("0ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe");

/// `2^((p - 1) / 4)`, a square root of -1.
const ED25519_SQRT_M1: U256 =
    U256::from_be_hex("2b8324804fc1df0b2b4d00993dfbd7a72f431806ad2fe478c4ee1b274a0ea0b0");

/// RFC 8032 Ed448 encoding to `0x04 ‖ x ‖ y`.
///
/// Returns `None` if the encoding is not a curve point.
pub fn ed448_uncompressed(
    compressed: &[u8; ED448_COMPRESSED_SIZE],
) -> Option<[u8; ED448_UNCOMPRESSED_SIZE]> {
    let (y_le, flags) = compressed.split_at(ED448_COORDINATE_SIZE);
    if flags[0] & 0x7f != 0 {
        return None;
    }

    let y = U448::from_le_slice(y_le);
    if y >= Ed448Field::MODULUS {
        return None;
    }

    let y_fe = Fe448::new(&y);
    let y_squared = y_fe.square();
    let numerator = y_squared.sub(&Fe448::ONE);
    let curve_d = Fe448::new(&U448::from_u32(ED448_D)).neg();
    let (denominator_inv, invertible) = curve_d.mul(&y_squared).sub(&Fe448::ONE).invert();
    if !bool::from(invertible) {
        return None;
    }

    let x_squared = numerator.mul(&denominator_inv);
    let root = x_squared.pow(&ED448_SQRT_EXP);
    if root.square() != x_squared {
        return None;
    }

    let x = with_parity(root, flags[0] >> 7)?.retrieve();

    let mut out = [0u8; ED448_UNCOMPRESSED_SIZE];
    out[0] = UNCOMPRESSED_TAG;
    out[1..=ED448_COORDINATE_SIZE].copy_from_slice(&x.to_be_bytes());
    out[1 + ED448_COORDINATE_SIZE..].copy_from_slice(&y.to_be_bytes());
    Some(out)
}

/// `0x04 ‖ x ‖ y` to the RFC 8032 Ed448 encoding.
///
/// Returns `None` for a wrong tag, an unreduced coordinate, or a pair off
/// the curve `x² + y² = 1 + d·x²·y²`.
pub fn ed448_compressed(
    uncompressed: &[u8; ED448_UNCOMPRESSED_SIZE],
) -> Option<[u8; ED448_COMPRESSED_SIZE]> {
    if uncompressed[0] != UNCOMPRESSED_TAG {
        return None;
    }

    let x = U448::from_be_slice(&uncompressed[1..=ED448_COORDINATE_SIZE]);
    let y = U448::from_be_slice(&uncompressed[1 + ED448_COORDINATE_SIZE..]);
    if x >= Ed448Field::MODULUS || y >= Ed448Field::MODULUS {
        return None;
    }

    let x_squared = Fe448::new(&x).square();
    let y_squared = Fe448::new(&y).square();
    let curve_d = Fe448::new(&U448::from_u32(ED448_D)).neg();
    let lhs = x_squared.add(&y_squared);
    let rhs = Fe448::ONE.add(&curve_d.mul(&x_squared).mul(&y_squared));
    if lhs != rhs {
        return None;
    }

    let mut out = [0u8; ED448_COMPRESSED_SIZE];
    out[..ED448_COORDINATE_SIZE].copy_from_slice(&y.to_le_bytes());
    out[ED448_COORDINATE_SIZE] = u8::from(bool::from(x.is_odd())) << 7;
    Some(out)
}

/// Edwards25519 compressed encoding to `0x04 ‖ x ‖ y`.
///
/// Returns `None` if the encoding is not a curve point.
pub fn ed25519_uncompressed(
    compressed: &[u8; ED25519_COORDINATE_SIZE],
) -> Option<[u8; ED25519_UNCOMPRESSED_SIZE]> {
    let mut y_le = *compressed;
    let sign = y_le[ED25519_COORDINATE_SIZE - 1] >> 7;
    y_le[ED25519_COORDINATE_SIZE - 1] &= 0x7f;

    let y = U256::from_le_slice(&y_le);
    if y >= Ed25519Field::MODULUS {
        return None;
    }

    let y_fe = Fe25519::new(&y);
    let y_squared = y_fe.square();
    let numerator = y_squared.sub(&Fe25519::ONE);
    let curve_d = Fe25519::new(&ED25519_D);
    let (denominator_inv, invertible) = curve_d.mul(&y_squared).add(&Fe25519::ONE).invert();
    if !bool::from(invertible) {
        return None;
    }

    let x_squared = numerator.mul(&denominator_inv);
    let candidate = x_squared.pow(&ED25519_SQRT_EXP);
    let root = if candidate.square() == x_squared {
        candidate
    } else if candidate.square() == x_squared.neg() {
        candidate.mul(&Fe25519::new(&ED25519_SQRT_M1))
    } else {
        return None;
    };

    let x = with_parity(root, sign)?.retrieve();

    let mut out = [0u8; ED25519_UNCOMPRESSED_SIZE];
    out[0] = UNCOMPRESSED_TAG;
    out[1..=ED25519_COORDINATE_SIZE].copy_from_slice(&x.to_be_bytes());
    out[1 + ED25519_COORDINATE_SIZE..].copy_from_slice(&y.to_be_bytes());
    Some(out)
}

/// `0x04 ‖ x ‖ y` to the Edwards25519 compressed encoding.
///
/// Returns `None` for a wrong tag, an unreduced coordinate, or a pair off
/// the curve `-x² + y² = 1 + d·x²·y²`.
pub fn ed25519_compressed(
    uncompressed: &[u8; ED25519_UNCOMPRESSED_SIZE],
) -> Option<[u8; ED25519_COORDINATE_SIZE]> {
    if uncompressed[0] != UNCOMPRESSED_TAG {
        return None;
    }

    let x = U256::from_be_slice(&uncompressed[1..=ED25519_COORDINATE_SIZE]);
    let y = U256::from_be_slice(&uncompressed[1 + ED25519_COORDINATE_SIZE..]);
    if x >= Ed25519Field::MODULUS || y >= Ed25519Field::MODULUS {
        return None;
    }

    let x_squared = Fe25519::new(&x).square();
    let y_squared = Fe25519::new(&y).square();
    let curve_d = Fe25519::new(&ED25519_D);
    let lhs = y_squared.sub(&x_squared);
    let rhs = Fe25519::ONE.add(&curve_d.mul(&x_squared).mul(&y_squared));
    if lhs != rhs {
        return None;
    }

    let mut out = y.to_le_bytes();
    out[ED25519_COORDINATE_SIZE - 1] |= u8::from(bool::from(x.is_odd())) << 7;
    Some(out)
}

/// Pick the root whose parity matches `sign`. A zero root has no
/// negative, so it only matches a clear sign bit.
fn with_parity<MOD, const LIMBS: usize>(
    root: Residue<MOD, LIMBS>,
    sign: u8,
) -> Option<Residue<MOD, LIMBS>>
where
    MOD: ResidueParams<LIMBS>,
{
    let odd = u8::from(bool::from(root.retrieve().is_odd()));
    if odd == sign {
        return Some(root);
    }
    if root == Residue::ZERO {
        return None;
    }
    Some(root.neg())
}
