//! Fixed-width integers for the RSA stage
//!
//! [`Ff`] wraps a `crypto_bigint::Uint` so that every secret integer in
//! the ERRK/RSA derivation has one width, one byte order on the way in and
//! out, and is zeroized on drop. The arithmetic itself is `crypto-bigint`'s.
//!
//! Values enter and leave only through explicit big-endian or
//! little-endian byte conversion. Primes and CRT components are
//! [`Ff1024`]; the modulus is [`Ff2048`].

use std::fmt;

use crypto_bigint::{Integer, Limb, U1024, U2048, Uint};
use zeroize::{Zeroize, Zeroizing};

use crate::error::ImsError;

/// Limbs for a 1024-bit prime or CRT component.
pub const PRIME_LIMBS: usize = U1024::LIMBS;

/// Limbs for a 2048-bit modulus.
pub const MODULUS_LIMBS: usize = U2048::LIMBS;

/// Width of P, Q, `dp`, `dq` and `c`.
pub type Ff1024 = Ff<PRIME_LIMBS>;

/// Width of the ERPK modulus.
pub type Ff2048 = Ff<MODULUS_LIMBS>;

/// Fixed-width unsigned integer holding secret key material.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ff<const LIMBS: usize> {
    value: Uint<LIMBS>,
}

impl<const LIMBS: usize> Ff<LIMBS> {
    /// Width in bytes.
    pub const BYTES: usize = Uint::<LIMBS>::BYTES;

    /// Small value.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self { value: Uint::from_u64(value) }
    }

    /// Load a big-endian byte string.
    ///
    /// Leading zero bytes beyond the width are accepted.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: the value needs more than [`Self::BYTES`] bytes
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, ImsError> {
        let significant = bytes.iter().position(|&b| b != 0).map_or(&[][..], |i| &bytes[i..]);
        if significant.len() > Self::BYTES {
            return Err(ImsError::InvalidLength {
                expected: Self::BYTES,
                actual: significant.len(),
            });
        }

        let mut padded = Zeroizing::new(vec![0u8; Self::BYTES]);
        padded[Self::BYTES - significant.len()..].copy_from_slice(significant);
        Ok(Self { value: Uint::from_be_slice(&padded) })
    }

    /// Load a little-endian byte string.
    ///
    /// The input is reversed into a scratch copy that is zeroized before
    /// returning; `bytes` itself is never modified.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: the value needs more than [`Self::BYTES`] bytes
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, ImsError> {
        let mut scratch = Zeroizing::new(bytes.to_vec());
        scratch.reverse();
        Self::from_be_bytes(&scratch)
    }

    /// Big-endian export at full width ([`Self::BYTES`] bytes).
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.value.as_words().iter().rev().flat_map(|word| word.to_be_bytes()).collect()
    }

    /// Number of significant bits.
    pub fn bit_len(&self) -> usize {
        self.value.bits_vartime()
    }

    /// True if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.value == Uint::ZERO
    }

    /// True if the value is one.
    pub fn is_one(&self) -> bool {
        self.value == Uint::ONE
    }

    /// True if the lowest bit is set.
    pub fn is_odd(&self) -> bool {
        self.value.is_odd().into()
    }

    /// `self + value`, or `None` if the sum does not fit the width.
    #[must_use]
    pub fn checked_add_u64(&self, value: u64) -> Option<Self> {
        let (sum, carry) = self.value.adc(&Uint::from_u64(value), Limb::ZERO);
        (carry == Limb::ZERO).then_some(Self { value: sum })
    }

    /// `self - value`, or `None` if the difference would be negative.
    #[must_use]
    pub fn checked_sub_u64(&self, value: u64) -> Option<Self> {
        let (difference, borrow) = self.value.sbb(&Uint::from_u64(value), Limb::ZERO);
        (borrow == Limb::ZERO).then_some(Self { value: difference })
    }

    /// `self >> 1`.
    #[must_use]
    pub fn half(&self) -> Self {
        Self { value: self.value.shr_vartime(1) }
    }

    /// `self mod modulus`, or `None` for a zero modulus.
    #[must_use]
    pub fn modulo(&self, modulus: &Self) -> Option<Self> {
        let (remainder, is_some) = self.value.const_rem(&modulus.value);
        bool::from(is_some).then_some(Self { value: remainder })
    }

    /// `self · other mod modulus` over the double-width product, or `None`
    /// for a zero modulus.
    #[must_use]
    pub fn mul_mod(&self, other: &Self, modulus: &Self) -> Option<Self> {
        let wide = self.value.mul_wide(&other.value);
        let (remainder, is_some) = Uint::const_rem_wide(wide, &modulus.value);
        bool::from(is_some).then_some(Self { value: remainder })
    }

    /// Inverse of `self` modulo `modulus`, odd or even.
    ///
    /// Returns `None` if the modulus is zero or shares a factor with
    /// `self`. The result is fully reduced.
    #[must_use]
    pub fn inv_mod(&self, modulus: &Self) -> Option<Self> {
        let reduced = self.modulo(modulus)?;
        let (inverse, exists) = reduced.value.inv_mod(&modulus.value);
        bool::from(exists).then_some(Self { value: inverse })
    }

    /// `self + other`, or `None` if the sum does not fit the width.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let (sum, carry) = self.value.adc(&other.value, Limb::ZERO);
        (carry == Limb::ZERO).then_some(Self { value: sum })
    }
}

impl Ff1024 {
    /// Full product at double width. Never overflows.
    #[must_use]
    pub fn mul_wide(&self, other: &Self) -> Ff2048 {
        let (lo, hi) = self.value.mul_wide(&other.value);
        Ff { value: hi.concat(&lo) }
    }
}

impl<const LIMBS: usize> fmt::Debug for Ff<LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ff").field("bits", &Uint::<LIMBS>::BITS).finish_non_exhaustive()
    }
}

impl<const LIMBS: usize> Drop for Ff<LIMBS> {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(value: u64) -> Ff1024 {
        Ff1024::from_u64(value)
    }

    #[test]
    fn byte_orders_agree() {
        let be = Ff1024::from_be_bytes(&[0x01, 0x02, 0x03]).unwrap();
        let le = Ff1024::from_le_bytes(&[0x03, 0x02, 0x01]).unwrap();
        assert_eq!(be, le);
        assert_eq!(be, small(0x0001_0203));
    }

    #[test]
    fn export_is_full_width_big_endian() {
        let bytes = small(0x0102).to_be_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[126..], &[0x01, 0x02]);
        assert!(bytes[..126].iter().all(|&b| b == 0));

        assert_eq!(Ff2048::from_u64(1).to_be_bytes().len(), 256);
    }

    #[test]
    fn leading_zeros_beyond_width_are_accepted() {
        let mut bytes = vec![0u8; 200];
        bytes[199] = 7;
        assert_eq!(Ff1024::from_be_bytes(&bytes).unwrap(), small(7));
    }

    #[test]
    fn oversized_value_is_rejected() {
        let mut bytes = vec![0u8; 129];
        bytes[0] = 1;
        assert_eq!(
            Ff1024::from_be_bytes(&bytes),
            Err(ImsError::InvalidLength { expected: 128, actual: 129 })
        );
    }

    #[test]
    fn add_reports_overflow() {
        let max = Ff1024::from_be_bytes(&[0xff; 128]).unwrap();
        assert!(max.checked_add_u64(1).is_none());
        assert_eq!(small(5).checked_add_u64(6), Some(small(11)));
        assert!(small(0).checked_sub_u64(1).is_none());
        assert_eq!(small(11).checked_sub_u64(1), Some(small(10)));
    }

    #[test]
    fn bits_and_parity() {
        assert_eq!(small(0).bit_len(), 0);
        assert_eq!(small(0x80).bit_len(), 8);
        assert!(small(9).is_odd());
        assert!(!small(9).half().is_odd());
        assert!(small(1).is_one());
        assert!(small(0).is_zero());
    }

    #[test]
    fn inverse_modulo_even_and_odd() {
        // 3·7 = 21 ≡ 1 (mod 10)
        assert_eq!(small(3).inv_mod(&small(10)), Some(small(7)));
        // 65537 ≡ 2 (mod 5), 2·3 ≡ 1
        assert_eq!(small(65_537).inv_mod(&small(5)), Some(small(3)));
        assert_eq!(small(6).inv_mod(&small(9)), None);
        assert_eq!(small(3).inv_mod(&small(0)), None);
    }

    #[test]
    fn wide_product_keeps_high_half() {
        let max = Ff1024::from_be_bytes(&[0xff; 128]).unwrap();
        let square = max.mul_wide(&max);

        // (2^1024 - 1)^2 = 2^2048 - 2^1025 + 1
        let bytes = square.to_be_bytes();
        assert_eq!(bytes[0], 0xff);
        assert_eq!(bytes[127], 0xfe);
        assert!(bytes[128..255].iter().all(|&b| b == 0));
        assert_eq!(bytes[255], 1);
    }

    #[test]
    fn modular_product() {
        assert_eq!(small(7).mul_mod(&small(8), &small(11)), Some(small(1)));
        assert_eq!(small(7).mul_mod(&small(8), &small(0)), None);
    }

    #[test]
    fn debug_is_redacted() {
        let rendered = format!("{:?}", small(0xdead_beef));
        assert_eq!(rendered, "Ff { bits: 1024, .. }");
    }
}
