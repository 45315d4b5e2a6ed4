//! Identity Management Secret and the shared Y2 term
//!
//! The IMS is the per-device root secret: 35 bytes chosen by the
//! provisioning process. Bytes `[0..32]` are the Hamming region that feeds
//! Y2; bytes `[32..35]` are the 24-bit bias field consumed by the ERRK
//! bias step.

use std::fmt;

use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{error::ImsError, hash_chain::TERM_SIZE, rng::Csprng};

/// IMS size in bytes.
pub const IMS_SIZE: usize = 35;

/// Size of the Hamming region feeding Y2.
pub const HAMMING_REGION_SIZE: usize = 32;

/// Width of the P/Q bias field in bits.
pub const BIAS_BITS: usize = 24;

/// Mask XOR-ed into every Hamming-region byte before hashing into Y2.
const Y2_MASK: u8 = 0x5A;

/// Identity Management Secret.
#[derive(Clone)]
pub struct Ims {
    bytes: [u8; IMS_SIZE],
}

impl Ims {
    /// Wrap raw IMS bytes.
    pub fn from_bytes(bytes: [u8; IMS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copy an IMS out of a slice.
    ///
    /// # Errors
    ///
    /// - `InvalidIms`: `bytes` is not exactly 35 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ImsError> {
        let Ok(bytes) = <[u8; IMS_SIZE]>::try_from(bytes) else {
            return Err(ImsError::InvalidIms {
                reason: format!("expected {IMS_SIZE} bytes, got {}", bytes.len()),
            });
        };
        Ok(Self { bytes })
    }

    /// Parse the text form: 70 hex digits, IMS\[0\] first.
    ///
    /// Case-insensitive; surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - `InvalidIms`: wrong number of digits or a non-hex character
    pub fn from_hex(text: &str) -> Result<Self, ImsError> {
        let text = text.trim();
        if text.len() != IMS_SIZE * 2 {
            return Err(ImsError::InvalidIms {
                reason: format!("expected {} hex digits, got {}", IMS_SIZE * 2, text.len()),
            });
        }

        let mut bytes = [0u8; IMS_SIZE];
        if let Err(err) = hex::decode_to_slice(text, &mut bytes) {
            bytes.zeroize();
            return Err(ImsError::InvalidIms { reason: err.to_string() });
        }
        Ok(Self { bytes })
    }

    /// Draw a fresh IMS.
    ///
    /// The Hamming region gets exactly 128 one bits and the bias field
    /// exactly 12, at positions chosen by shuffling with `rng`.
    pub fn generate(rng: &mut Csprng) -> Self {
        let mut bytes = [0u8; IMS_SIZE];

        let mut hamming: Vec<usize> = (0..HAMMING_REGION_SIZE * 8).collect();
        hamming.shuffle(rng);
        for &bit in &hamming[..HAMMING_REGION_SIZE * 4] {
            bytes[bit / 8] |= 1 << (bit % 8);
        }

        let mut bias: Vec<usize> = (0..BIAS_BITS).collect();
        bias.shuffle(rng);
        for &bit in &bias[..BIAS_BITS / 2] {
            bytes[HAMMING_REGION_SIZE + bit / 8] |= 1 << (bit % 8);
        }

        hamming.zeroize();
        bias.zeroize();
        tracing::debug!("generated balanced IMS");
        Self { bytes }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; IMS_SIZE] {
        &self.bytes
    }

    /// Lowercase hex text form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// The 24-bit P/Q bias field, `IMS[32]` least significant.
    pub fn bias(&self) -> u32 {
        u32::from(self.bytes[32])
            | (u32::from(self.bytes[33]) << 8)
            | (u32::from(self.bytes[34]) << 16)
    }
}

impl fmt::Debug for Ims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ims(..)")
    }
}

impl Drop for Ims {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Shared intermediate term, `SHA-256(IMS[0..32] ^ 0x5a)`.
#[derive(Clone)]
pub struct Y2 {
    bytes: [u8; TERM_SIZE],
}

impl Y2 {
    /// The 32-byte term.
    pub fn as_bytes(&self) -> &[u8; TERM_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for Y2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Y2(..)")
    }
}

impl Drop for Y2 {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Compute Y2 from the Hamming region of `ims`.
pub fn derive_y2(ims: &Ims) -> Y2 {
    let mut masked = [0u8; HAMMING_REGION_SIZE];
    for (out, byte) in masked.iter_mut().zip(&ims.bytes[..HAMMING_REGION_SIZE]) {
        *out = byte ^ Y2_MASK;
    }

    let y2 = Y2 { bytes: Sha256::digest(masked).into() };
    masked.zeroize();
    y2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PrngSeed;

    fn sequential_ims() -> Ims {
        let mut bytes = [0u8; IMS_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Ims::from_bytes(bytes)
    }

    #[test]
    fn y2_of_zero_ims() {
        let y2 = derive_y2(&Ims::from_bytes([0u8; IMS_SIZE]));
        assert_eq!(
            hex::encode(y2.as_bytes()),
            "60bf07c488aad18fda339df07e4fbc47b4f00be71711936f18d04d352ad01890"
        );
    }

    #[test]
    fn y2_ignores_bias_field() {
        let mut bytes = [0u8; IMS_SIZE];
        bytes[32..].copy_from_slice(&[0xFF, 0xFF, 0xFF]);
        let biased = Ims::from_bytes(bytes);
        let plain = Ims::from_bytes([0u8; IMS_SIZE]);

        assert_eq!(derive_y2(&biased).as_bytes(), derive_y2(&plain).as_bytes());
    }

    #[test]
    fn hex_round_trip_is_first_byte_first() {
        let ims = sequential_ims();
        let text = ims.to_hex();
        assert!(text.starts_with("000102"));

        let parsed = Ims::from_hex(&text).unwrap();
        assert_eq!(parsed.as_bytes(), ims.as_bytes());
    }

    #[test]
    fn hex_accepts_uppercase_and_whitespace() {
        let text = format!("  {}\n", sequential_ims().to_hex().to_uppercase());
        let parsed = Ims::from_hex(&text).unwrap();
        assert_eq!(parsed.as_bytes(), sequential_ims().as_bytes());
    }

    #[test]
    fn hex_rejects_wrong_length() {
        let result = Ims::from_hex("00ff");
        assert!(matches!(result, Err(ImsError::InvalidIms { .. })));
    }

    #[test]
    fn hex_rejects_non_hex() {
        let text = "zz".repeat(IMS_SIZE);
        assert!(matches!(Ims::from_hex(&text), Err(ImsError::InvalidIms { .. })));
    }

    #[test]
    fn from_slice_requires_exact_size() {
        assert!(Ims::from_slice(&[0u8; 34]).is_err());
        assert!(Ims::from_slice(&[0u8; 36]).is_err());
        assert!(Ims::from_slice(&[0u8; 35]).is_ok());
    }

    #[test]
    fn bias_is_little_endian() {
        let mut bytes = [0u8; IMS_SIZE];
        bytes[32..].copy_from_slice(&[0x01, 0x02, 0x03]);
        assert_eq!(Ims::from_bytes(bytes).bias(), 0x03_0201);
    }

    #[test]
    fn generated_ims_is_balanced() {
        let seed = PrngSeed::from_material(b"balanced").unwrap();
        let mut rng = Csprng::init(&seed);

        for _ in 0..8 {
            let ims = Ims::generate(&mut rng);
            let hamming: u32 =
                ims.as_bytes()[..HAMMING_REGION_SIZE].iter().map(|b| b.count_ones()).sum();
            assert_eq!(hamming, 128);
            assert_eq!(ims.bias().count_ones(), 12);
            assert!(ims.bias() < 1 << 24);
        }

        rng.deinit();
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let seed = PrngSeed::from_material(b"repeatable").unwrap();
        let a = Ims::generate(&mut Csprng::init(&seed));
        let b = Ims::generate(&mut Csprng::init(&seed));
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn debug_is_redacted() {
        assert_eq!(format!("{:?}", sequential_ims()), "Ims(..)");
    }
}
