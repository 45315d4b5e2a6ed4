//! Endpoint Unique Identifier
//!
//! `EP_UID` is the device's public identifier, computed from the IMS alone.
//! Two algorithms exist and both stay in service:
//!
//! - Legacy: what the shipped boot ROM computes. The IMS is read as
//!   little-endian 32-bit words, but only the low byte of each masked word
//!   reaches the hash.
//! - Corrected: the intended algorithm, hashing every word in full.
//!
//! ```text
//! IMS words 0..4 ^ 0x3D3D3D3D ──SHA-256──▶ y1
//! y1 || 0x01010101 x 8        ──SHA-256──▶ z0
//! SHA-256(z0)[0..8]                      ▶ EP_UID
//! ```
//!
//! The two variants never agree, so a device's identifier is only
//! meaningful together with the variant that produced it.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{ims::Ims, mode::EpUidVariant};

/// `EP_UID` size in bytes.
pub const EP_UID_SIZE: usize = 8;

/// Mask XOR-ed into each IMS word.
const WORD_MASK: u32 = 0x3D3D_3D3D;

/// Separator word appended to `y1`.
const SEPARATOR_WORD: u32 = 0x0101_0101;

/// IMS words consumed.
const IMS_WORDS: usize = 4;

/// Separator words appended.
const SEPARATOR_WORDS: usize = 8;

/// Endpoint Unique Identifier. Public, not secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpUid([u8; EP_UID_SIZE]);

impl EpUid {
    /// The identifier bytes.
    pub fn as_bytes(&self) -> &[u8; EP_UID_SIZE] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EpUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the `EP_UID` of `ims` with the given algorithm.
pub fn derive_ep_uid(ims: &Ims, variant: EpUidVariant) -> EpUid {
    let mut hasher = Sha256::new();
    for chunk in ims.as_bytes().chunks_exact(4).take(IMS_WORDS) {
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        absorb_word(&mut hasher, word ^ WORD_MASK, variant);
    }
    let y1 = hasher.finalize();

    let mut hasher = Sha256::new();
    hasher.update(y1);
    for _ in 0..SEPARATOR_WORDS {
        absorb_word(&mut hasher, SEPARATOR_WORD, variant);
    }
    let z0 = hasher.finalize();

    let digest = Sha256::digest(z0);
    let mut uid = [0u8; EP_UID_SIZE];
    uid.copy_from_slice(&digest[..EP_UID_SIZE]);

    let uid = EpUid(uid);
    tracing::trace!(?variant, ep_uid = %uid, "derived EP_UID");
    uid
}

fn absorb_word(hasher: &mut Sha256, word: u32, variant: EpUidVariant) {
    let bytes = word.to_le_bytes();
    match variant {
        EpUidVariant::Legacy => hasher.update(&bytes[..1]),
        EpUidVariant::Corrected => hasher.update(bytes),
    }
}
