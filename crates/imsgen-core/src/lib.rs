//! IMS Key-Derivation Engine
//!
//! Turns one 35-byte per-device root secret (the Identity Management
//! Secret) into the key material a secure-boot endpoint is provisioned
//! with. Pure functions with deterministic outputs: the same IMS and
//! options always produce the same keys.
//!
//! # Key Hierarchy
//!
//! Every key family hangs off a single intermediate term, Y2, through
//! domain-separated hash chain steps. Only the endpoint identifier reads
//! the IMS directly.
//!
//! ```text
//! IMS[0..16] ──────────────────────────────────▶ EP_UID (8 bytes)
//!
//! IMS[0..32] ^ 0x5a ──SHA-256──▶ Y2
//!                                 │
//!        ┌────────────────────────┼────────────────────────┐
//!        ▼                        ▼                        ▼
//!   chain(0x01) → Z1         chain(0x02) → Z2         chain(0x03) → Z3
//!        │                        │                        │
//!        ▼                        ▼                        ▼
//!   EPSK / EPVK              ESSK / ESVK              P, Q candidates
//!   (Ed448)                  (Curve25519)                  │
//!                                              + IMS[32..35] bias
//!                                                          │
//!                                                          ▼
//!                                          P, Q, N, dp, dq, c (RSA)
//! ```
//!
//! EPVK and ESVK are exported uncompressed, `0x04 ‖ x ‖ y` with big-endian
//! coordinates. The RSA key pair keeps the finalized (biased) P and Q next
//! to `N`, `dp`, `dq` and `c`.
//!
//! The legacy sample set took ESSK from `chain(Y2, 0x01)` directly, kept
//! 32-byte big-endian primes, and computed `EP_UID` from only the low byte
//! of each IMS word. Those behaviours are selectable through
//! [`DeriveOptions`] and never the default.
//!
//! # Security
//!
//! Secret hygiene:
//! - IMS, Y2, every secret key buffer and big-integer limb is zeroized on drop
//! - `Debug` output never includes secret bytes
//! - Logs carry lengths, modes and public keys only
//!
//! Correctness:
//! - Every generated public key is decoded and checked for prime-order
//!   subgroup membership before it is returned
//! - RSA inputs are checked loudly; nothing is silently repaired

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod affine;
pub mod derivation;
pub mod ep_uid;
pub mod errk;
pub mod error;
pub mod ff;
pub mod hash_chain;
pub mod ims;
pub mod mode;
pub mod octet;
pub mod primary;
pub mod rng;
pub mod rsa;
pub mod secondary;

pub use derivation::{Derivation, KeySet};
pub use ep_uid::{EpUid, derive_ep_uid};
pub use errk::{PrimeCandidates, bias_prime_candidates, derive_prime_candidates};
pub use error::{ImsError, VerificationKey};
pub use ff::{Ff, Ff1024, Ff2048};
pub use ims::{IMS_SIZE, Ims, Y2, derive_y2};
pub use mode::{CompatibilityMode, DeriveOptions, EpUidVariant, PqArithmetic};
pub use octet::Octet;
pub use primary::{PrimaryKeyPair, derive_primary, validate_epvk};
pub use rng::{Csprng, PrngSeed};
pub use rsa::{RsaKeyPair, rsa_secret};
pub use secondary::{SecondaryKeyPair, derive_secondary, validate_esvk};
