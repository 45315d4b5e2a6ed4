//! Fuzz target for public key validation
//!
//! Arbitrary 113-byte and 65-byte encodings go through the EPVK and ESVK
//! validators, which must classify them without panicking. The tag byte is
//! forced to `0x04` half the time so the curve equation check is reached.
//!
//! # Invariants
//!
//! - Never panics
//! - Rejections are always `KeyValidation` errors naming the right key

#![no_main]

use imsgen_core::{
    ImsError, VerificationKey, primary::EPVK_SIZE, secondary::ESVK_SIZE, validate_epvk,
    validate_esvk,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: ([u8; EPVK_SIZE], [u8; ESVK_SIZE], bool)| {
    let (mut epvk, mut esvk, tagged) = input;
    if tagged {
        epvk[0] = 0x04;
        esvk[0] = 0x04;
    }

    if let Err(err) = validate_epvk(&epvk) {
        assert!(matches!(err, ImsError::KeyValidation { key: VerificationKey::Epvk, .. }));
    }
    if let Err(err) = validate_esvk(&esvk) {
        assert!(matches!(err, ImsError::KeyValidation { key: VerificationKey::Esvk, .. }));
    }
});
