//! Plain-text provisioning report.
//!
//! One `name: value` line per derived artifact, hex encoded, in hierarchy
//! order:
//!
//! ```text
//! ims          ep_uid
//! epsk         epvk
//! essk         esvk
//! errk_p       errk_q                                  (raw candidates)
//! errk_p_final errk_q_final erpk_mod erpk_e errk_dp errk_dq errk_c
//!                                                      (or rsa_error)
//! ```
//!
//! `epvk`/`esvk` are uncompressed points. The final primes, `dp`, `dq` and
//! `c` are 128-byte big-endian; `erpk_mod` is 256 bytes.

use imsgen_core::{Ims, KeySet};

/// Render every derived value for `ims`.
///
/// Secret keys are included. The caller decides where the report goes.
pub fn render(ims: &Ims, keys: &KeySet) -> String {
    let mut fields = vec![
        ("ims", ims.to_hex()),
        ("ep_uid", keys.ep_uid().to_hex()),
        ("epsk", hex::encode(keys.primary().epsk())),
        ("epvk", hex::encode(keys.primary().epvk())),
        ("essk", hex::encode(keys.secondary().essk())),
        ("esvk", hex::encode(keys.secondary().esvk())),
        ("errk_p", hex::encode(keys.prime_candidates().p())),
        ("errk_q", hex::encode(keys.prime_candidates().q())),
    ];

    match keys.rsa() {
        Ok(rsa) => fields.extend([
            ("errk_p_final", hex::encode(rsa.p().to_be_bytes())),
            ("errk_q_final", hex::encode(rsa.q().to_be_bytes())),
            ("erpk_mod", hex::encode(rsa.modulus().to_be_bytes())),
            ("erpk_e", rsa.public_exponent().to_string()),
            ("errk_dp", hex::encode(rsa.dp().to_be_bytes())),
            ("errk_dq", hex::encode(rsa.dq().to_be_bytes())),
            ("errk_c", hex::encode(rsa.c().to_be_bytes())),
        ]),
        Err(err) => fields.push(("rsa_error", err.to_string())),
    }

    fields.iter().map(|(name, value)| format!("{name}: {value}\n")).collect()
}

#[cfg(test)]
mod tests {
    use imsgen_core::{Derivation, DeriveOptions, IMS_SIZE};

    use super::*;

    fn names(report: &str) -> Vec<&str> {
        report.lines().filter_map(|line| line.split_once(": ")).map(|(name, _)| name).collect()
    }

    #[test]
    fn legacy_zero_ims_reports_rsa_failure() {
        let ims = Ims::from_bytes([0u8; IMS_SIZE]);
        let keys = Derivation::new(&ims, DeriveOptions::legacy()).unwrap().derive_all().unwrap();
        let report = render(&ims, &keys);

        assert_eq!(names(&report), vec![
            "ims", "ep_uid", "epsk", "epvk", "essk", "esvk", "errk_p", "errk_q", "rsa_error"
        ]);
        assert!(report.starts_with(&format!("ims: {}\nep_uid: ", "00".repeat(IMS_SIZE))));
        let expected = "rsa_error: RSA precondition violated: Q has no inverse modulo P\n";
        assert!(report.ends_with(expected));
    }

    #[test]
    fn production_report_carries_the_full_rsa_key() {
        // IMS[i] = 37·i completes the production RSA stage
        let mut bytes = [0u8; IMS_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37);
        }
        let ims = Ims::from_bytes(bytes);
        let keys = Derivation::new(&ims, DeriveOptions::default()).unwrap().derive_all().unwrap();
        let rsa = keys.rsa().unwrap();
        let report = render(&ims, &keys);

        assert_eq!(names(&report).split_off(8), vec![
            "errk_p_final",
            "errk_q_final",
            "erpk_mod",
            "erpk_e",
            "errk_dp",
            "errk_dq",
            "errk_c"
        ]);

        let expected = [
            format!("epvk: {}", hex::encode(keys.primary().epvk())),
            format!("esvk: {}", hex::encode(keys.secondary().esvk())),
            format!("errk_p_final: {}", hex::encode(rsa.p().to_be_bytes())),
            format!("errk_q_final: {}", hex::encode(rsa.q().to_be_bytes())),
            format!("erpk_mod: {}", hex::encode(rsa.modulus().to_be_bytes())),
            "erpk_e: 65537".to_string(),
        ];
        for line in expected {
            assert!(report.lines().any(|reported| reported == line), "missing {line}");
        }
    }
}
