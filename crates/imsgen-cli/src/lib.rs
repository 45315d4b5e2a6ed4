//! Provisioning front end for the IMS key-derivation engine.
//!
//! Wires the engine to the outside world: where the PRNG seed comes from,
//! where the IMS comes from, and how derived keys are reported. The binary
//! in `main.rs` only parses arguments and prints.
//!
//! ```text
//! SeedSource ──▶ PrngSeed ──▶ Csprng ─┐
//!                                     ├──▶ ImsSource::load ──▶ Ims
//!                                     │
//! Ims + DeriveOptions ──▶ Derivation::derive_all ──▶ KeySet ──▶ report
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod ims_source;
pub mod report;
pub mod seed;

pub use error::CliError;
use imsgen_core::{Csprng, Derivation, DeriveOptions, Ims, KeySet};
pub use ims_source::ImsSource;
pub use seed::SeedSource;

/// Resolve the seed, load the IMS and derive the full key set.
///
/// The CSPRNG lives only as long as IMS loading and is wiped before any
/// key is derived. An incomplete RSA stage is not an error here; it is
/// carried in the returned [`KeySet`].
pub fn run(
    seed: &SeedSource,
    source: &ImsSource,
    options: DeriveOptions,
) -> Result<(Ims, KeySet), CliError> {
    let mut rng = Csprng::init(&seed.resolve()?);
    let loaded = source.load(&mut rng);
    rng.deinit();
    let ims = loaded?;

    let keys = Derivation::new(&ims, options)?.derive_all()?;
    tracing::info!(ep_uid = %keys.ep_uid(), mode = ?options.mode, "derived key set");

    Ok((ims, keys))
}
