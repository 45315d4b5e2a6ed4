//! IMS key-derivation binary.
//!
//! # Usage
//!
//! ```bash
//! # Derive keys for a known IMS
//! imsgen --ims 000102...22
//!
//! # Third IMS of a provisioning file, legacy sample-set compatible
//! imsgen --ims-file ims.txt --ims-index 2 --compatibility legacy
//!
//! # Generate a fresh IMS from a seed file
//! imsgen --generate --seed-file /secure/seed.bin
//! ```
//!
//! The report goes to stdout and contains secret keys. Logs go to stderr.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{ArgGroup, Parser, ValueEnum};
use imsgen_cli::{CliError, ImsSource, SeedSource, report};
use imsgen_core::{
    CompatibilityMode, DeriveOptions, EpUidVariant, PqArithmetic, mode::DEFAULT_ODD_MODULUS,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// IMS key derivation for secure-boot endpoint provisioning
#[derive(Parser, Debug)]
#[command(name = "imsgen")]
#[command(about = "Derive endpoint key material from an Identity Management Secret")]
#[command(version)]
#[command(group(
    ArgGroup::new("ims_input").required(true).args(["ims", "ims_file", "generate"])
))]
#[command(group(ArgGroup::new("seed_source").args(["seed_file", "seed", "os_entropy"])))]
#[allow(clippy::struct_excessive_bools, reason = "Mutually exclusive CLI flags")]
struct Args {
    /// IMS as 70 hex digits
    #[arg(long)]
    ims: Option<String>,

    /// File with one hex IMS per line
    #[arg(long)]
    ims_file: Option<PathBuf>,

    /// Zero-based entry to use from --ims-file
    #[arg(long, default_value = "0", requires = "ims_file")]
    ims_index: usize,

    /// Generate a fresh IMS from the seeded PRNG
    #[arg(long)]
    generate: bool,

    /// Seed the PRNG from the first 128 bytes of a file
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// Seed the PRNG from a passphrase
    #[arg(long)]
    seed: Option<String>,

    /// Seed the PRNG from OS entropy (default)
    #[arg(long)]
    os_entropy: bool,

    /// Algorithm family for ESSK and ERRK
    #[arg(long, value_enum, default_value = "production")]
    compatibility: Mode,

    /// Hash every IMS word into `EP_UID` instead of only the low byte
    #[arg(long)]
    corrected_ep_uid: bool,

    /// Use `(P - 1) >> 1` when inverting the public exponent (legacy only)
    #[arg(long)]
    legacy_factorability: bool,

    /// Odd modulus for prime candidate biasing (power of two, 2..=128)
    #[arg(long, default_value_t = DEFAULT_ODD_MODULUS)]
    odd_modulus: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Legacy,
    Production,
}

impl Args {
    fn seed_source(&self) -> SeedSource {
        if let Some(path) = &self.seed_file {
            SeedSource::File(path.clone())
        } else if let Some(passphrase) = &self.seed {
            SeedSource::Passphrase(passphrase.clone())
        } else {
            SeedSource::OsEntropy
        }
    }

    fn ims_source(&self) -> ImsSource {
        if let Some(hex) = &self.ims {
            ImsSource::Hex(hex.clone())
        } else if let Some(path) = &self.ims_file {
            ImsSource::File { path: path.clone(), index: self.ims_index }
        } else {
            ImsSource::Generate
        }
    }

    fn options(&self) -> DeriveOptions {
        let mode = match self.compatibility {
            Mode::Legacy => CompatibilityMode::Legacy,
            Mode::Production => CompatibilityMode::Production,
        };
        let ep_uid_variant =
            if self.corrected_ep_uid { EpUidVariant::Corrected } else { EpUidVariant::Legacy };
        let pq_arithmetic = if self.legacy_factorability {
            PqArithmetic::DecrementThenHalve
        } else {
            PqArithmetic::Halve
        };

        DeriveOptions {
            mode,
            ep_uid_variant,
            pq_arithmetic,
            odd_modulus: self.odd_modulus,
            ..DeriveOptions::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let options = args.options();
    tracing::info!(mode = ?options.mode, ep_uid = ?options.ep_uid_variant, "imsgen starting");

    let (ims, keys) = imsgen_cli::run(&args.seed_source(), &args.ims_source(), options)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(report::render(&ims, &keys).as_bytes())?;
    stdout.flush()?;

    if let Err(err) = keys.rsa() {
        tracing::error!(error = %err, "RSA stage incomplete");
        return Err(CliError::RsaIncomplete(err.clone()).into());
    }

    Ok(())
}
