//! Command-line license tool.
//!
//! Usage:
//!   quill create -p pubkey.der -P privkey.der -n "Some Name" \
//!         -m name@example.com -e 2027-01-31 -f application.lic
//!   quill validate -p pubkey.der -f application.lic
//!
//! `create` issues a signed trial license; `validate` checks an existing
//! license file and exits non-zero when it is invalid.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quill_license::{License, LicenseManager};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Create and validate signed license files")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a signed trial license file
    Create {
        /// Public key file (DER X.509 SubjectPublicKeyInfo)
        #[arg(short = 'p', long = "public")]
        public: PathBuf,

        /// Private key file (DER PKCS#8)
        #[arg(short = 'P', long = "private")]
        private: PathBuf,

        /// Licensee display name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Licensee contact email
        #[arg(short = 'm', long, default_value = "")]
        email: String,

        /// Expiration date (yyyy-mm-dd)
        #[arg(short, long)]
        expiration: String,

        /// License file to write
        #[arg(short, long, default_value = "application.lic")]
        file: PathBuf,
    },
    /// Check a license file against a public key
    Validate {
        /// Public key file (DER X.509 SubjectPublicKeyInfo)
        #[arg(short = 'p', long = "public")]
        public: PathBuf,

        /// License file to check
        #[arg(short, long, default_value = "application.lic")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Create {
            public,
            private,
            name,
            email,
            expiration,
            file,
        } => {
            let expiration = NaiveDate::parse_from_str(&expiration, "%Y-%m-%d")
                .with_context(|| format!("wrong date value: {expiration}"))?;

            let mut license = License::new();
            license.set_property(License::NAME, Some(name.as_str()));
            license.set_property(License::EMAIL, Some(email.as_str()));
            license.set_property(License::LICENSE_TYPE, Some(License::TYPE_TRIAL));
            license.set_expiration(Some(expiration));

            let manager = LicenseManager::from_files(&public, Some(&private))
                .context("failed to load key pair")?;
            debug!(path = %file.display(), "writing license file");
            manager
                .write_license(&license, &file)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("license {} created", file.display());
            Ok(())
        }
        Command::Validate { public, file } => {
            let public_key = std::fs::read(&public)
                .with_context(|| format!("failed to read public key {}", public.display()))?;
            debug!(path = %file.display(), "checking license file");
            match LicenseManager::validate_first_match(&public_key, &[&file]) {
                Ok(_) => {
                    println!("license {} valid", file.display());
                    Ok(())
                }
                Err(e) => bail!("license {} invalid: {e}", file.display()),
            }
        }
    }
}
