//! License file reading, writing, and first-match validation.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::encoding::{signed_payload, SIGNATURE_PROPERTY};
use crate::error::{LicenseError, LicenseResult};
use crate::license::License;
use crate::props;
use crate::signing::SignatureEngine;

/// Comment line written at the top of every license file.
const FILE_HEADER: &str = "License file";

/// Creates and checks signed license files.
///
/// The manager binds the [`SignatureEngine`] to the on-disk property-file
/// format: writing encodes and signs the license's properties and merges the
/// Base64 signature into the file; reading re-derives the signed bytes from
/// the file's properties and verifies them against the stored signature.
/// An application generally needs a single manager for its lifetime.
pub struct LicenseManager {
    engine: SignatureEngine,
}

impl LicenseManager {
    /// Creates a manager from DER key material. The private key is only
    /// needed for writing license files.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyInvalid`] when the key bytes do not parse.
    pub fn new(public_key: &[u8], private_key: Option<&[u8]>) -> LicenseResult<Self> {
        Ok(Self {
            engine: SignatureEngine::new(public_key, private_key)?,
        })
    }

    /// Creates a manager from DER key files.
    pub fn from_files(public_key: &Path, private_key: Option<&Path>) -> LicenseResult<Self> {
        let public = std::fs::read(public_key)?;
        let private = match private_key {
            Some(path) => Some(std::fs::read(path)?),
            None => None,
        };
        Self::new(&public, private.as_deref())
    }

    /// Reads a license file and checks its signature.
    ///
    /// The `signature` property is pulled out of the parsed file and the
    /// remaining properties are re-encoded to re-derive the signed bytes;
    /// the license is returned only when the stored signature matches. The
    /// signature itself is never among the returned license's properties.
    ///
    /// # Errors
    ///
    /// [`LicenseError::SignatureMissing`] when the file has no `signature`
    /// property, [`LicenseError::SignatureInvalid`] when the signature does
    /// not decode or does not match, [`LicenseError::Io`] on read failures.
    pub fn read_license(&self, path: &Path) -> LicenseResult<License> {
        let file = File::open(path)?;
        let mut properties = props::load(BufReader::new(file))?;
        let signature = properties
            .remove(SIGNATURE_PROPERTY)
            .ok_or(LicenseError::SignatureMissing)?;
        let signature = BASE64
            .decode(signature.as_bytes())
            .map_err(|_| LicenseError::SignatureInvalid)?;

        let license = License::from_properties(properties);
        let payload = signed_payload(license.properties());
        if !self.engine.verify(&payload, &signature) {
            return Err(LicenseError::SignatureInvalid);
        }
        Ok(license)
    }

    /// Signs the license and writes it to `path`, overwriting any existing
    /// file.
    ///
    /// # Errors
    ///
    /// [`LicenseError::SigningUnavailable`] when the manager has no private
    /// key, [`LicenseError::Io`] on write failures.
    pub fn write_license(&self, license: &License, path: &Path) -> LicenseResult<()> {
        let payload = signed_payload(license.properties());
        let signature = self.engine.sign(&payload)?;

        let mut properties = license.properties().clone();
        properties.insert(SIGNATURE_PROPERTY.to_string(), BASE64.encode(&signature));

        let file = File::create(path)?;
        props::store(BufWriter::new(file), &properties, FILE_HEADER)?;
        Ok(())
    }

    /// Returns the first candidate file that parses, verifies, and passes
    /// validation against today's date.
    ///
    /// Nonexistent candidates are skipped. When no candidate succeeds, the
    /// last error encountered is returned.
    pub fn validate_first_match<P: AsRef<Path>>(
        public_key: &[u8],
        files: &[P],
    ) -> LicenseResult<License> {
        let manager = Self::new(public_key, None)?;
        let today = chrono::Local::now().date_naive();

        let mut last_error: Option<LicenseError> = None;
        let mut last_missing: Option<LicenseError> = None;
        for file in files {
            let path = file.as_ref();
            if !path.exists() {
                last_missing = Some(LicenseError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )));
                continue;
            }
            match manager.read_license(path) {
                Ok(license) => match license.validate(today, None) {
                    Ok(()) => return Ok(license),
                    Err(e) => last_error = Some(e),
                },
                Err(e) => last_error = Some(e),
            }
        }
        // Skipped candidates only surface when nothing else failed.
        Err(last_error.or(last_missing).unwrap_or_else(|| {
            LicenseError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no license file found",
            ))
        }))
    }
}
