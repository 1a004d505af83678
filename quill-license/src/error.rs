//! Error types for the licensing crate.

use thiserror::Error;

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Errors reported by license operations.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Key material did not parse as a valid RSA key.
    #[error("invalid key: {0}")]
    KeyInvalid(String),

    /// The license file has no `signature` property.
    #[error("no signature was found")]
    SignatureMissing,

    /// The stored signature does not match the license contents.
    #[error("license signature invalid")]
    SignatureInvalid,

    /// A trial license is past its expiration date, or the date is missing
    /// or unreadable.
    #[error("license expired")]
    Expired,

    /// A single-version license does not cover the running version.
    #[error("license version expired")]
    VersionExpired,

    /// Signing was requested but no private key was supplied at construction.
    #[error("can't sign when the private key is not available")]
    SigningUnavailable,

    /// Underlying file or stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
