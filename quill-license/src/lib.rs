//! Signed software license files.
//!
//! A license is a small set of named string properties (owner identity,
//! license type, expiration date, allowed version) bound together by an RSA
//! signature computed over a canonical byte encoding of those properties:
//!
//! - [`License`] — the property bag and its type-dependent validation rules
//! - [`signed_payload`] — the canonical byte layout that gets signed
//! - [`SignatureEngine`] — RSA (SHA1withRSA) sign and verify
//! - [`LicenseManager`] — reading and writing license files
//!
//! License files are plain `key=value` property files with one reserved
//! key, `signature`, holding the Base64-encoded signature over the other
//! properties. The payload layout and signature scheme are wire contract:
//! a file written by any conforming implementation verifies under any
//! other.
//!
//! The library never reads the system clock or version on its own;
//! validation takes both from the caller. The one exception is
//! [`LicenseManager::validate_first_match`], which checks candidate files
//! against today's date.

mod encoding;
mod error;
mod license;
mod manager;
mod props;
mod signing;

pub use encoding::{signed_payload, SIGNATURE_PROPERTY};
pub use error::{LicenseError, LicenseResult};
pub use license::License;
pub use manager::LicenseManager;
pub use signing::SignatureEngine;
