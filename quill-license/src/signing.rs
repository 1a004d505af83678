//! RSA signing and verification of license payloads.
//!
//! Licenses are signed with RSA over a SHA-1 digest using PKCS#1 v1.5
//! padding ("SHA1withRSA"). The scheme is part of the license-file wire
//! contract: files issued by one release must verify under every other,
//! so the digest and padding are fixed rather than upgraded.

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;

use crate::error::{LicenseError, LicenseResult};

/// Wraps the RSA key pair used to sign and verify license payloads.
///
/// The public key is mandatory; the private key is present only on the
/// issuing side. Keys are parsed once at construction and never change, so
/// sharing one engine across read-only operations is safe.
#[derive(Debug)]
pub struct SignatureEngine {
    verifying_key: VerifyingKey<Sha1>,
    signing_key: Option<SigningKey<Sha1>>,
}

impl SignatureEngine {
    /// Creates an engine from DER key material.
    ///
    /// `public_key` is an X.509 SubjectPublicKeyInfo blob. `private_key` is
    /// a PKCS#8 blob, or `None` when only verification is needed.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyInvalid`] when either blob does not parse
    /// as an RSA key.
    pub fn new(public_key: &[u8], private_key: Option<&[u8]>) -> LicenseResult<Self> {
        let public = RsaPublicKey::from_public_key_der(public_key)
            .map_err(|e| LicenseError::KeyInvalid(e.to_string()))?;
        let signing_key = match private_key {
            Some(der) => {
                let private = RsaPrivateKey::from_pkcs8_der(der)
                    .map_err(|e| LicenseError::KeyInvalid(e.to_string()))?;
                Some(SigningKey::new(private))
            }
            None => None,
        };
        Ok(Self {
            verifying_key: VerifyingKey::new(public),
            signing_key,
        })
    }

    /// Signs the data with the private key and returns the signature bytes.
    ///
    /// PKCS#1 v1.5 signing is deterministic: the same key and data always
    /// produce the same signature.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::SigningUnavailable`] when the engine was
    /// built without a private key.
    pub fn sign(&self, data: &[u8]) -> LicenseResult<Vec<u8>> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or(LicenseError::SigningUnavailable)?;
        let signature = key
            .try_sign(data)
            .map_err(|e| LicenseError::KeyInvalid(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// Checks the signature against the data with the public key.
    ///
    /// Returns `false` on mismatch; a mismatch is not an error. Signature
    /// bytes that cannot even be interpreted also report `false`.
    #[must_use]
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        self.verifying_key.verify(data, &signature).is_ok()
    }
}
