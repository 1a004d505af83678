//! Shared test helpers for license tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::RsaPrivateKey;

use quill_license::{LicenseManager, SignatureEngine};

/// Returns DER key material (SubjectPublicKeyInfo, PKCS#8) generated once
/// per test binary from a fixed seed.
pub fn test_keys() -> &'static (Vec<u8>, Vec<u8>) {
    static KEYS: OnceLock<(Vec<u8>, Vec<u8>)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(0x5163_1155_ab1e_71e5);
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key");
        let public_der = private
            .to_public_key()
            .to_public_key_der()
            .expect("encode public key")
            .into_vec();
        let private_der = private
            .to_pkcs8_der()
            .expect("encode private key")
            .as_bytes()
            .to_vec();
        (public_der, private_der)
    })
}

/// An engine holding both halves of the test key pair.
pub fn signing_engine() -> SignatureEngine {
    let (public, private) = test_keys();
    SignatureEngine::new(public, Some(private)).expect("create engine")
}

/// An engine holding only the public half of the test key pair.
pub fn verifying_engine() -> SignatureEngine {
    let (public, _) = test_keys();
    SignatureEngine::new(public, None).expect("create engine")
}

/// A manager able to both write and read license files.
pub fn signing_manager() -> LicenseManager {
    let (public, private) = test_keys();
    LicenseManager::new(public, Some(private)).expect("create manager")
}
