mod common;

use std::fs;

use common::{signing_manager, test_keys};
use pretty_assertions::assert_eq;
use quill_license::{License, LicenseError, LicenseManager};
use tempfile::tempdir;

fn sample_license() -> License {
    let mut license = License::new();
    license.set_property(License::ID, Some("42"));
    license.set_property(License::NAME, Some("A test name"));
    license.set_property(License::EMAIL, Some("test@example.com"));
    license.set_property(License::LICENSE_TYPE, Some(License::TYPE_LIFETIME));
    license
}

#[test]
fn write_read_roundtrip_preserves_properties() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.lic");
    let manager = signing_manager();

    let license = sample_license();
    manager.write_license(&license, &path).expect("write");
    let reread = manager.read_license(&path).expect("read");

    assert_eq!(reread.properties(), license.properties());
}

#[test]
fn empty_license_roundtrips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.lic");
    let manager = signing_manager();

    manager.write_license(&License::new(), &path).expect("write");
    let reread = manager.read_license(&path).expect("read");
    assert!(reread.properties().is_empty());
}

#[test]
fn unknown_properties_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("extra.lic");
    let manager = signing_manager();

    let mut license = sample_license();
    license.set_property("customerRef", Some("ACME-0042"));
    manager.write_license(&license, &path).expect("write");

    let reread = manager.read_license(&path).expect("read");
    assert_eq!(reread.property("customerRef"), Some("ACME-0042"));
}

#[test]
fn unicode_properties_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unicode.lic");
    let manager = signing_manager();

    let mut license = sample_license();
    license.set_property(License::NAME, Some("Jørgen Évariste 😀"));
    manager.write_license(&license, &path).expect("write");

    let reread = manager.read_license(&path).expect("read");
    assert_eq!(reread.property(License::NAME), Some("Jørgen Évariste 😀"));
}

#[test]
fn signature_is_not_exposed_as_a_property() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hidden.lic");
    let manager = signing_manager();

    manager.write_license(&sample_license(), &path).expect("write");
    let reread = manager.read_license(&path).expect("read");
    assert_eq!(reread.property("signature"), None);
}

#[test]
fn write_overwrites_an_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("overwrite.lic");
    let manager = signing_manager();

    manager.write_license(&sample_license(), &path).expect("first write");

    let mut updated = sample_license();
    updated.set_property(License::NAME, Some("Another name"));
    manager.write_license(&updated, &path).expect("second write");

    let reread = manager.read_license(&path).expect("read");
    assert_eq!(reread.property(License::NAME), Some("Another name"));
}

#[test]
fn tampered_property_value_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tampered.lic");
    let manager = signing_manager();

    manager.write_license(&sample_license(), &path).expect("write");

    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("A test name", "B test name")).unwrap();

    let err = manager.read_license(&path).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn tampered_signature_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("badsig.lic");
    let manager = signing_manager();

    manager.write_license(&sample_license(), &path).expect("write");

    let text = fs::read_to_string(&path).unwrap();
    let flipped: String = text
        .lines()
        .map(|line| {
            if let Some(encoded) = line.strip_prefix("signature=") {
                let replacement = if encoded.starts_with('B') { 'C' } else { 'B' };
                format!("signature={replacement}{}\n", &encoded[1..])
            } else {
                format!("{line}\n")
            }
        })
        .collect();
    fs::write(&path, flipped).unwrap();

    let err = manager.read_license(&path).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn undecodable_signature_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notb64.lic");
    fs::write(&path, "name=test\nsignature=@@not base64@@\n").unwrap();

    let err = signing_manager().read_license(&path).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn missing_signature_is_a_distinct_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unsigned.lic");
    fs::write(&path, "# License file\nname=A test name\n").unwrap();

    let err = signing_manager().read_license(&path).unwrap_err();
    assert!(matches!(err, LicenseError::SignatureMissing));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = signing_manager()
        .read_license(&dir.path().join("nowhere.lic"))
        .unwrap_err();
    assert!(matches!(err, LicenseError::Io(_)));
}

#[test]
fn wrong_public_key_rejects_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wrongkey.lic");
    signing_manager()
        .write_license(&sample_license(), &path)
        .expect("write");

    // A key pair derived from a different seed.
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rsa::pkcs8::EncodePublicKey;
    let mut rng = StdRng::seed_from_u64(0x0bad_c0de);
    let other = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let other_public = other.to_public_key().to_public_key_der().unwrap().into_vec();

    let err = LicenseManager::new(&other_public, None)
        .unwrap()
        .read_license(&path)
        .unwrap_err();
    assert!(matches!(err, LicenseError::SignatureInvalid));
}

#[test]
fn first_match_skips_missing_candidates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.lic");
    signing_manager()
        .write_license(&sample_license(), &good)
        .expect("write");

    let (public, _) = test_keys();
    let missing = dir.path().join("missing.lic");
    let license =
        LicenseManager::validate_first_match(public, &[missing, good]).expect("first match");
    assert_eq!(license.property(License::NAME), Some("A test name"));
}

#[test]
fn first_match_returns_the_first_valid_candidate() {
    let dir = tempdir().unwrap();
    let manager = signing_manager();

    let expired = dir.path().join("expired.lic");
    let mut trial = License::new();
    trial.set_property(License::LICENSE_TYPE, Some(License::TYPE_TRIAL));
    trial.set_property(License::EXPIRATION, Some("2000-01-01"));
    manager.write_license(&trial, &expired).expect("write expired");

    let good = dir.path().join("good.lic");
    manager.write_license(&sample_license(), &good).expect("write good");

    let (public, _) = test_keys();
    let license =
        LicenseManager::validate_first_match(public, &[expired, good]).expect("first match");
    assert_eq!(license.property(License::LICENSE_TYPE), Some("lifetime"));
}

#[test]
fn first_match_surfaces_the_last_error() {
    let dir = tempdir().unwrap();
    let manager = signing_manager();

    let expired = dir.path().join("expired.lic");
    let mut trial = License::new();
    trial.set_property(License::LICENSE_TYPE, Some(License::TYPE_TRIAL));
    trial.set_property(License::EXPIRATION, Some("2000-01-01"));
    manager.write_license(&trial, &expired).expect("write expired");

    let (public, _) = test_keys();
    let err = LicenseManager::validate_first_match(public, &[expired]).unwrap_err();
    assert!(matches!(err, LicenseError::Expired));
}

#[test]
fn first_match_with_all_candidates_missing_is_an_io_error() {
    let dir = tempdir().unwrap();
    let (public, _) = test_keys();
    let err = LicenseManager::validate_first_match(
        public,
        &[dir.path().join("a.lic"), dir.path().join("b.lic")],
    )
    .unwrap_err();
    assert!(matches!(err, LicenseError::Io(_)));
}

#[test]
fn manager_from_key_files() {
    let dir = tempdir().unwrap();
    let (public, private) = test_keys();
    let public_path = dir.path().join("pubkey.der");
    let private_path = dir.path().join("privkey.der");
    fs::write(&public_path, public).unwrap();
    fs::write(&private_path, private).unwrap();

    let manager =
        LicenseManager::from_files(&public_path, Some(&private_path)).expect("load keys");
    let path = dir.path().join("fromfiles.lic");
    manager.write_license(&sample_license(), &path).expect("write");
    assert!(manager.read_license(&path).is_ok());
}

#[test]
fn trial_license_validates_through_first_match() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trial.lic");
    let manager = signing_manager();

    let mut trial = License::new();
    trial.set_property(License::NAME, Some("A test name"));
    trial.set_property(License::LICENSE_TYPE, Some(License::TYPE_TRIAL));
    trial.set_property(License::EXPIRATION, Some("2999-12-31"));
    manager.write_license(&trial, &path).expect("write");

    let (public, _) = test_keys();
    let license = LicenseManager::validate_first_match(public, &[path]).expect("validate");
    assert_eq!(license.property(License::NAME), Some("A test name"));
}
