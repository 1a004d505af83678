//! Canonical byte encoding of license properties.
//!
//! The signed payload is derived from the property map as follows: every
//! property except `signature` is taken, keys are sorted ascending by their
//! byte-wise string order, and for each key the key's UTF-16 code units are
//! appended big-endian, followed by the value's, with no length prefixes and
//! no separators. License files are verified by other implementations of
//! this scheme, so the exact byte layout is a wire contract: a different
//! character width, sort order, or any added framing breaks every signature
//! already issued.

use std::collections::BTreeMap;

/// Reserved property key holding the Base64 signature in license files.
/// Never part of the signed payload.
pub const SIGNATURE_PROPERTY: &str = "signature";

/// Encodes the properties into the byte sequence that gets signed.
///
/// Pure and deterministic: the same map yields bit-identical output no
/// matter the order the properties were inserted in.
#[must_use]
pub fn signed_payload(properties: &BTreeMap<String, String>) -> Vec<u8> {
    let mut buf = Vec::new();
    for (key, value) in properties {
        if key == SIGNATURE_PROPERTY {
            continue;
        }
        append_utf16_be(&mut buf, key);
        append_utf16_be(&mut buf, value);
    }
    buf
}

/// Appends the string's UTF-16 code units in big-endian byte order.
/// Characters outside the BMP become surrogate pairs.
fn append_utf16_be(buf: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16() {
        buf.extend_from_slice(&unit.to_be_bytes());
    }
}
