//! Signing and verification of raw command bytes.
//!
//! Signatures travel as two big-endian scalar encodings (`r`, `s`) rather
//! than a DER blob, matching the wire envelope. Verification fails closed:
//! every decode or mismatch path collapses to `false` so a listener never
//! leaks why a signature was rejected.

use p224::ecdsa::signature::{RandomizedSigner, Verifier};
use p224::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p224::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p224::FieldBytes;
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// P-224 field element width in bytes.
const FIELD_SIZE: usize = 28;

/// Which signature scheme a verifier should apply.
///
/// Tagged explicitly so additional schemes can be added without touching
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// ECDSA over NIST P-224, message hashed with SHA-224.
    #[default]
    EcdsaP224,
}

/// The two scalar components of an ECDSA signature, big-endian with leading
/// zero bytes stripped (the transportable form carried in an envelope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

/// Sign a message with a PKCS#8 DER private key.
///
/// Signing is randomized — repeated calls over the same input produce
/// different, equally valid `(r, s)` pairs.
pub fn sign(message: &[u8], private_key_der: &[u8]) -> Result<SignatureParts, CryptoError> {
    let signing_key = SigningKey::from_pkcs8_der(private_key_der)
        .map_err(|e| CryptoError::InvalidKey(format!("not a PKCS#8 EC private key: {e}")))?;

    let signature: EcdsaSignature = signing_key.sign_with_rng(&mut OsRng, message);
    let (r, s) = signature.split_bytes();

    Ok(SignatureParts {
        r: strip_leading_zeros(&r),
        s: strip_leading_zeros(&s),
    })
}

/// Verify a signature against a message and an SPKI DER public key.
///
/// Returns `false` for malformed keys, wrong key types, out-of-range
/// scalars, and cryptographically invalid signatures alike. Never panics.
pub fn verify(
    message: &[u8],
    public_key_der: &[u8],
    parts: &SignatureParts,
    algorithm: SignatureAlgorithm,
) -> bool {
    match algorithm {
        SignatureAlgorithm::EcdsaP224 => verify_p224(message, public_key_der, parts),
    }
}

fn verify_p224(message: &[u8], public_key_der: &[u8], parts: &SignatureParts) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_public_key_der(public_key_der) else {
        return false;
    };
    let (Some(r), Some(s)) = (to_field_bytes(&parts.r), to_field_bytes(&parts.s)) else {
        return false;
    };
    let Ok(signature) = EcdsaSignature::from_scalars(r, s) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Left-pad a big-endian scalar encoding to the field width.
///
/// `None` if the value cannot fit in a field element.
fn to_field_bytes(raw: &[u8]) -> Option<FieldBytes> {
    let raw = match raw.iter().position(|&b| b != 0) {
        Some(first) => &raw[first..],
        None => &[],
    };
    if raw.is_empty() || raw.len() > FIELD_SIZE {
        return None;
    }
    let mut bytes = FieldBytes::default();
    bytes[FIELD_SIZE - raw.len()..].copy_from_slice(raw);
    Some(bytes)
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => bytes[first..].to_vec(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::KeyPair;

    #[test]
    fn sign_verify_round_trip() {
        let pair = KeyPair::generate().unwrap();
        let message = b"whoami";

        let parts = sign(message, pair.private_key_der()).unwrap();
        assert!(verify(
            message,
            pair.public_key_der(),
            &parts,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn signing_is_randomized() {
        let pair = KeyPair::generate().unwrap();
        let message = b"uptime";

        let first = sign(message, pair.private_key_der()).unwrap();
        let second = sign(message, pair.private_key_der()).unwrap();
        assert_ne!(first, second);
        assert!(verify(
            message,
            pair.public_key_der(),
            &first,
            SignatureAlgorithm::EcdsaP224
        ));
        assert!(verify(
            message,
            pair.public_key_der(),
            &second,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn tampered_message_fails() {
        let pair = KeyPair::generate().unwrap();
        let parts = sign(b"ls -la", pair.private_key_der()).unwrap();
        assert!(!verify(
            b"ls -lA",
            pair.public_key_der(),
            &parts,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn flipped_signature_bits_fail() {
        let pair = KeyPair::generate().unwrap();
        let message = b"hostname";
        let parts = sign(message, pair.private_key_der()).unwrap();

        let mut bad_r = parts.clone();
        bad_r.r[0] ^= 0x01;
        assert!(!verify(
            message,
            pair.public_key_der(),
            &bad_r,
            SignatureAlgorithm::EcdsaP224
        ));

        let mut bad_s = parts.clone();
        let last = bad_s.s.len() - 1;
        bad_s.s[last] ^= 0x80;
        assert!(!verify(
            message,
            pair.public_key_der(),
            &bad_s,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn unrelated_key_fails() {
        let signer = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let message = b"cat /etc/passwd";

        let parts = sign(message, signer.private_key_der()).unwrap();
        assert!(!verify(
            message,
            other.public_key_der(),
            &parts,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn malformed_public_key_is_false_not_panic() {
        let pair = KeyPair::generate().unwrap();
        let parts = sign(b"id", pair.private_key_der()).unwrap();

        assert!(!verify(
            b"id",
            b"definitely not DER",
            &parts,
            SignatureAlgorithm::EcdsaP224
        ));
        // A private key document is the wrong type for verification.
        assert!(!verify(
            b"id",
            pair.private_key_der(),
            &parts,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn malformed_private_key_errors() {
        assert!(sign(b"id", b"garbage").is_err());
    }

    #[test]
    fn empty_or_oversized_scalars_fail_closed() {
        let pair = KeyPair::generate().unwrap();
        let empty = SignatureParts {
            r: Vec::new(),
            s: Vec::new(),
        };
        assert!(!verify(
            b"id",
            pair.public_key_der(),
            &empty,
            SignatureAlgorithm::EcdsaP224
        ));

        let oversized = SignatureParts {
            r: vec![0xff; FIELD_SIZE + 1],
            s: vec![0x01],
        };
        assert!(!verify(
            b"id",
            pair.public_key_der(),
            &oversized,
            SignatureAlgorithm::EcdsaP224
        ));
    }

    #[test]
    fn short_scalars_are_left_padded_to_field_width() {
        let bytes = to_field_bytes(&[0x01, 0x02]).unwrap();
        let mut expected = [0u8; FIELD_SIZE];
        expected[FIELD_SIZE - 2..].copy_from_slice(&[0x01, 0x02]);
        assert_eq!(&bytes[..], &expected[..]);

        // Redundant leading zeros are ignored, not counted against the width.
        let padded = to_field_bytes(&[0x00, 0x00, 0x01, 0x02]).unwrap();
        assert_eq!(&padded[..], &expected[..]);
    }

    #[test]
    fn scalars_are_minimal_encodings() {
        let pair = KeyPair::generate().unwrap();
        let parts = sign(b"df -h", pair.private_key_der()).unwrap();
        assert!(parts.r.len() <= FIELD_SIZE);
        assert!(parts.s.len() <= FIELD_SIZE);
        assert_ne!(parts.r.first(), Some(&0));
        assert_ne!(parts.s.first(), Some(&0));
    }
}
