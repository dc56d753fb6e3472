use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use p224::pkcs8::{EncodePrivateKey, EncodePublicKey};
use p224::SecretKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// An operator's ECDSA P-224 key pair.
///
/// The private half is PKCS#8 DER, the public half SPKI DER — standard
/// serializations so keys stay portable across implementations. The private
/// half must never cross the wire; the public half is handed to every
/// listener out-of-band.
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    private_key: Vec<u8>,
    #[zeroize(skip)]
    public_key: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh, independent key pair from OS randomness.
    pub fn generate() -> Result<Self, CryptoError> {
        let secret = SecretKey::random(&mut OsRng);

        let private_key = secret
            .to_pkcs8_der()
            .map_err(|e| CryptoError::KeyGeneration(format!("PKCS#8 encoding: {e}")))?
            .as_bytes()
            .to_vec();
        let public_key = secret
            .public_key()
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyGeneration(format!("SPKI encoding: {e}")))?
            .as_bytes()
            .to_vec();

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// The PKCS#8 DER private key.
    ///
    /// # Security
    /// Handle with care — this is the private key material.
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key
    }

    /// The SPKI DER public key.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key
    }

    /// Base64-encode both halves for transport/display.
    pub fn encode(&self) -> EncodedKeyPair {
        EncodedKeyPair {
            private_key: BASE64.encode(&self.private_key),
            public_key: BASE64.encode(&self.public_key),
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &BASE64.encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// A key pair in its base64 transport encoding, as served by
/// `POST /gen-key-pair` and printed by `courier crypto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedKeyPair {
    pub private_key: String,
    pub public_key: String,
}

/// Decode a base64-encoded key back into its DER bytes.
pub fn decode_key(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(encoded.trim())
        .map_err(|e| CryptoError::Decode(format!("invalid base64: {e}")))
}
