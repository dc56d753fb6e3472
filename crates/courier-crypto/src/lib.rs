pub mod error;
pub mod keypair;
pub mod signature;

pub use error::CryptoError;
pub use keypair::{decode_key, EncodedKeyPair, KeyPair};
pub use signature::{sign, verify, SignatureAlgorithm, SignatureParts};
