use serde::{Deserialize, Serialize};

use courier_crypto::{SignatureAlgorithm, SignatureParts};

use crate::error::ProtocolError;

/// Wire format for everything published to an inbound queue.
///
/// JSON with field names `type`, `command`, `r`, `s`; the signature scalars
/// are base64 strings, matching Go's `encoding/json` treatment of byte
/// slices so envelopes stay portable across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Raw shell command text. Empty for PING.
    pub command: String,
    /// Big-endian `r` signature scalar. Empty for PING.
    #[serde(with = "base64_bytes", default)]
    pub r: Vec<u8>,
    /// Big-endian `s` signature scalar. Empty for PING.
    #[serde(with = "base64_bytes", default)]
    pub s: Vec<u8>,
}

/// The two message kinds a listener accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// A signed shell command.
    #[serde(rename = "CMD")]
    Cmd,
    /// An unsigned reachability probe.
    #[serde(rename = "PING")]
    Ping,
}

impl CommandEnvelope {
    /// Build a CMD envelope, signing the raw command bytes with the
    /// operator's PKCS#8 DER private key.
    pub fn signed(command: &str, private_key_der: &[u8]) -> Result<Self, ProtocolError> {
        let parts = courier_crypto::sign(command.as_bytes(), private_key_der)?;
        Ok(Self {
            kind: EnvelopeKind::Cmd,
            command: command.to_string(),
            r: parts.r,
            s: parts.s,
        })
    }

    /// Build an unsigned PING envelope.
    pub fn ping() -> Self {
        Self {
            kind: EnvelopeKind::Ping,
            command: String::new(),
            r: Vec::new(),
            s: Vec::new(),
        }
    }

    /// Check the envelope's signature over its command text.
    pub fn verify(&self, public_key_der: &[u8], algorithm: SignatureAlgorithm) -> bool {
        let parts = SignatureParts {
            r: self.r.clone(),
            s: self.s.clone(),
        };
        courier_crypto::verify(self.command.as_bytes(), public_key_der, &parts, algorithm)
    }

    /// Serialize to the JSON wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Parse from the JSON wire form.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }
}

/// Byte slices as base64 strings on the wire. `null` decodes to empty, the
/// way Go marshals a nil slice.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        match encoded {
            None => Ok(Vec::new()),
            Some(text) => BASE64.decode(text).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_crypto::KeyPair;

    #[test]
    fn wire_form_uses_original_field_names() {
        let pair = KeyPair::generate().unwrap();
        let envelope = CommandEnvelope::signed("whoami", pair.private_key_der()).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(value["type"], "CMD");
        assert_eq!(value["command"], "whoami");
        // r and s are base64 strings, not arrays of numbers.
        assert!(value["r"].is_string());
        assert!(value["s"].is_string());
    }

    #[test]
    fn signed_envelope_round_trips_and_verifies() {
        let pair = KeyPair::generate().unwrap();
        let envelope = CommandEnvelope::signed("ls -la", pair.private_key_der()).unwrap();

        let decoded = CommandEnvelope::from_bytes(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.kind, EnvelopeKind::Cmd);
        assert_eq!(decoded.command, "ls -la");
        assert!(decoded.verify(pair.public_key_der(), SignatureAlgorithm::EcdsaP224));
    }

    #[test]
    fn tampered_command_fails_verification() {
        let pair = KeyPair::generate().unwrap();
        let mut envelope = CommandEnvelope::signed("whoami", pair.private_key_der()).unwrap();
        envelope.command = "rm -rf /".to_string();
        assert!(!envelope.verify(pair.public_key_der(), SignatureAlgorithm::EcdsaP224));
    }

    #[test]
    fn ping_has_empty_fields() {
        let envelope = CommandEnvelope::ping();
        assert_eq!(envelope.kind, EnvelopeKind::Ping);
        assert!(envelope.command.is_empty());
        assert!(envelope.r.is_empty() && envelope.s.is_empty());
    }

    #[test]
    fn ping_wire_form() {
        let value: serde_json::Value =
            serde_json::from_slice(&CommandEnvelope::ping().to_bytes().unwrap()).unwrap();
        assert_eq!(value["type"], "PING");
        assert_eq!(value["command"], "");
    }

    #[test]
    fn null_signature_fields_decode_to_empty() {
        // A Go sender marshals nil byte slices as null.
        let decoded =
            CommandEnvelope::from_bytes(br#"{"type":"PING","command":"","r":null,"s":null}"#)
                .unwrap();
        assert!(decoded.r.is_empty() && decoded.s.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CommandEnvelope::from_bytes(b"{\"type\":").is_err());
        assert!(CommandEnvelope::from_bytes(b"not json at all").is_err());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let result =
            CommandEnvelope::from_bytes(br#"{"type":"EXEC","command":"id","r":"","s":""}"#);
        assert!(result.is_err());
    }
}
