use thiserror::Error;

use crate::dispatcher::DispatchError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("broker i/o failed: {0}")]
    Broker(#[from] lapin::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("dispatch aborted: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("reply stream closed before a reply arrived")]
    ReplyStreamClosed,

    #[error("crypto error: {0}")]
    Crypto(String),
}

impl From<courier_crypto::CryptoError> for ProtocolError {
    fn from(e: courier_crypto::CryptoError) -> Self {
        Self::Crypto(e.to_string())
    }
}
