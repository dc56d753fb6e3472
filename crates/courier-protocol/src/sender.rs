//! Operator-side publisher: sign one command, publish it, wait for the reply.

use futures::StreamExt;

use crate::envelope::CommandEnvelope;
use crate::error::ProtocolError;
use crate::queue::{self, ChannelQueues, QueueHandle};

/// Immutable sender configuration, assembled once per invocation.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub amqp_url: String,
    pub channel: String,
    /// Operator private key, PKCS#8 DER.
    pub private_key: Vec<u8>,
}

/// Builds and signs an envelope, publishes it to the inbound queue, and
/// blocks for exactly one reply on the outbound queue.
pub struct Sender {
    config: SenderConfig,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Self {
        Self { config }
    }

    /// Send one signed command and return the listener's reply body.
    ///
    /// There is deliberately no timeout and no publish retry: an
    /// unreachable or aborted listener leaves the call blocked until the
    /// operator kills the process.
    pub async fn send(&self, command: &str) -> Result<String, ProtocolError> {
        let envelope = CommandEnvelope::signed(command, &self.config.private_key)?;
        let payload = envelope.to_bytes()?;

        let connection = queue::connect(&self.config.amqp_url).await?;
        let queues = ChannelQueues::resolve(&self.config.channel);
        let inbound = QueueHandle::open(&connection, &queues.inbound).await?;
        let outbound = QueueHandle::open(&connection, &queues.outbound).await?;

        inbound.publish("application/json", &payload).await?;
        tracing::info!(channel = %self.config.channel, queue = %inbound.name(), "command published");

        let mut replies = outbound.consume().await?;
        match replies.next().await {
            Some(delivery) => {
                let delivery = delivery?;
                Ok(String::from_utf8_lossy(&delivery.data).into_owned())
            }
            None => Err(ProtocolError::ReplyStreamClosed),
        }
    }
}
