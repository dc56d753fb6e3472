//! Queue naming and broker wiring.
//!
//! One logical channel maps to a pair of queues: `<channel>_i` carries
//! operator→listener traffic, `<channel>_o` carries the replies. Queues are
//! declared non-durable and auto-delete by whichever side opens them first;
//! nothing outlives the broker.

use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};

use crate::error::ProtocolError;

/// The queue pair derived from a logical channel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelQueues {
    pub inbound: String,
    pub outbound: String,
}

impl ChannelQueues {
    /// Derive the queue names for a channel.
    pub fn resolve(channel: &str) -> Self {
        Self {
            inbound: format!("{channel}_i"),
            outbound: format!("{channel}_o"),
        }
    }
}

/// Connect to the broker.
pub async fn connect(amqp_url: &str) -> Result<Connection, ProtocolError> {
    let connection = Connection::connect(amqp_url, ConnectionProperties::default()).await?;
    tracing::debug!(url = %amqp_url, "connected to broker");
    Ok(connection)
}

/// One declared queue with its own AMQP channel.
pub struct QueueHandle {
    channel: Channel,
    queue: String,
}

impl QueueHandle {
    /// Open an AMQP channel and declare the queue if absent.
    pub async fn open(connection: &Connection, queue: &str) -> Result<Self, ProtocolError> {
        let channel = connection.create_channel().await?;
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: false,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(Self {
            channel,
            queue: queue.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.queue
    }

    /// Publish a message body to the queue via the default exchange.
    pub async fn publish(&self, content_type: &str, body: &[u8]) -> Result<(), ProtocolError> {
        self.channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default().with_content_type(content_type.to_string().into()),
            )
            .await?
            .await?;
        Ok(())
    }

    /// Start consuming deliveries (auto-ack).
    pub async fn consume(&self) -> Result<Consumer, ProtocolError> {
        let consumer = self
            .channel
            .basic_consume(
                &self.queue,
                "",
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(consumer)
    }
}
