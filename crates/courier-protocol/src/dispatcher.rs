//! Listener-side message dispatch.
//!
//! The listener cycles `Consuming → Handling → Consuming` over the inbound
//! queue, handling messages strictly sequentially. Each message is handled
//! in isolation and produces a typed result; the loop then applies a
//! per-error-kind policy deciding whether to reply and continue or to abort
//! the listener (the terminal `Aborted` state). The fail-closed stance is
//! deliberate: a message the listener cannot parse or attribute to the
//! trusted key stops consumption entirely rather than risk executing
//! untrusted input.

use std::process::Stdio;

use futures::StreamExt;
use thiserror::Error;
use tokio::process::Command;

use courier_crypto::SignatureAlgorithm;

use crate::envelope::{CommandEnvelope, EnvelopeKind};
use crate::error::ProtocolError;
use crate::queue::{self, ChannelQueues, QueueHandle};

/// Immutable listener configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub amqp_url: String,
    pub channel: String,
    /// Trusted operator public key, SPKI DER.
    pub public_key: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
    /// Host identifier sent in reply to PING probes.
    pub hostname: String,
}

/// A failure while handling one message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("command verification failed")]
    Verification,

    #[error("{0}")]
    Execution(String),
}

/// What the consumption loop does with a failed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Publish the error text as the protocol reply and keep consuming.
    Report,
    /// Terminate the listener without executing anything further.
    Abort,
}

impl DispatchError {
    /// Abort-vs-continue policy per error kind.
    pub fn disposition(&self) -> Disposition {
        match self {
            // An unparseable envelope or an unattributable command means
            // something untrusted can write to the inbound queue. Halt.
            DispatchError::Malformed(_) | DispatchError::Verification => Disposition::Abort,
            DispatchError::Execution(_) => Disposition::Report,
        }
    }
}

/// Consumes envelopes from the inbound queue, verifies and executes them,
/// publishes results to the outbound queue.
pub struct Dispatcher {
    config: ListenerConfig,
}

impl Dispatcher {
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// Run the consume loop.
    ///
    /// Returns `Err` when a fatal error aborts the listener; returns `Ok`
    /// only if the broker closes the delivery stream.
    pub async fn run(&self) -> Result<(), ProtocolError> {
        let connection = queue::connect(&self.config.amqp_url).await?;
        let queues = ChannelQueues::resolve(&self.config.channel);
        let inbound = QueueHandle::open(&connection, &queues.inbound).await?;
        let outbound = QueueHandle::open(&connection, &queues.outbound).await?;

        let mut deliveries = inbound.consume().await?;
        tracing::info!(queue = %inbound.name(), "waiting for commands");

        while let Some(delivery) = deliveries.next().await {
            let delivery = delivery?;
            tracing::debug!(bytes = delivery.data.len(), "received a message");

            match self.handle_message(&delivery.data).await {
                Ok(reply) => outbound.publish("text/plain", reply.as_bytes()).await?,
                Err(e) => match e.disposition() {
                    Disposition::Report => {
                        tracing::warn!(error = %e, "command failed, reporting to operator");
                        outbound.publish("text/plain", e.to_string().as_bytes()).await?;
                    }
                    Disposition::Abort => {
                        tracing::error!(error = %e, "fatal dispatch error, aborting listener");
                        return Err(e.into());
                    }
                },
            }
        }

        tracing::info!("delivery stream ended");
        Ok(())
    }

    /// Parse and handle one raw message body.
    pub async fn handle_message(&self, raw: &[u8]) -> Result<String, DispatchError> {
        let envelope = CommandEnvelope::from_bytes(raw).map_err(|e| match e {
            ProtocolError::MalformedEnvelope(msg) => DispatchError::Malformed(msg),
            other => DispatchError::Malformed(other.to_string()),
        })?;
        self.handle_envelope(envelope).await
    }

    /// Handle one parsed envelope and produce the reply body.
    pub async fn handle_envelope(&self, envelope: CommandEnvelope) -> Result<String, DispatchError> {
        match envelope.kind {
            // Reachability probe: reply with the host identifier, signature
            // fields are ignored.
            EnvelopeKind::Ping => Ok(self.config.hostname.clone()),
            EnvelopeKind::Cmd => {
                if !envelope.verify(&self.config.public_key, self.config.algorithm) {
                    return Err(DispatchError::Verification);
                }
                tracing::info!(command = %envelope.command, "verified command");
                run_command(&envelope.command).await
            }
        }
    }
}

/// Split verified command text into an executable and its arguments using
/// shell-word rules, so quoting works and repeated or trailing whitespace
/// never leaks into tokens.
fn tokenize(command: &str) -> Result<Vec<String>, DispatchError> {
    shell_words::split(command)
        .map_err(|e| DispatchError::Execution(format!("bad command syntax: {e}")))
}

/// Execute a verified command, capturing stdout only.
async fn run_command(command: &str) -> Result<String, DispatchError> {
    let tokens = tokenize(command)?;
    let Some((program, args)) = tokens.split_first() else {
        return Err(DispatchError::Execution("empty command".to_string()));
    };

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DispatchError::Execution(format!("{program}: {e}")))?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| DispatchError::Execution(e.to_string()))?;

    if !output.status.success() {
        return Err(DispatchError::Execution(format!(
            "{program}: {}",
            output.status
        )));
    }

    if output.stdout.is_empty() {
        Ok("OK".to_string())
    } else {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
