//! Socket-mode ingress: connects the long-lived socket transport to the
//! lifecycle service, acknowledging every envelope and reconnecting with
//! capped exponential backoff. Handler failures never tear the loop down.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use gather_places::SelectOption;

use crate::commands::SlashCommandPayload;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// One socket-mode frame: acknowledgement identity plus the decoded event.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub envelope_id: String,
    pub event: IngressEvent,
}

#[derive(Clone, Debug)]
pub enum IngressEvent {
    SlashCommand(SlashCommandPayload),
    /// Interactivity stays raw until the handler's boundary decodes it; the
    /// transport only needs enough shape to acknowledge and route.
    Interaction(Value),
    /// A `block_suggestion` frame: the platform asks for the options of an
    /// external select while the user types. The answer rides in the
    /// acknowledgement payload.
    OptionsRequest { action_id: String, query: String },
    Unsupported { event_type: String },
}

impl IngressEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::SlashCommand(_) => "slash_command",
            Self::Interaction(_) => "interactive",
            Self::OptionsRequest { .. } => "block_suggestion",
            Self::Unsupported { event_type } => event_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[async_trait]
pub trait SocketTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_envelope(&self) -> Result<Option<Envelope>, TransportError>;
    /// Acks one envelope. Options requests carry their response body here;
    /// every other envelope acks with no payload.
    async fn acknowledge(
        &self,
        envelope_id: &str,
        payload: Option<Value>,
    ) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Stand-in transport for deployments where the socket connection is not
/// configured yet. Connects, yields nothing, and closes cleanly.
#[derive(Default)]
pub struct NoopSocketTransport;

#[async_trait]
impl SocketTransport for NoopSocketTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<Envelope>, TransportError> {
        Ok(None)
    }

    async fn acknowledge(
        &self,
        _envelope_id: &str,
        _payload: Option<Value>,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// The application side of the ingress loop. Implementations construct a
/// lifecycle handler per event with the right team credentials.
#[async_trait]
pub trait IngressService: Send + Sync {
    async fn handle_slash_command(&self, payload: &SlashCommandPayload) -> Result<()>;
    async fn handle_interaction(&self, payload: &Value) -> Result<()>;
    /// Options for an external select, returned to the platform in the
    /// envelope acknowledgement.
    async fn place_options(&self, action_id: &str, query: &str) -> Result<Vec<SelectOption>>;
}

pub struct SocketModeRunner {
    transport: Arc<dyn SocketTransport>,
    service: Arc<dyn IngressService>,
    reconnect_policy: ReconnectPolicy,
}

impl SocketModeRunner {
    pub fn new(
        transport: Arc<dyn SocketTransport>,
        service: Arc<dyn IngressService>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, service, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "socket mode transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "socket mode retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening socket mode transport connection");
        self.transport.connect().await?;
        info!(attempt, "socket mode transport connected");

        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(attempt, "socket mode transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            info!(
                event_name = "ingress.envelope_received",
                envelope_id = %envelope.envelope_id,
                event_type = envelope.event.event_type(),
                correlation_id = %envelope.envelope_id,
                "received envelope"
            );

            let ack_payload = match &envelope.event {
                IngressEvent::OptionsRequest { action_id, query } => {
                    let options = match self.service.place_options(action_id, query).await {
                        Ok(options) => options,
                        Err(error) => {
                            warn!(
                                envelope_id = %envelope.envelope_id,
                                correlation_id = %envelope.envelope_id,
                                error = %error,
                                "options lookup failed; acknowledging with none"
                            );
                            Vec::new()
                        }
                    };
                    Some(json!({ "options": options }))
                }
                _ => None,
            };

            if let Err(error) =
                self.transport.acknowledge(&envelope.envelope_id, ack_payload).await
            {
                warn!(
                    event_name = "ingress.ack_sent",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    error = %error,
                    "failed to acknowledge envelope"
                );
            } else {
                debug!(
                    event_name = "ingress.ack_sent",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    "acknowledged envelope"
                );
            }

            let outcome = match &envelope.event {
                IngressEvent::SlashCommand(payload) => {
                    self.service.handle_slash_command(payload).await
                }
                IngressEvent::Interaction(payload) => {
                    self.service.handle_interaction(payload).await
                }
                // Answered in the acknowledgement above.
                IngressEvent::OptionsRequest { .. } => Ok(()),
                IngressEvent::Unsupported { event_type } => {
                    debug!(
                        envelope_id = %envelope.envelope_id,
                        event_type,
                        "ignoring unsupported envelope"
                    );
                    Ok(())
                }
            };

            if let Err(error) = outcome {
                warn!(
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    error = %error,
                    "event handling failed; continuing socket loop"
                );
            }
        }
    }
}
