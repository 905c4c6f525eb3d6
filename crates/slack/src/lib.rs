//! Slack-facing surface of gatherbot: Block Kit rendering, slash-command
//! parsing, interactive-payload decoding, the event lifecycle handler, the
//! Web API client, and the socket-mode ingress loop.

pub mod blocks;
pub mod client;
pub mod commands;
pub mod handler;
pub mod interactions;
pub mod socket;
pub mod suggestion;
pub mod views;

pub use client::{ChatClient, ChatError, Responder, SlackApiClient};
pub use commands::{parse_event_command, EventCommand, SlashCommandPayload, USAGE};
pub use handler::{
    CreateEventInput, EventLifecycleHandler, HandlerError, LifecycleOutcome,
};
pub use interactions::InteractionPayload;
pub use socket::{
    Envelope, IngressEvent, IngressService, NoopSocketTransport, ReconnectPolicy,
    SocketModeRunner, SocketTransport, TransportError,
};
