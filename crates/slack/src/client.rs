//! Chat-platform capability interface and the reqwest-backed Web API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::blocks::{HomeView, MessageTemplate, ModalView};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat api `{method}` failed: {error}")]
    Api { method: String, error: String },
}

/// Outbound chat operations the handler depends on.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_public_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatError>;

    async fn send_ephemeral_message(
        &self,
        channel: &str,
        user: &str,
        text: &str,
    ) -> Result<(), ChatError>;

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), ChatError>;

    async fn publish_home_view(&self, user_id: &str, view: &HomeView) -> Result<(), ChatError>;
}

/// Per-request reply channel: `say` posts publicly into the conversation,
/// `respond` goes to the invoker only.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn say(&self, message: MessageTemplate) -> Result<(), ChatError>;

    async fn respond(&self, message: MessageTemplate) -> Result<(), ChatError>;
}

#[derive(Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackApiClient {
    client: reqwest::Client,
    bot_token: SecretString,
    base_url: String,
}

impl SlackApiClient {
    pub fn new(bot_token: SecretString) -> Self {
        Self::with_base_url(bot_token, "https://slack.com/api")
    }

    pub fn with_base_url(bot_token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
            base_url: base_url.into(),
        }
    }

    /// Same client wired to a different workspace's installation token.
    pub fn with_token(&self, bot_token: SecretString) -> Self {
        Self { client: self.client.clone(), bot_token, base_url: self.base_url.clone() }
    }

    /// Invoker-only message carrying full block content, for slash-command
    /// replies richer than a one-liner.
    pub async fn send_ephemeral_blocks(
        &self,
        channel: &str,
        user: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatError> {
        self.call(
            "chat.postEphemeral",
            json!({
                "channel": channel,
                "user": user,
                "text": message.fallback_text,
                "blocks": message.blocks,
            }),
        )
        .await
    }

    async fn call(&self, method: &str, body: Value) -> Result<(), ChatError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bot_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let envelope: ApiEnvelope = response.json().await?;
        if !envelope.ok {
            return Err(ChatError::Api {
                method: method.to_owned(),
                error: envelope.error.unwrap_or_else(|| "unknown_error".to_owned()),
            });
        }
        debug!(method, "chat api call succeeded");
        Ok(())
    }
}

#[async_trait]
impl ChatClient for SlackApiClient {
    async fn send_public_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatError> {
        self.call(
            "chat.postMessage",
            json!({
                "channel": channel,
                "text": message.fallback_text,
                "blocks": message.blocks,
            }),
        )
        .await
    }

    async fn send_ephemeral_message(
        &self,
        channel: &str,
        user: &str,
        text: &str,
    ) -> Result<(), ChatError> {
        self.call(
            "chat.postEphemeral",
            json!({ "channel": channel, "user": user, "text": text }),
        )
        .await
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), ChatError> {
        self.call("views.open", json!({ "trigger_id": trigger_id, "view": view })).await
    }

    async fn publish_home_view(&self, user_id: &str, view: &HomeView) -> Result<(), ChatError> {
        self.call("views.publish", json!({ "user_id": user_id, "view": view })).await
    }
}
