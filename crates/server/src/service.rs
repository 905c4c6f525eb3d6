//! Wires socket-mode ingress events to the lifecycle handler.
//!
//! A handler is built per inbound event with the workspace's installed bot
//! token, so one running process serves every installed team.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, info, warn};

use gather_core::config::AppConfig;
use gather_db::{EventRepository, WorkspaceRepository};
use gather_places::{place_options, PlaceSearch, SelectOption};
use gather_slack::blocks::MessageTemplate;
use gather_slack::client::{ChatClient, ChatError, Responder};
use gather_slack::commands::SlashCommandPayload;
use gather_slack::handler::{EventLifecycleHandler, LifecycleOutcome};
use gather_slack::interactions::InteractionPayload;
use gather_slack::socket::IngressService;
use gather_slack::views::SUGGEST_PLACE_BLOCK;
use gather_slack::SlackApiClient;

pub struct LifecycleService {
    default_channel: String,
    default_bot_token: SecretString,
    max_suggestions: usize,
    repository: Arc<dyn EventRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
    places: Arc<dyn PlaceSearch>,
    chat: SlackApiClient,
}

impl LifecycleService {
    pub fn new(
        config: &AppConfig,
        repository: Arc<dyn EventRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
        places: Arc<dyn PlaceSearch>,
        chat: SlackApiClient,
    ) -> Self {
        Self {
            default_channel: config.slack.channel.clone(),
            default_bot_token: config.slack.bot_token.clone(),
            max_suggestions: config.places.max_suggestions,
            repository,
            workspaces,
            places,
            chat,
        }
    }

    /// Resolves the chat client for a team. Installed workspaces use their
    /// own bot token; lookup failures degrade to the configured default
    /// rather than dropping the event.
    async fn chat_for_team(&self, team_id: &str) -> Arc<SlackApiClient> {
        let token = match self.workspaces.get_workspace(team_id).await {
            Ok(Some(credential)) => SecretString::from(credential.bot_token),
            Ok(None) => self.default_bot_token.clone(),
            Err(error) => {
                warn!(
                    event_name = "ingress.workspace_lookup_failed",
                    team_id,
                    error = %error,
                    "workspace lookup failed; using default credentials"
                );
                self.default_bot_token.clone()
            }
        };
        Arc::new(self.chat.with_token(token))
    }

    async fn handler_for(
        &self,
        team_id: &str,
        user_id: &str,
        channel_id: Option<&str>,
    ) -> EventLifecycleHandler {
        let chat = self.chat_for_team(team_id).await;
        let channel = channel_id.unwrap_or(&self.default_channel).to_owned();
        let responder = Arc::new(ChannelResponder {
            chat: chat.clone(),
            channel: channel.clone(),
            user: user_id.to_owned(),
        });

        EventLifecycleHandler::new(
            team_id,
            channel,
            chat,
            responder,
            self.repository.clone(),
            self.places.clone(),
            self.max_suggestions,
        )
    }
}

#[async_trait]
impl IngressService for LifecycleService {
    async fn handle_slash_command(&self, payload: &SlashCommandPayload) -> Result<()> {
        let handler = self
            .handler_for(&payload.team_id, &payload.user_id, Some(&payload.channel_id))
            .await;
        let outcome = handler.handle_command(payload).await?;
        log_outcome("slash_command", &payload.team_id, &outcome);
        Ok(())
    }

    async fn handle_interaction(&self, payload: &Value) -> Result<()> {
        let parsed = InteractionPayload::from_json(payload);
        let Some(context) = interaction_context(&parsed) else {
            debug!("ignoring interaction without routable context");
            return Ok(());
        };

        let handler = self
            .handler_for(&context.team_id, &context.user_id, context.channel_id.as_deref())
            .await;
        let outcome = handler.handle_interaction(&parsed).await?;
        log_outcome("interaction", &context.team_id, &outcome);
        Ok(())
    }

    /// Populates the creation modal's place picker as the user types.
    async fn place_options(&self, action_id: &str, query: &str) -> Result<Vec<SelectOption>> {
        if action_id != SUGGEST_PLACE_BLOCK {
            debug!(action_id, "ignoring options request for an unknown select");
            return Ok(Vec::new());
        }

        let records = self.places.search_text(query).await?;
        Ok(place_options(&records))
    }
}

fn log_outcome(source: &str, team_id: &str, outcome: &LifecycleOutcome) {
    match outcome {
        LifecycleOutcome::Success => {
            info!(event_name = "ingress.handled", source, team_id, "lifecycle operation succeeded");
        }
        LifecycleOutcome::Failure(reason) => {
            info!(
                event_name = "ingress.handled",
                source,
                team_id,
                reason,
                "lifecycle operation reported a handled failure"
            );
        }
        LifecycleOutcome::NotApplicable(reason) => {
            debug!(
                event_name = "ingress.handled",
                source,
                team_id,
                reason,
                "lifecycle operation was not applicable"
            );
        }
    }
}

struct InteractionContext {
    team_id: String,
    user_id: String,
    channel_id: Option<String>,
}

fn interaction_context(payload: &InteractionPayload) -> Option<InteractionContext> {
    match payload {
        InteractionPayload::BlockAction(action) => Some(InteractionContext {
            team_id: action.team_id.clone(),
            user_id: action.user_id.clone(),
            channel_id: action.channel_id.clone(),
        }),
        InteractionPayload::ViewSubmission(submission) => Some(InteractionContext {
            team_id: submission.team_id.clone(),
            user_id: submission.user_id.clone(),
            channel_id: None,
        }),
        InteractionPayload::Unsupported { .. } => None,
    }
}

/// Replies scoped to one invocation: `say` goes to the channel, `respond`
/// only to the invoking user.
struct ChannelResponder {
    chat: Arc<SlackApiClient>,
    channel: String,
    user: String,
}

#[async_trait]
impl Responder for ChannelResponder {
    async fn say(&self, message: MessageTemplate) -> Result<(), ChatError> {
        self.chat.send_public_message(&self.channel, &message).await
    }

    async fn respond(&self, message: MessageTemplate) -> Result<(), ChatError> {
        self.chat.send_ephemeral_blocks(&self.channel, &self.user, &message).await
    }
}
