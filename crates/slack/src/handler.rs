//! The event lifecycle handler: interprets slash commands and interactive
//! payloads, authorizes mutations, coordinates the place-search and
//! persistence collaborators, and renders replies.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use gather_core::dates;
use gather_core::domain::event::{Event, EventId};
use gather_core::domain::place::PlaceSummary;
use gather_db::repositories::{EventRepository, RepositoryError};
use gather_places::{PlaceError, PlaceSearch};

use crate::blocks::{HomeView, MessageBuilder, MessageTemplate, OptionObject, TextObject};
use crate::client::{ChatClient, ChatError, Responder};
use crate::commands::{parse_event_command, EventCommand, SlashCommandPayload, USAGE};
use crate::interactions::{BlockAction, InteractionPayload, ViewSubmission};
use crate::suggestion::{suggestions_message, PlaceSuggestion, CREATE_EVENT_SUGGEST_ACTION};
use crate::views::{
    create_event_modal, event_message_blocks, events_home_view, CREATE_EVENT_DIALOG_CALLBACK,
    DELETE_EVENT_ACTION, JOIN_EVENT_ACTION, LEAVE_EVENT_ACTION,
};

pub const NO_UPCOMING_EVENT: &str = "There is no upcoming event planned";
pub const NO_EVENT_ON_DAY: &str = "Couldn't find any event on that day.";
pub const JOIN_SUCCESS: &str = "*Great!* You've joined the event!";
pub const JOIN_FAILURE: &str =
    "*Oops!* I couldn't join you to that event. Maybe you are already participating?";
pub const LEAVE_SUCCESS: &str = "*Done!* You are now removed from the event!";
pub const LEAVE_FAILURE: &str = "*Oops!* Are you really joined to that event?";
pub const DELETE_MISSING: &str = "*Sorry!* I couldn't find the event to delete.";
pub const DELETE_UNAUTHORIZED: &str = "*Sorry!* You can only delete events you created.";
pub const DELETE_FAILED: &str = "*Sorry!* I was unable to delete the event.";
pub const FOLLOW_DIALOG: &str = "Please follow the instructions in the dialog!";
pub const SPECIFY_LOCATION: &str = "Please specify a location to search for";
pub const NO_DIALOG_CONTEXT: &str = "*Sorry!* I can't open the creation dialog from here.";

/// What a lifecycle operation amounted to.
///
/// `Failure` is a handled, user-visible failure (authorization, not-found,
/// conditional update lost); `NotApplicable` is a local short-circuit that
/// touched no collaborator state. Transport errors are never folded in here,
/// they propagate as [`HandlerError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Success,
    Failure(String),
    NotApplicable(String),
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] gather_core::DomainError),
}

/// Inputs of the creation-dialog submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateEventInput {
    pub date: String,
    pub time: String,
    pub place_id: String,
    pub author: String,
    pub channel_id: String,
    pub description: Option<String>,
}

/// Constructed once per inbound interaction.
pub struct EventLifecycleHandler {
    team_id: String,
    channel: String,
    chat: Arc<dyn ChatClient>,
    responder: Arc<dyn Responder>,
    repository: Arc<dyn EventRepository>,
    places: Arc<dyn PlaceSearch>,
    max_suggestions: usize,
}

impl EventLifecycleHandler {
    pub fn new(
        team_id: impl Into<String>,
        channel: impl Into<String>,
        chat: Arc<dyn ChatClient>,
        responder: Arc<dyn Responder>,
        repository: Arc<dyn EventRepository>,
        places: Arc<dyn PlaceSearch>,
        max_suggestions: usize,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            channel: channel.into(),
            chat,
            responder,
            repository,
            places,
            max_suggestions,
        }
    }

    /// Parses and dispatches one slash-command invocation.
    pub async fn handle_command(
        &self,
        payload: &SlashCommandPayload,
    ) -> Result<LifecycleOutcome, HandlerError> {
        match parse_event_command(&payload.text) {
            EventCommand::Empty => {
                let message = format!("No command given, {USAGE}");
                self.responder.respond(MessageTemplate::from_text(&message)).await?;
                Ok(LifecycleOutcome::NotApplicable(message))
            }
            EventCommand::Unknown { verb } => {
                warn!(
                    event_name = "lifecycle.command_rejected",
                    team_id = %self.team_id,
                    verb,
                    "unknown event command verb"
                );
                let message = format!("Invalid command given, {USAGE}");
                self.responder.respond(MessageTemplate::from_text(&message)).await?;
                Ok(LifecycleOutcome::NotApplicable(message))
            }
            EventCommand::List => self.list_events().await,
            EventCommand::Create => {
                self.create_event(payload.trigger_id.as_deref(), &payload.channel_id).await
            }
            EventCommand::Suggest { area } => {
                self.suggest_event(area.as_deref(), &payload.user_id, Some(payload.channel_id.as_str()))
                    .await
            }
        }
    }

    /// Replies with every upcoming event, today inclusive.
    pub async fn list_events(&self) -> Result<LifecycleOutcome, HandlerError> {
        let events = self.upcoming_events().await?;
        if events.is_empty() {
            self.responder.respond(MessageTemplate::from_text(NO_UPCOMING_EVENT)).await?;
            return Ok(LifecycleOutcome::Success);
        }

        let mut builder = MessageBuilder::new("Upcoming events");
        for event in &events {
            builder = builder.extend(event_message_blocks(event));
        }
        self.responder.respond(builder.build()).await?;
        Ok(LifecycleOutcome::Success)
    }

    /// Opens the creation dialog; without a trigger there is nothing to
    /// anchor the modal to, so the user gets a corrective reply instead.
    pub async fn create_event(
        &self,
        trigger_id: Option<&str>,
        channel_id: &str,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let Some(trigger_id) = trigger_id else {
            self.responder.respond(MessageTemplate::from_text(NO_DIALOG_CONTEXT)).await?;
            return Ok(LifecycleOutcome::NotApplicable(NO_DIALOG_CONTEXT.to_owned()));
        };

        self.chat.open_view(trigger_id, &create_event_modal(channel_id, None)).await?;
        self.responder.respond(MessageTemplate::from_text(FOLLOW_DIALOG)).await?;
        Ok(LifecycleOutcome::Success)
    }

    /// Creates and announces an event from the submitted dialog inputs.
    ///
    /// Place lookup and insert failures propagate: no announcement without
    /// a persisted event, and no event without a resolved place.
    pub async fn create_event_from_input(
        &self,
        input: CreateEventInput,
    ) -> Result<EventId, HandlerError> {
        let record = self.places.get_place(&input.place_id).await?;
        let location = PlaceSummary::from_record(&record);
        let event = Event::new(
            &self.team_id,
            &input.date,
            &input.time,
            location,
            input.description.clone(),
            None,
            Some(input.author.clone()),
        );
        event.validate()?;

        let id = self.repository.insert_event(event.clone()).await?;
        let mut announced = event;
        announced.id = Some(id.clone());

        let message = MessageBuilder::new(format!("New event: {announced}"))
            .section(|section| {
                section.mrkdwn(format!("<@{}> planned a new event!", input.author));
            })
            .extend(PlaceSuggestion::new(&record).format_card())
            .extend(event_message_blocks(&announced))
            .build();
        self.chat.send_public_message(&input.channel_id, &message).await?;

        info!(
            event_name = "lifecycle.event_created",
            team_id = %self.team_id,
            event_id = %id,
            date = %announced.date,
            "event created and announced"
        );
        Ok(id)
    }

    /// Replies with up to `max_suggestions` place cards for the given area.
    pub async fn suggest_event(
        &self,
        area: Option<&str>,
        user: &str,
        channel: Option<&str>,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let Some(area) = area else {
            self.send_ephemeral_message(SPECIFY_LOCATION, Some(user), channel).await?;
            return Ok(LifecycleOutcome::NotApplicable(SPECIFY_LOCATION.to_owned()));
        };

        let records = self.places.search_text(area).await?;
        self.responder.respond(suggestions_message(&records, self.max_suggestions)).await?;
        Ok(LifecycleOutcome::Success)
    }

    pub async fn join_event(
        &self,
        author: &str,
        event_id: Option<&str>,
        channel: Option<&str>,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let Some(event_id) = event_id else {
            return Ok(LifecycleOutcome::NotApplicable(NO_EVENT_ON_DAY.to_owned()));
        };

        let id = EventId(event_id.to_owned());
        if self.repository.join_event(&id, author).await? {
            info!(
                event_name = "lifecycle.event_joined",
                team_id = %self.team_id,
                event_id = %id,
                "participant joined"
            );
            self.send_ephemeral_message(JOIN_SUCCESS, Some(author), channel).await?;
            Ok(LifecycleOutcome::Success)
        } else {
            self.send_ephemeral_message(JOIN_FAILURE, Some(author), channel).await?;
            Ok(LifecycleOutcome::Failure(JOIN_FAILURE.to_owned()))
        }
    }

    pub async fn leave_event(
        &self,
        event_id: Option<&str>,
        author: &str,
        channel: Option<&str>,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let Some(event_id) = event_id else {
            return Ok(LifecycleOutcome::NotApplicable(NO_EVENT_ON_DAY.to_owned()));
        };

        let id = EventId(event_id.to_owned());
        if self.repository.leave_event(&id, author).await? {
            info!(
                event_name = "lifecycle.event_left",
                team_id = %self.team_id,
                event_id = %id,
                "participant left"
            );
            self.send_ephemeral_message(LEAVE_SUCCESS, Some(author), channel).await?;
            Ok(LifecycleOutcome::Success)
        } else {
            self.send_ephemeral_message(LEAVE_FAILURE, Some(author), channel).await?;
            Ok(LifecycleOutcome::Failure(LEAVE_FAILURE.to_owned()))
        }
    }

    /// Deletes an event. Only the stored author may delete; everyone else
    /// gets a private denial.
    pub async fn delete_event(
        &self,
        event_id: Option<&str>,
        author: &str,
        channel: Option<&str>,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let Some(event_id) = event_id else {
            return Ok(LifecycleOutcome::NotApplicable(NO_EVENT_ON_DAY.to_owned()));
        };

        let id = EventId(event_id.to_owned());
        let Some(event) = self.repository.get_event(&id).await? else {
            self.send_ephemeral_message(DELETE_MISSING, Some(author), channel).await?;
            return Ok(LifecycleOutcome::Failure("Event not found.".to_owned()));
        };

        if event.author.as_deref() != Some(author) {
            warn!(
                event_name = "lifecycle.delete_denied",
                team_id = %self.team_id,
                event_id = %id,
                "delete attempted by non-author"
            );
            self.send_ephemeral_message(DELETE_UNAUTHORIZED, Some(author), channel).await?;
            return Ok(LifecycleOutcome::Failure("Unauthorized to delete the event.".to_owned()));
        }

        if self.repository.delete_event(&id, author).await? {
            info!(
                event_name = "lifecycle.event_deleted",
                team_id = %self.team_id,
                event_id = %id,
                "event deleted"
            );
            let recap = MessageTemplate::from_text(format!(
                "<@{author}> deleted the event at {} planned for {} at {}.",
                event.location.name, event.date, event.time
            ));
            self.responder.say(recap).await?;
            Ok(LifecycleOutcome::Success)
        } else {
            self.send_ephemeral_message(DELETE_FAILED, Some(author), channel).await?;
            Ok(LifecycleOutcome::Failure("Failed to delete the event.".to_owned()))
        }
    }

    /// Private one-liner to a user in a channel. A no-op when either
    /// coordinate is missing, by contract.
    pub async fn send_ephemeral_message(
        &self,
        text: &str,
        user: Option<&str>,
        channel: Option<&str>,
    ) -> Result<(), HandlerError> {
        if let (Some(user), Some(channel)) = (user, channel) {
            self.chat.send_ephemeral_message(channel, user, text).await?;
        }
        Ok(())
    }

    /// Re-renders and publishes the user's home tab. No-op without a user.
    pub async fn update_events_view(&self, user_id: Option<&str>) -> Result<(), HandlerError> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let view = self.show_events_view().await?;
        self.chat.publish_home_view(user_id, &view).await?;
        Ok(())
    }

    /// The current home document. Always `type == "home"`.
    pub async fn show_events_view(&self) -> Result<HomeView, HandlerError> {
        let events = self.upcoming_events().await?;
        Ok(events_home_view(&events))
    }

    /// Dispatches one parsed interactive payload. Every lifecycle mutation
    /// is followed by a home-view refresh for the invoker.
    pub async fn handle_interaction(
        &self,
        payload: &InteractionPayload,
    ) -> Result<LifecycleOutcome, HandlerError> {
        match payload {
            InteractionPayload::BlockAction(action) => self.handle_block_action(action).await,
            InteractionPayload::ViewSubmission(submission) => {
                self.handle_view_submission(submission).await
            }
            InteractionPayload::Unsupported { kind } => {
                Ok(LifecycleOutcome::NotApplicable(format!("Unsupported interaction `{kind}`.")))
            }
        }
    }

    async fn handle_block_action(
        &self,
        action: &BlockAction,
    ) -> Result<LifecycleOutcome, HandlerError> {
        match action.action_id.as_str() {
            JOIN_EVENT_ACTION => {
                let outcome = self
                    .join_event(&action.user_id, action.value.as_deref(), action.channel_id.as_deref())
                    .await?;
                self.update_events_view(Some(&action.user_id)).await?;
                Ok(outcome)
            }
            LEAVE_EVENT_ACTION => {
                let outcome = self
                    .leave_event(action.value.as_deref(), &action.user_id, action.channel_id.as_deref())
                    .await?;
                self.update_events_view(Some(&action.user_id)).await?;
                Ok(outcome)
            }
            DELETE_EVENT_ACTION => {
                let outcome = self
                    .delete_event(action.value.as_deref(), &action.user_id, action.channel_id.as_deref())
                    .await?;
                self.update_events_view(Some(&action.user_id)).await?;
                Ok(outcome)
            }
            CREATE_EVENT_SUGGEST_ACTION => self.open_creation_dialog(action).await,
            other => {
                Ok(LifecycleOutcome::NotApplicable(format!("Unsupported action `{other}`.")))
            }
        }
    }

    async fn open_creation_dialog(
        &self,
        action: &BlockAction,
    ) -> Result<LifecycleOutcome, HandlerError> {
        let (Some(trigger_id), Some(place_id)) =
            (action.trigger_id.as_deref(), action.value.as_deref())
        else {
            self.send_ephemeral_message(
                NO_DIALOG_CONTEXT,
                Some(&action.user_id),
                action.channel_id.as_deref(),
            )
            .await?;
            return Ok(LifecycleOutcome::NotApplicable(NO_DIALOG_CONTEXT.to_owned()));
        };

        let record = self.places.get_place(place_id).await?;
        let preselected = OptionObject {
            text: TextObject::plain(record.name.clone()),
            value: record.id.clone(),
        };
        let channel = action.channel_id.as_deref().unwrap_or(&self.channel);
        self.chat.open_view(trigger_id, &create_event_modal(channel, Some(preselected))).await?;
        Ok(LifecycleOutcome::Success)
    }

    async fn handle_view_submission(
        &self,
        submission: &ViewSubmission,
    ) -> Result<LifecycleOutcome, HandlerError> {
        if !submission.callback_id.starts_with(CREATE_EVENT_DIALOG_CALLBACK) {
            return Ok(LifecycleOutcome::NotApplicable(format!(
                "Unsupported dialog `{}`.",
                submission.callback_id
            )));
        }

        let channel = submission
            .callback_id
            .split_once('|')
            .map(|(_, channel)| channel)
            .filter(|channel| !channel.is_empty())
            .unwrap_or(&self.channel);

        let (Some(date), Some(time), Some(place_id)) = (
            submission.state.date.as_deref(),
            submission.state.time.as_deref(),
            submission.state.place_id.as_deref(),
        ) else {
            return Ok(LifecycleOutcome::Failure("Missing event details.".to_owned()));
        };

        self.create_event_from_input(CreateEventInput {
            date: date.to_owned(),
            time: time.to_owned(),
            place_id: place_id.to_owned(),
            author: submission.user_id.clone(),
            channel_id: channel.to_owned(),
            description: submission.state.description.clone(),
        })
        .await?;
        self.update_events_view(Some(&submission.user_id)).await?;
        Ok(LifecycleOutcome::Success)
    }

    async fn upcoming_events(&self) -> Result<Vec<Event>, HandlerError> {
        // Same clock as the natural-date helpers, so the list boundary and
        // "today" agree around midnight.
        Ok(self.repository.list_events(&self.team_id, &dates::today()).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use gather_core::domain::event::Event;
    use gather_core::domain::place::{PlaceRecord, PlaceSummary};
    use gather_db::repositories::memory::InMemoryEventRepository;
    use gather_db::repositories::{EventRepository, RepositoryError};
    use gather_core::domain::event::EventId;
    use gather_places::{PlaceError, PlaceSearch};

    use super::{
        CreateEventInput, EventLifecycleHandler, HandlerError, LifecycleOutcome, DELETE_FAILED,
        DELETE_MISSING, DELETE_UNAUTHORIZED, FOLLOW_DIALOG, JOIN_FAILURE, JOIN_SUCCESS,
        LEAVE_FAILURE, LEAVE_SUCCESS, NO_EVENT_ON_DAY, NO_UPCOMING_EVENT, SPECIFY_LOCATION,
    };
    use crate::blocks::{Block, HomeView, MessageTemplate, ModalView};
    use crate::client::{ChatClient, ChatError, Responder};
    use crate::commands::SlashCommandPayload;
    use crate::interactions::InteractionPayload;
    use crate::suggestion::CREATE_EVENT_SUGGEST_ACTION;

    #[derive(Default)]
    struct RecordingChat {
        public: Mutex<Vec<(String, MessageTemplate)>>,
        ephemeral: Mutex<Vec<(String, String, String)>>,
        opened_views: Mutex<Vec<(String, ModalView)>>,
        published_homes: Mutex<Vec<(String, HomeView)>>,
    }

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn send_public_message(
            &self,
            channel: &str,
            message: &MessageTemplate,
        ) -> Result<(), ChatError> {
            self.public.lock().expect("lock").push((channel.to_owned(), message.clone()));
            Ok(())
        }

        async fn send_ephemeral_message(
            &self,
            channel: &str,
            user: &str,
            text: &str,
        ) -> Result<(), ChatError> {
            self.ephemeral
                .lock()
                .expect("lock")
                .push((channel.to_owned(), user.to_owned(), text.to_owned()));
            Ok(())
        }

        async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), ChatError> {
            self.opened_views.lock().expect("lock").push((trigger_id.to_owned(), view.clone()));
            Ok(())
        }

        async fn publish_home_view(
            &self,
            user_id: &str,
            view: &HomeView,
        ) -> Result<(), ChatError> {
            self.published_homes.lock().expect("lock").push((user_id.to_owned(), view.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingResponder {
        said: Mutex<Vec<MessageTemplate>>,
        responded: Mutex<Vec<MessageTemplate>>,
    }

    #[async_trait]
    impl Responder for RecordingResponder {
        async fn say(&self, message: MessageTemplate) -> Result<(), ChatError> {
            self.said.lock().expect("lock").push(message);
            Ok(())
        }

        async fn respond(&self, message: MessageTemplate) -> Result<(), ChatError> {
            self.responded.lock().expect("lock").push(message);
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubPlaces {
        records: Vec<PlaceRecord>,
    }

    #[async_trait]
    impl PlaceSearch for StubPlaces {
        async fn search_text(&self, _query: &str) -> Result<Vec<PlaceRecord>, PlaceError> {
            Ok(self.records.clone())
        }

        async fn get_place(&self, place_id: &str) -> Result<PlaceRecord, PlaceError> {
            self.records
                .iter()
                .find(|record| record.id == place_id)
                .cloned()
                .ok_or_else(|| PlaceError::NotFound(place_id.to_owned()))
        }
    }

    /// Event exists and the author matches, but the conditional delete is
    /// lost. Models the storage reporting no rows affected.
    struct LostDeleteRepository {
        event: Event,
    }

    #[async_trait]
    impl EventRepository for LostDeleteRepository {
        async fn insert_event(&self, _event: Event) -> Result<EventId, RepositoryError> {
            Ok(EventId("unused".to_owned()))
        }

        async fn get_event(&self, _id: &EventId) -> Result<Option<Event>, RepositoryError> {
            Ok(Some(self.event.clone()))
        }

        async fn list_events(
            &self,
            _team_id: &str,
            _from_date: &str,
        ) -> Result<Vec<Event>, RepositoryError> {
            Ok(vec![])
        }

        async fn join_event(&self, _id: &EventId, _user: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn leave_event(&self, _id: &EventId, _user: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn delete_event(&self, _id: &EventId, _author: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    struct Fixture {
        chat: Arc<RecordingChat>,
        responder: Arc<RecordingResponder>,
        repository: Arc<InMemoryEventRepository>,
        handler: EventLifecycleHandler,
    }

    fn place(id: &str, name: &str) -> PlaceRecord {
        PlaceRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            address: "1 Test Square".to_owned(),
            rating: Some(4.5),
            open_now: Some(true),
            ..PlaceRecord::default()
        }
    }

    fn fixture_with_places(records: Vec<PlaceRecord>) -> Fixture {
        let chat = Arc::new(RecordingChat::default());
        let responder = Arc::new(RecordingResponder::default());
        let repository = Arc::new(InMemoryEventRepository::new());
        let handler = EventLifecycleHandler::new(
            "T1",
            "general",
            chat.clone(),
            responder.clone(),
            repository.clone(),
            Arc::new(StubPlaces { records }),
            3,
        );
        Fixture { chat, responder, repository, handler }
    }

    fn fixture() -> Fixture {
        fixture_with_places(vec![place("place_1", "Test Bistro")])
    }

    fn event(author: &str, participants: Vec<String>) -> Event {
        Event::new(
            "T1",
            "2030-05-11",
            "18:00",
            PlaceSummary::named("Test Place"),
            Some("Team dinner".to_owned()),
            Some(participants),
            Some(author.to_owned()),
        )
    }

    async fn seeded(fixture: &Fixture, author: &str, participants: Vec<String>) -> String {
        let ids = fixture.repository.seed(vec![event(author, participants)]).await;
        ids[0].0.clone()
    }

    fn ephemeral_texts(fixture: &Fixture) -> Vec<String> {
        fixture
            .chat
            .ephemeral
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, _, text)| text.clone())
            .collect()
    }

    fn responded_texts(fixture: &Fixture) -> Vec<String> {
        fixture
            .responder
            .responded
            .lock()
            .expect("lock")
            .iter()
            .map(|message| message.fallback_text.clone())
            .collect()
    }

    #[tokio::test]
    async fn join_success_sends_confirmation() {
        let fixture = fixture();
        let id = seeded(&fixture, "U1", vec![]).await;

        let outcome = fixture
            .handler
            .join_event("U2", Some(&id), Some("C1"))
            .await
            .expect("join");

        assert_eq!(outcome, LifecycleOutcome::Success);
        assert_eq!(ephemeral_texts(&fixture), vec![JOIN_SUCCESS.to_owned()]);
    }

    #[tokio::test]
    async fn join_twice_fails_with_oops() {
        let fixture = fixture();
        let id = seeded(&fixture, "U1", vec!["U2".to_owned()]).await;

        let outcome = fixture
            .handler
            .join_event("U2", Some(&id), Some("C1"))
            .await
            .expect("join");

        assert_eq!(outcome, LifecycleOutcome::Failure(JOIN_FAILURE.to_owned()));
        assert_eq!(ephemeral_texts(&fixture), vec![JOIN_FAILURE.to_owned()]);
    }

    #[tokio::test]
    async fn join_without_event_id_short_circuits() {
        let fixture = fixture();

        let outcome = fixture.handler.join_event("U2", None, Some("C1")).await.expect("join");

        assert_eq!(outcome, LifecycleOutcome::NotApplicable(NO_EVENT_ON_DAY.to_owned()));
        assert!(ephemeral_texts(&fixture).is_empty());
        assert!(fixture.chat.public.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn leave_removes_a_participant() {
        let fixture = fixture();
        let id = seeded(&fixture, "U1", vec!["U2".to_owned()]).await;

        let outcome = fixture
            .handler
            .leave_event(Some(&id), "U2", Some("C1"))
            .await
            .expect("leave");

        assert_eq!(outcome, LifecycleOutcome::Success);
        assert_eq!(ephemeral_texts(&fixture), vec![LEAVE_SUCCESS.to_owned()]);
    }

    #[tokio::test]
    async fn leave_when_not_joined_fails() {
        let fixture = fixture();
        let id = seeded(&fixture, "U1", vec![]).await;

        let outcome = fixture
            .handler
            .leave_event(Some(&id), "U2", Some("C1"))
            .await
            .expect("leave");

        assert_eq!(outcome, LifecycleOutcome::Failure(LEAVE_FAILURE.to_owned()));
        assert_eq!(ephemeral_texts(&fixture), vec![LEAVE_FAILURE.to_owned()]);
    }

    #[tokio::test]
    async fn delete_of_missing_event_is_reported() {
        let fixture = fixture();

        let outcome = fixture
            .handler
            .delete_event(Some("ghost"), "U1", Some("C1"))
            .await
            .expect("delete");

        assert_eq!(outcome, LifecycleOutcome::Failure("Event not found.".to_owned()));
        assert_eq!(ephemeral_texts(&fixture), vec![DELETE_MISSING.to_owned()]);
    }

    #[tokio::test]
    async fn delete_by_non_author_is_denied() {
        let fixture = fixture();
        let id = seeded(&fixture, "U_author", vec![]).await;

        let outcome = fixture
            .handler
            .delete_event(Some(&id), "U_other", Some("C1"))
            .await
            .expect("delete");

        assert_eq!(
            outcome,
            LifecycleOutcome::Failure("Unauthorized to delete the event.".to_owned())
        );
        assert_eq!(ephemeral_texts(&fixture), vec![DELETE_UNAUTHORIZED.to_owned()]);
        assert!(
            fixture.repository.get_event(&EventId(id)).await.expect("get").is_some(),
            "denied delete must leave the event in place"
        );
    }

    #[tokio::test]
    async fn delete_by_author_announces_publicly() {
        let fixture = fixture();
        let id = seeded(&fixture, "U_author", vec![]).await;

        let outcome = fixture
            .handler
            .delete_event(Some(&id), "U_author", Some("C1"))
            .await
            .expect("delete");

        assert_eq!(outcome, LifecycleOutcome::Success);
        assert!(ephemeral_texts(&fixture).is_empty());
        let said = fixture.responder.said.lock().expect("lock");
        assert_eq!(said.len(), 1);
        // The recap names the deleted event fully: location, date and time.
        assert!(said[0].fallback_text.contains("<@U_author> deleted the event"));
        assert!(said[0].fallback_text.contains("Test Place"));
        assert!(said[0].fallback_text.contains("2030-05-11"));
        assert!(said[0].fallback_text.contains("18:00"));
    }

    #[tokio::test]
    async fn delete_lost_to_storage_is_a_distinct_failure() {
        let chat = Arc::new(RecordingChat::default());
        let responder = Arc::new(RecordingResponder::default());
        let handler = EventLifecycleHandler::new(
            "T1",
            "general",
            chat.clone(),
            responder,
            Arc::new(LostDeleteRepository { event: event("U1", vec![]) }),
            Arc::new(StubPlaces::default()),
            3,
        );

        let outcome = handler.delete_event(Some("ev-1"), "U1", Some("C1")).await.expect("delete");

        assert_eq!(outcome, LifecycleOutcome::Failure("Failed to delete the event.".to_owned()));
        let texts: Vec<String> = chat
            .ephemeral
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, _, text)| text.clone())
            .collect();
        assert_eq!(texts, vec![DELETE_FAILED.to_owned()]);
    }

    #[tokio::test]
    async fn create_without_trigger_sends_corrective_reply() {
        let fixture = fixture();

        let outcome = fixture.handler.create_event(None, "C1").await.expect("create");

        assert!(matches!(outcome, LifecycleOutcome::NotApplicable(_)));
        assert!(fixture.chat.opened_views.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn create_opens_the_dialog_and_confirms() {
        let fixture = fixture();

        let outcome =
            fixture.handler.create_event(Some("trigger-1"), "C1").await.expect("create");

        assert_eq!(outcome, LifecycleOutcome::Success);
        let opened = fixture.chat.opened_views.lock().expect("lock");
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].0, "trigger-1");
        assert!(opened[0].1.callback_id.starts_with("create_event_dialog|"));
        drop(opened);
        assert_eq!(responded_texts(&fixture), vec![FOLLOW_DIALOG.to_owned()]);
    }

    #[tokio::test]
    async fn suggest_without_area_asks_for_a_location() {
        let fixture = fixture();

        let outcome = fixture
            .handler
            .suggest_event(None, "U1", Some("C1"))
            .await
            .expect("suggest");

        assert_eq!(outcome, LifecycleOutcome::NotApplicable(SPECIFY_LOCATION.to_owned()));
        assert_eq!(ephemeral_texts(&fixture), vec![SPECIFY_LOCATION.to_owned()]);
        assert!(responded_texts(&fixture).is_empty());
    }

    #[tokio::test]
    async fn suggest_replies_with_bounded_place_cards() {
        let records: Vec<PlaceRecord> =
            (0..5).map(|index| place(&format!("place_{index}"), &format!("Place {index}"))).collect();
        let fixture = fixture_with_places(records);

        let outcome = fixture
            .handler
            .suggest_event(Some("helsinki"), "U1", Some("C1"))
            .await
            .expect("suggest");

        assert_eq!(outcome, LifecycleOutcome::Success);
        let responded = fixture.responder.responded.lock().expect("lock");
        assert_eq!(responded.len(), 1);
        let headers = responded[0]
            .blocks
            .iter()
            .filter(|block| matches!(block, Block::Header { .. }))
            .count();
        assert_eq!(headers, 3);
        let create_actions = responded[0]
            .blocks
            .iter()
            .filter(|block| {
                matches!(block, Block::Actions { elements }
                    if elements[0].action_id == CREATE_EVENT_SUGGEST_ACTION)
            })
            .count();
        assert_eq!(create_actions, 3);
    }

    #[tokio::test]
    async fn suggest_with_zero_results_is_a_valid_empty_reply() {
        let fixture = fixture_with_places(vec![]);

        let outcome = fixture
            .handler
            .suggest_event(Some("nowhere"), "U1", Some("C1"))
            .await
            .expect("suggest");

        assert_eq!(outcome, LifecycleOutcome::Success);
        let responded = fixture.responder.responded.lock().expect("lock");
        assert_eq!(responded.len(), 1);
        assert!(responded[0].blocks.is_empty());
    }

    #[tokio::test]
    async fn list_without_events_reports_nothing_planned() {
        let fixture = fixture();

        let outcome = fixture.handler.list_events().await.expect("list");

        assert_eq!(outcome, LifecycleOutcome::Success);
        assert_eq!(responded_texts(&fixture), vec![NO_UPCOMING_EVENT.to_owned()]);
    }

    #[tokio::test]
    async fn list_renders_each_upcoming_event() {
        let fixture = fixture();
        seeded(&fixture, "U1", vec![]).await;

        fixture.handler.list_events().await.expect("list");

        let responded = fixture.responder.responded.lock().expect("lock");
        assert_eq!(responded.len(), 1);
        assert!(responded[0].blocks.iter().any(|block| matches!(block, Block::Actions { .. })));
    }

    #[tokio::test]
    async fn empty_and_unknown_commands_get_usage_hints() {
        let fixture = fixture();

        let empty = fixture
            .handler
            .handle_command(&SlashCommandPayload {
                command: "/event".to_owned(),
                text: String::new(),
                team_id: "T1".to_owned(),
                channel_id: "C1".to_owned(),
                user_id: "U1".to_owned(),
                trigger_id: None,
            })
            .await
            .expect("command");
        assert!(matches!(empty, LifecycleOutcome::NotApplicable(message) if message.starts_with("No command given, ")));

        let unknown = fixture
            .handler
            .handle_command(&SlashCommandPayload {
                command: "/event".to_owned(),
                text: "dance".to_owned(),
                team_id: "T1".to_owned(),
                channel_id: "C1".to_owned(),
                user_id: "U1".to_owned(),
                trigger_id: None,
            })
            .await
            .expect("command");
        assert!(matches!(unknown, LifecycleOutcome::NotApplicable(message) if message.starts_with("Invalid command given, ")));

        assert_eq!(responded_texts(&fixture).len(), 2);
    }

    #[tokio::test]
    async fn ephemeral_send_is_a_noop_without_full_coordinates() {
        let fixture = fixture();

        fixture.handler.send_ephemeral_message("hi", None, Some("C1")).await.expect("send");
        fixture.handler.send_ephemeral_message("hi", Some("U1"), None).await.expect("send");
        assert!(ephemeral_texts(&fixture).is_empty());

        fixture.handler.send_ephemeral_message("hi", Some("U1"), Some("C1")).await.expect("send");
        assert_eq!(ephemeral_texts(&fixture), vec!["hi".to_owned()]);
    }

    #[tokio::test]
    async fn home_view_is_always_typed_home() {
        let fixture = fixture();

        let empty_view = fixture.handler.show_events_view().await.expect("view");
        assert_eq!(empty_view.kind, "home");
        assert!(!empty_view.blocks.is_empty());

        seeded(&fixture, "U1", vec![]).await;
        let view = fixture.handler.show_events_view().await.expect("view");
        assert_eq!(view.kind, "home");
        assert!(view.blocks.iter().any(|block| matches!(block, Block::Actions { .. })));
    }

    #[tokio::test]
    async fn update_events_view_without_user_is_a_noop() {
        let fixture = fixture();

        fixture.handler.update_events_view(None).await.expect("update");

        assert!(fixture.chat.published_homes.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn interactive_join_refreshes_the_home_view() {
        let fixture = fixture();
        let id = seeded(&fixture, "U1", vec![]).await;

        let payload = InteractionPayload::from_json(&json!({
            "type": "block_actions",
            "team": { "id": "T1" },
            "user": { "id": "U2" },
            "container": { "channel_id": "C1" },
            "actions": [{ "action_id": "join_event", "value": id }]
        }));

        let outcome = fixture.handler.handle_interaction(&payload).await.expect("interaction");

        assert_eq!(outcome, LifecycleOutcome::Success);
        let homes = fixture.chat.published_homes.lock().expect("lock");
        assert_eq!(homes.len(), 1);
        assert_eq!(homes[0].0, "U2");
        assert_eq!(homes[0].1.kind, "home");
    }

    #[tokio::test]
    async fn dialog_submission_creates_and_announces_the_event() {
        let fixture = fixture();

        let payload = InteractionPayload::from_json(&json!({
            "type": "view_submission",
            "team": { "id": "T1" },
            "user": { "id": "U9" },
            "view": {
                "callback_id": "create_event_dialog|C7",
                "state": {
                    "values": {
                        "event_day": { "event_day": { "selected_date": "2030-05-11" } },
                        "event_time": { "event_time": { "selected_time": "18:00" } },
                        "suggest_place": {
                            "suggest_place": { "selected_option": { "value": "place_1" } }
                        },
                        "description": { "description": { "value": "Team dinner" } }
                    }
                }
            }
        }));

        let outcome = fixture.handler.handle_interaction(&payload).await.expect("interaction");

        assert_eq!(outcome, LifecycleOutcome::Success);

        let stored = fixture.repository.list_events("T1", "2030-05-11").await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].author.as_deref(), Some("U9"));
        assert_eq!(stored[0].location.name, "Test Bistro");

        let public = fixture.chat.public.lock().expect("lock");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].0, "C7");
        assert!(public[0].1.fallback_text.starts_with("New event:"));

        drop(public);
        assert_eq!(fixture.chat.published_homes.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn create_from_input_fails_without_a_resolvable_place() {
        let fixture = fixture_with_places(vec![]);

        let result = fixture
            .handler
            .create_event_from_input(CreateEventInput {
                date: "2030-05-11".to_owned(),
                time: "18:00".to_owned(),
                place_id: "ghost".to_owned(),
                author: "U1".to_owned(),
                channel_id: "C1".to_owned(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(HandlerError::Place(_))));
        assert!(fixture.chat.public.lock().expect("lock").is_empty());
        assert!(
            fixture.repository.list_events("T1", "2030-05-11").await.expect("list").is_empty(),
            "no ghost event may be persisted"
        );
    }

    #[tokio::test]
    async fn create_from_input_rejects_a_malformed_date() {
        let fixture = fixture();

        let result = fixture
            .handler
            .create_event_from_input(CreateEventInput {
                date: "11.05.2030".to_owned(),
                time: "18:00".to_owned(),
                place_id: "place_1".to_owned(),
                author: "U1".to_owned(),
                channel_id: "C1".to_owned(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(HandlerError::Domain(_))));
        assert!(fixture.chat.public.lock().expect("lock").is_empty());
    }
}
