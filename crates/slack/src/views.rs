//! View rendering: the events home tab, per-event announcement blocks, and
//! the event-creation modal.

use gather_core::domain::event::Event;

use crate::blocks::{
    Block, ButtonElement, ButtonStyle, HomeView, InputElement, MessageBuilder, ModalView,
    OptionObject, TextObject,
};

pub const JOIN_EVENT_ACTION: &str = "join_event";
pub const LEAVE_EVENT_ACTION: &str = "leave_event";
pub const DELETE_EVENT_ACTION: &str = "delete_event";
pub const CREATE_EVENT_DIALOG_CALLBACK: &str = "create_event_dialog";

pub const EVENT_DAY_BLOCK: &str = "event_day";
pub const EVENT_TIME_BLOCK: &str = "event_time";
pub const SUGGEST_PLACE_BLOCK: &str = "suggest_place";
pub const DESCRIPTION_BLOCK: &str = "description";

/// Blocks for one event: summary section plus the join/leave/delete action
/// row keyed by the event's identity.
pub fn event_message_blocks(event: &Event) -> Vec<Block> {
    let mut summary = format!(
        "*When:* {} at {}\n*Where:* {}",
        event.date, event.time, event.location.name
    );
    if let Some(address) = event.location.address.as_deref() {
        summary.push_str(&format!("\n*Address:* {address}"));
    }
    if event.participants.is_empty() {
        summary.push_str("\n*Who:* nobody yet");
    } else {
        let mentions: Vec<String> =
            event.participants.iter().map(|user| format!("<@{user}>")).collect();
        summary.push_str(&format!("\n*Who:* {}", mentions.join(", ")));
    }
    if let Some(description) = event.description.as_deref() {
        summary.push_str(&format!("\n{description}"));
    }

    let event_id = event.id.as_ref().map(|id| id.0.clone()).unwrap_or_default();
    MessageBuilder::new(event.to_string())
        .section(move |section| {
            section.mrkdwn(summary);
        })
        .actions(|actions| {
            actions
                .button(
                    ButtonElement::new(JOIN_EVENT_ACTION, "Join")
                        .style(ButtonStyle::Primary)
                        .value(event_id.clone()),
                )
                .button(ButtonElement::new(LEAVE_EVENT_ACTION, "Leave").value(event_id.clone()))
                .button(
                    ButtonElement::new(DELETE_EVENT_ACTION, "Delete")
                        .style(ButtonStyle::Danger)
                        .value(event_id.clone()),
                );
        })
        .build()
        .blocks
}

/// The App Home document. Always `type == "home"` with a `blocks` sequence,
/// whether or not any events exist.
pub fn events_home_view(events: &[Event]) -> HomeView {
    let mut blocks = vec![Block::Header { text: TextObject::plain("Upcoming events") }];

    if events.is_empty() {
        blocks.push(Block::Section {
            text: Some(TextObject::mrkdwn(
                "There is no upcoming event planned. Try `/event create`!",
            )),
            fields: None,
        });
    } else {
        for event in events {
            blocks.push(Block::Divider);
            blocks.extend(event_message_blocks(event));
        }
    }

    HomeView { kind: "home", blocks }
}

/// The event-creation modal. The announce channel rides along in the
/// callback id so the submission knows where to post.
pub fn create_event_modal(channel_id: &str, place: Option<OptionObject>) -> ModalView {
    ModalView {
        kind: "modal",
        callback_id: format!("{CREATE_EVENT_DIALOG_CALLBACK}|{channel_id}"),
        title: TextObject::plain("Plan an event"),
        submit: TextObject::plain("Create"),
        close: TextObject::plain("Cancel"),
        blocks: vec![
            Block::Input {
                block_id: EVENT_DAY_BLOCK.to_owned(),
                label: TextObject::plain("Day"),
                element: InputElement::Datepicker {
                    action_id: EVENT_DAY_BLOCK.to_owned(),
                    placeholder: TextObject::plain("Select a day"),
                    initial_date: None,
                },
                optional: None,
            },
            Block::Input {
                block_id: EVENT_TIME_BLOCK.to_owned(),
                label: TextObject::plain("Time"),
                element: InputElement::Timepicker {
                    action_id: EVENT_TIME_BLOCK.to_owned(),
                    placeholder: TextObject::plain("Select a time"),
                    initial_time: None,
                },
                optional: None,
            },
            Block::Input {
                block_id: SUGGEST_PLACE_BLOCK.to_owned(),
                label: TextObject::plain("Place"),
                element: InputElement::ExternalSelect {
                    action_id: SUGGEST_PLACE_BLOCK.to_owned(),
                    placeholder: TextObject::plain("Search for a place"),
                    min_query_length: 3,
                    initial_option: place,
                },
                optional: None,
            },
            Block::Input {
                block_id: DESCRIPTION_BLOCK.to_owned(),
                label: TextObject::plain("Description"),
                element: InputElement::PlainTextInput {
                    action_id: DESCRIPTION_BLOCK.to_owned(),
                    placeholder: TextObject::plain("What is the occasion?"),
                    multiline: true,
                },
                optional: Some(true),
            },
        ],
    }
}
