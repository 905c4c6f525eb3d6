//! Typed envelope over raw interactive payloads.
//!
//! Interactivity arrives as one large JSON document; it is parsed here
//! exactly once, at the boundary, so the handler only ever sees typed data.

use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionPayload {
    BlockAction(BlockAction),
    ViewSubmission(ViewSubmission),
    Unsupported { kind: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockAction {
    pub action_id: String,
    pub value: Option<String>,
    pub team_id: String,
    pub user_id: String,
    pub channel_id: Option<String>,
    pub trigger_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSubmission {
    pub callback_id: String,
    pub team_id: String,
    pub user_id: String,
    pub state: ViewStateValues,
}

/// The creation dialog's extracted input state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewStateValues {
    pub date: Option<String>,
    pub time: Option<String>,
    pub place_id: Option<String>,
    pub description: Option<String>,
}

fn string_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

impl InteractionPayload {
    pub fn from_json(payload: &Value) -> Self {
        let kind = payload.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "block_actions" => Self::block_action(payload),
            "view_submission" => Self::view_submission(payload),
            other => Self::Unsupported { kind: other.to_owned() },
        }
    }

    fn block_action(payload: &Value) -> Self {
        let action = payload.get("actions").and_then(|actions| actions.get(0));
        let action_id = action
            .and_then(|action| action.get("action_id"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        Self::BlockAction(BlockAction {
            action_id: action_id.to_owned(),
            value: action
                .and_then(|action| action.get("value"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            team_id: string_at(payload, &["team", "id"]).unwrap_or_default().to_owned(),
            user_id: string_at(payload, &["user", "id"]).unwrap_or_default().to_owned(),
            channel_id: string_at(payload, &["container", "channel_id"]).map(str::to_owned),
            trigger_id: string_at(payload, &["trigger_id"]).map(str::to_owned),
        })
    }

    fn view_submission(payload: &Value) -> Self {
        let values = payload.pointer("/view/state/values").cloned().unwrap_or(Value::Null);

        Self::ViewSubmission(ViewSubmission {
            callback_id: string_at(payload, &["view", "callback_id"])
                .unwrap_or_default()
                .to_owned(),
            team_id: string_at(payload, &["team", "id"]).unwrap_or_default().to_owned(),
            user_id: string_at(payload, &["user", "id"]).unwrap_or_default().to_owned(),
            state: ViewStateValues {
                date: string_at(&values, &["event_day", "event_day", "selected_date"])
                    .map(str::to_owned),
                time: string_at(&values, &["event_time", "event_time", "selected_time"])
                    .map(str::to_owned),
                place_id: string_at(
                    &values,
                    &["suggest_place", "suggest_place", "selected_option", "value"],
                )
                .map(str::to_owned),
                description: string_at(&values, &["description", "description", "value"])
                    .map(str::to_owned),
            },
        })
    }
}
