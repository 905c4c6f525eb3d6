//! Slash-command payload and verb parsing.
//!
//! The dispatch table is closed: `list`, `create`, `suggest`. Everything
//! else is answered with a usage hint by the handler.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub team_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventCommand {
    List,
    Create,
    /// `area` is the remaining tokens joined, absent when the user gave
    /// only the verb.
    Suggest { area: Option<String> },
    Empty,
    Unknown { verb: String },
}

pub const USAGE: &str = "Usage: `/event list` | `/event create` | `/event suggest <area>`";

pub fn parse_event_command(text: &str) -> EventCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return EventCommand::Empty;
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest = parts.collect::<Vec<_>>().join(" ");

    match verb.as_str() {
        "list" => EventCommand::List,
        "create" => EventCommand::Create,
        "suggest" => {
            EventCommand::Suggest { area: if rest.is_empty() { None } else { Some(rest) } }
        }
        _ => EventCommand::Unknown { verb },
    }
}
