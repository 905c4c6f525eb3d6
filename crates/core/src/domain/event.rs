use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::place::PlaceSummary;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A planned team event.
///
/// `id` is `None` until the persistence collaborator assigns one on insert.
/// `participants` is always a concrete list; constructors normalize absent
/// input to empty rather than carrying an optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<EventId>,
    pub team_id: String,
    pub date: String,
    pub time: String,
    pub location: PlaceSummary,
    pub description: Option<String>,
    pub participants: Vec<String>,
    pub author: Option<String>,
}

impl Event {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team_id: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        location: PlaceSummary,
        description: Option<String>,
        participants: Option<Vec<String>>,
        author: Option<String>,
    ) -> Self {
        Self {
            id: None,
            team_id: team_id.into(),
            date: date.into(),
            time: time.into(),
            location,
            description,
            participants: participants.unwrap_or_default(),
            author,
        }
    }

    /// Validates the calendar fields. The chat platform's pickers already
    /// constrain these, so this only guards hand-built documents.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !crate::dates::is_day_formatted_as_date(&self.date) {
            return Err(DomainError::InvalidDate { value: self.date.clone() });
        }
        Ok(())
    }

    /// Storage representation; the identity field is excluded by design and
    /// reattached by the repository on read.
    pub fn to_document(&self) -> EventDocument {
        EventDocument {
            team_id: self.team_id.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            participants: self.participants.clone(),
            author: self.author.clone(),
        }
    }

    pub fn from_document(id: Option<EventId>, document: EventDocument) -> Self {
        Self {
            id,
            team_id: document.team_id,
            date: document.date,
            time: document.time,
            location: document.location,
            description: document.description,
            participants: document.participants,
            author: document.author,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} ({} joined)",
            self.date,
            self.time,
            self.location.name,
            self.participants.len()
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    pub team_id: String,
    pub date: String,
    pub time: String,
    pub location: PlaceSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}
