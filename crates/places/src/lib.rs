//! Place-search capability interface and the Google Places v1 client.
//!
//! The handler only sees the [`PlaceSearch`] trait; the reqwest-backed
//! [`GooglePlacesClient`] lives in [`google`] and tests substitute their own
//! implementations.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use gather_core::domain::place::PlaceRecord;

pub mod google;

pub use google::GooglePlacesClient;

#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("place api transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("place api returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("place `{0}` not found")]
    NotFound(String),
}

/// Text search and detail lookup against the place provider.
///
/// `search_text` returning an empty list is a valid "no suggestions"
/// outcome, never an error.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_text(&self, query: &str) -> Result<Vec<PlaceRecord>, PlaceError>;

    async fn get_place(&self, place_id: &str) -> Result<PlaceRecord, PlaceError>;
}

/// One option of an external-select menu, as the chat platform expects it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectOption {
    pub text: SelectOptionText,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectOptionText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Maps search results onto external-select options, one per place, with
/// the place identity as the option value.
pub fn place_options(records: &[PlaceRecord]) -> Vec<SelectOption> {
    records
        .iter()
        .map(|record| SelectOption {
            text: SelectOptionText { kind: "plain_text", text: record.name.clone() },
            value: record.id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use gather_core::domain::place::PlaceRecord;

    use super::place_options;

    #[test]
    fn place_options_carry_name_and_identity() {
        let records = vec![
            PlaceRecord {
                id: "place_a".to_owned(),
                name: "First Place".to_owned(),
                ..PlaceRecord::default()
            },
            PlaceRecord {
                id: "place_b".to_owned(),
                name: "Second Place".to_owned(),
                ..PlaceRecord::default()
            },
        ];

        let options = place_options(&records);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].text.text, "First Place");
        assert_eq!(options[0].value, "place_a");

        let json = serde_json::to_value(&options[1]).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "text": { "type": "plain_text", "text": "Second Place" },
                "value": "place_b"
            })
        );
    }

    #[test]
    fn place_options_of_nothing_is_empty() {
        assert!(place_options(&[]).is_empty());
    }
}
