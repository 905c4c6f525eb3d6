//! Display adapter over a raw place record.
//!
//! Pure accessors plus the block renderers used by the suggest reply and
//! the event announcement. Rating policy: a reported value is surfaced
//! verbatim, including a literal 0.0; only true absence renders as
//! "Not rated".

use serde::Serialize;

use gather_core::domain::place::PlaceRecord;

use crate::blocks::{Block, ButtonElement, ButtonStyle, MessageBuilder, MessageTemplate, TextObject};

pub const CREATE_EVENT_SUGGEST_ACTION: &str = "create_event_suggest";

/// A two-column field of the rendered place card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Color-coded open/closed status descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenStatus {
    pub color: &'static str,
    pub text: &'static str,
}

pub struct PlaceSuggestion<'a> {
    record: &'a PlaceRecord,
}

impl<'a> PlaceSuggestion<'a> {
    pub fn new(record: &'a PlaceRecord) -> Self {
        Self { record }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn address(&self) -> &str {
        &self.record.address
    }

    pub fn url(&self) -> Option<&str> {
        self.record.website_uri.as_deref()
    }

    pub fn directions_url(&self) -> Option<&str> {
        self.record.google_maps_uri.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.record.icon_uri.as_deref()
    }

    pub fn rating(&self) -> String {
        match self.record.rating {
            Some(rating) => format!("{rating}"),
            None => "Not rated".to_owned(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.record.open_now.unwrap_or(false)
    }

    pub fn opening_hours(&self) -> String {
        self.record.weekday_hours.join("\n")
    }

    pub fn format_field(title: impl Into<String>, value: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor { title: title.into(), value: value.into(), short: true }
    }

    pub fn format_open(&self) -> OpenStatus {
        if self.is_open() {
            OpenStatus { color: "good", text: "Open" }
        } else {
            OpenStatus { color: "danger", text: "Closed" }
        }
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        let open = self.format_open();
        let mut fields = vec![
            Self::format_field("Address", self.address()),
            Self::format_field("Rating", self.rating()),
        ];
        let hours = self.opening_hours();
        if !hours.is_empty() {
            fields.push(Self::format_field("Hours", hours));
        }
        fields.push(Self::format_field("Status", open.text));
        if !self.record.types.is_empty() {
            fields.push(Self::format_field("Types", self.record.types.join(", ")));
        }
        fields
    }

    /// The place card without actions: header, divider, two-column fields.
    pub fn format_card(&self) -> Vec<Block> {
        let field_texts: Vec<TextObject> = self
            .fields()
            .into_iter()
            .map(|field| TextObject::mrkdwn(format!("*{}*\n{}", field.title, field.value)))
            .collect();

        MessageBuilder::new(self.name().to_owned())
            .header(self.name())
            .divider()
            .section(move |section| {
                for field in field_texts {
                    section.field(field);
                }
            })
            .build()
            .blocks
    }

    /// The full place card: [`format_card`](Self::format_card) plus an
    /// actions row whose first element creates an event at this place.
    pub fn format_block(&self) -> Vec<Block> {
        let mut blocks = self.format_card();
        blocks.push(Block::Actions {
            elements: vec![
                ButtonElement::new(CREATE_EVENT_SUGGEST_ACTION, "Create event here")
                    .style(ButtonStyle::Primary)
                    .value(self.record.id.clone()),
            ],
        });
        blocks
    }
}

/// The suggest reply: up to `limit` place cards in API order, separated by
/// nothing; zero results yields an empty (still valid) block list.
pub fn suggestions_message(records: &[PlaceRecord], limit: usize) -> MessageTemplate {
    let mut builder = MessageBuilder::new("Place suggestions");
    for record in records.iter().take(limit) {
        builder = builder.extend(PlaceSuggestion::new(record).format_block());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use gather_core::domain::place::PlaceRecord;

    use super::{suggestions_message, PlaceSuggestion, CREATE_EVENT_SUGGEST_ACTION};
    use crate::blocks::{Block, TextObject};

    fn record() -> PlaceRecord {
        PlaceRecord {
            id: "place_1".to_owned(),
            name: "Test Bistro".to_owned(),
            address: "1 Test Square".to_owned(),
            rating: Some(4.5),
            price_level: Some(2),
            types: vec!["restaurant".to_owned()],
            website_uri: Some("https://bistro.example".to_owned()),
            google_maps_uri: Some("https://maps.example/place_1".to_owned()),
            icon_uri: Some("https://icons.example/food".to_owned()),
            business_status: Some("OPERATIONAL".to_owned()),
            open_now: Some(true),
            weekday_hours: vec!["Monday: 9 AM – 10 PM".to_owned()],
        }
    }

    #[test]
    fn format_field_is_a_short_two_column_descriptor() {
        let field = PlaceSuggestion::format_field("Rating", "4.5");
        assert_eq!(field.title, "Rating");
        assert_eq!(field.value, "4.5");
        assert!(field.short);
    }

    #[test]
    fn format_open_is_color_coded() {
        let record = record();
        let suggestion = PlaceSuggestion::new(&record);
        let open = suggestion.format_open();
        assert_eq!(open.color, "good");
        assert_eq!(open.text, "Open");

        let closed_record = PlaceRecord { open_now: Some(false), ..record.clone() };
        let closed = PlaceSuggestion::new(&closed_record).format_open();
        assert_eq!(closed.color, "danger");
        assert_eq!(closed.text, "Closed");

        let unknown_record = PlaceRecord { open_now: None, ..record };
        assert_eq!(PlaceSuggestion::new(&unknown_record).format_open().text, "Closed");
    }

    #[test]
    fn reported_zero_rating_is_surfaced_verbatim() {
        let zero = PlaceRecord { rating: Some(0.0), ..record() };
        assert_eq!(PlaceSuggestion::new(&zero).rating(), "0");

        let absent = PlaceRecord { rating: None, ..record() };
        assert_eq!(PlaceSuggestion::new(&absent).rating(), "Not rated");
    }

    #[test]
    fn format_block_is_header_divider_fields_actions() {
        let record = record();
        let blocks = PlaceSuggestion::new(&record).format_block();

        assert_eq!(blocks.len(), 4);
        assert!(matches!(
            &blocks[0],
            Block::Header { text: TextObject::PlainText { text } } if text == "Test Bistro"
        ));
        assert!(matches!(&blocks[1], Block::Divider));

        let fields = match &blocks[2] {
            Block::Section { fields: Some(fields), .. } => fields,
            other => panic!("expected fields section, got {other:?}"),
        };
        let rendered: Vec<&str> = fields.iter().map(TextObject::raw).collect();
        assert!(rendered.iter().any(|text| text.contains("*Address*\n1 Test Square")));
        assert!(rendered.iter().any(|text| text.contains("*Rating*\n4.5")));
        assert!(rendered.iter().any(|text| text.contains("*Status*\nOpen")));
        assert!(rendered.iter().any(|text| text.contains("*Types*\nrestaurant")));

        let elements = match &blocks[3] {
            Block::Actions { elements } => elements,
            other => panic!("expected actions row, got {other:?}"),
        };
        assert_eq!(elements[0].action_id, CREATE_EVENT_SUGGEST_ACTION);
        assert_eq!(elements[0].value.as_deref(), Some("place_1"));
    }

    #[test]
    fn suggestions_message_is_bounded_and_ordered() {
        let records: Vec<PlaceRecord> = (0..5)
            .map(|index| PlaceRecord {
                id: format!("place_{index}"),
                name: format!("Place {index}"),
                ..PlaceRecord::default()
            })
            .collect();

        let message = suggestions_message(&records, 3);
        let headers: Vec<&str> = message
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Header { text } => Some(text.raw()),
                _ => None,
            })
            .collect();
        assert_eq!(headers, vec!["Place 0", "Place 1", "Place 2"]);
    }

    #[test]
    fn zero_results_render_an_empty_reply() {
        let message = suggestions_message(&[], 3);
        assert!(message.blocks.is_empty());
    }
}
