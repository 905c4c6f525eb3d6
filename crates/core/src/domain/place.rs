use serde::{Deserialize, Serialize};

/// A raw place record as returned by the place-search collaborator.
///
/// `rating` distinguishes "the API reported 0.0" from "the API reported
/// nothing": the former stays `Some(0.0)`, the latter is `None`. Downstream
/// rendering relies on that distinction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub price_level: Option<u8>,
    pub types: Vec<String>,
    pub website_uri: Option<String>,
    pub google_maps_uri: Option<String>,
    pub icon_uri: Option<String>,
    pub business_status: Option<String>,
    pub open_now: Option<bool>,
    pub weekday_hours: Vec<String>,
}

/// Storage-ready flattening of a place record, used as an event's location.
///
/// Manually created events only carry a `name`; every other field is
/// optional so a bare `{ "name": ... }` mapping round-trips unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
}

impl PlaceSummary {
    /// A location that is just a name, for events created without a place
    /// lookup.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn from_record(record: &PlaceRecord) -> Self {
        Self {
            name: record.name.clone(),
            address: Some(record.address.clone()),
            rating: record.rating,
            price_level: record.price_level,
            types: record.types.clone(),
            place_id: Some(record.id.clone()),
            website_uri: record.website_uri.clone(),
            business_status: record.business_status.clone(),
            google_maps_url: record.google_maps_uri.clone(),
        }
    }
}
