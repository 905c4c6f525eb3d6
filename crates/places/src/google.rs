//! Google Places API (New) client.
//!
//! Two endpoints: `places:searchText` for free-text area search and
//! `places/{id}` for detail lookup. Both require an API key header and an
//! explicit field mask; fields left out of the mask come back absent, which
//! is why every response field below is optional.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gather_core::config::PlacesConfig;
use gather_core::domain::place::PlaceRecord;

use crate::{PlaceError, PlaceSearch};

const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.rating,places.priceLevel,places.types,places.websiteUri,places.googleMapsUri,\
places.iconMaskBaseUri,places.businessStatus,places.currentOpeningHours";

const DETAIL_FIELD_MASK: &str = "id,displayName,formattedAddress,rating,priceLevel,types,\
websiteUri,googleMapsUri,iconMaskBaseUri,businessStatus,currentOpeningHours";

pub struct GooglePlacesClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self, PlaceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlaceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PlaceError::Api { status: status.as_u16(), body })
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn search_text(&self, query: &str) -> Result<Vec<PlaceRecord>, PlaceError> {
        let url = format!("{}/v1/places:searchText", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", self.api_key.expose_secret())
            .header("X-Goog-FieldMask", SEARCH_FIELD_MASK)
            .json(&SearchTextRequest { text_query: query })
            .send()
            .await?;
        let response = Self::check(response).await?;

        let body: SearchTextResponse = response.json().await?;
        let places = body.places.unwrap_or_default();
        debug!(query, results = places.len(), "place text search completed");

        Ok(places.into_iter().map(PlaceResponse::into_record).collect())
    }

    async fn get_place(&self, place_id: &str) -> Result<PlaceRecord, PlaceError> {
        let url = format!("{}/v1/places/{place_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Goog-Api-Key", self.api_key.expose_secret())
            .header("X-Goog-FieldMask", DETAIL_FIELD_MASK)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PlaceError::NotFound(place_id.to_owned()));
        }
        let response = Self::check(response).await?;

        let place: PlaceResponse = response.json().await?;
        Ok(place.into_record())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
}

#[derive(Deserialize)]
struct SearchTextResponse {
    // Absent entirely when the search matched nothing.
    places: Option<Vec<PlaceResponse>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<LocalizedText>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    price_level: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    website_uri: Option<String>,
    #[serde(default)]
    google_maps_uri: Option<String>,
    #[serde(default)]
    icon_mask_base_uri: Option<String>,
    #[serde(default)]
    business_status: Option<String>,
    #[serde(default)]
    current_opening_hours: Option<OpeningHours>,
}

#[derive(Deserialize)]
struct LocalizedText {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
    #[serde(default)]
    weekday_descriptions: Vec<String>,
}

fn price_level_rank(raw: &str) -> Option<u8> {
    match raw {
        "PRICE_LEVEL_FREE" => Some(0),
        "PRICE_LEVEL_INEXPENSIVE" => Some(1),
        "PRICE_LEVEL_MODERATE" => Some(2),
        "PRICE_LEVEL_EXPENSIVE" => Some(3),
        "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
        _ => None,
    }
}

impl PlaceResponse {
    fn into_record(self) -> PlaceRecord {
        let (open_now, weekday_hours) = match self.current_opening_hours {
            Some(hours) => (hours.open_now, hours.weekday_descriptions),
            None => (None, Vec::new()),
        };
        PlaceRecord {
            id: self.id.unwrap_or_default(),
            name: self.display_name.map(|name| name.text).unwrap_or_default(),
            address: self.formatted_address.unwrap_or_default(),
            rating: self.rating,
            price_level: self.price_level.as_deref().and_then(price_level_rank),
            types: self.types,
            website_uri: self.website_uri,
            google_maps_uri: self.google_maps_uri,
            icon_uri: self.icon_mask_base_uri,
            business_status: self.business_status,
            open_now,
            weekday_hours,
        }
    }
}
