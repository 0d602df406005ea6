//! Client for the Ticketmaster Discovery API.
//!
//! Each call performs exactly one GET and decodes the body into the raw
//! upstream record types below. Turning those records into catalog rows is
//! the reconciler's job.

use crate::config::TicketmasterConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Failures talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Ticketmaster rejected the API key")]
    Auth,

    #[error("Ticketmaster unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed Ticketmaster response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        Self::Unavailable(err.without_url().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventStart {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(rename = "localDate")]
    pub local_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDates {
    pub start: Option<EventStart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEmbedded {
    #[serde(default)]
    pub attractions: Vec<NamedRef>,
    #[serde(default)]
    pub venues: Vec<NamedRef>,
}

/// One event as returned by `events.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    pub name: Option<String>,
    pub dates: Option<EventDates>,
    #[serde(rename = "_embedded", default)]
    pub embedded: EventEmbedded,
}

impl EventRecord {
    #[must_use]
    pub fn start_date_time(&self) -> Option<&str> {
        self.dates
            .as_ref()
            .and_then(|d| d.start.as_ref())
            .and_then(|s| s.date_time.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateRef {
    pub name: Option<String>,
    #[serde(rename = "stateCode")]
    pub state_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressRef {
    pub line1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRef {
    pub ratio: Option<String>,
    pub url: Option<String>,
}

/// One venue as returned by `venues.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueRecord {
    pub name: Option<String>,
    pub city: Option<NamedRef>,
    pub state: Option<StateRef>,
    pub address: Option<AddressRef>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(rename = "_embedded")]
    embedded: EventsEmbedded,
}

#[derive(Debug, Deserialize)]
struct EventsEmbedded {
    events: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
struct VenuesPage {
    #[serde(rename = "_embedded")]
    embedded: VenuesEmbedded,
}

#[derive(Debug, Deserialize)]
struct VenuesEmbedded {
    venues: Vec<VenueRecord>,
}

/// Where reconciliation passes get their raw records from.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches music events for a designated market area.
    async fn fetch_events(
        &self,
        market_area: &str,
        genre: &str,
    ) -> Result<Vec<EventRecord>, SourceError>;

    /// Fetches venues for a two-letter state code.
    async fn fetch_venues(
        &self,
        state_code: &str,
        genre: &str,
    ) -> Result<Vec<VenueRecord>, SourceError>;
}

#[derive(Clone)]
pub struct TicketmasterClient {
    client: Client,
    config: TicketmasterConfig,
}

impl TicketmasterClient {
    pub fn new(config: TicketmasterConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("lmn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build Ticketmaster HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &TicketmasterConfig {
        &self.config
    }

    /// Builds `<base_url><resource>?<params>&apikey=<key>`.
    pub fn build_url(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        api_key: &str,
    ) -> Result<Url, SourceError> {
        let mut base = self.config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let mut url = Url::parse(&base)
            .and_then(|u| u.join(resource))
            .map_err(|e| SourceError::Unavailable(format!("invalid base URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apikey", api_key);
        }

        Ok(url)
    }

    async fn get_body(&self, resource: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
        let api_key = self.config.resolve_api_key().unwrap_or_else(|| {
            warn!(
                "No Ticketmaster key configured (checked inline key and ${})",
                self.config.api_key_env
            );
            String::new()
        });

        let url = self.build_url(resource, params, &api_key)?;
        debug!(resource, ?params, "Querying Ticketmaster");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::Auth);
        }

        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "{resource} returned HTTP {status}"
            )));
        }

        Ok(response.text().await?)
    }
}

/// Decodes an `events.json` body.
pub fn decode_events(body: &str) -> Result<Vec<EventRecord>, SourceError> {
    serde_json::from_str::<EventsPage>(body)
        .map(|page| page.embedded.events)
        .map_err(|e| SourceError::MalformedResponse(format!("events: {e}")))
}

/// Decodes a `venues.json` body.
pub fn decode_venues(body: &str) -> Result<Vec<VenueRecord>, SourceError> {
    serde_json::from_str::<VenuesPage>(body)
        .map(|page| page.embedded.venues)
        .map_err(|e| SourceError::MalformedResponse(format!("venues: {e}")))
}

#[async_trait::async_trait]
impl EventSource for TicketmasterClient {
    async fn fetch_events(
        &self,
        market_area: &str,
        genre: &str,
    ) -> Result<Vec<EventRecord>, SourceError> {
        let body = self
            .get_body(
                "events.json",
                &[("classificationName", genre), ("dmaId", market_area)],
            )
            .await?;
        decode_events(&body)
    }

    async fn fetch_venues(
        &self,
        state_code: &str,
        genre: &str,
    ) -> Result<Vec<VenueRecord>, SourceError> {
        let body = self
            .get_body(
                "venues.json",
                &[("classificationName", genre), ("stateCode", state_code)],
            )
            .await?;
        decode_venues(&body)
    }
}
