//! Reconciliation passes: upstream records in, catalog rows out.
//!
//! Each pass walks one fetched collection in upstream order and stores
//! records one at a time. A record that cannot be stored is logged and
//! counted; it never stops the pass.

use crate::clients::ticketmaster::{EventRecord, VenueRecord};
use crate::db::{NewVenue, Store};
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Aspect-ratio tag of the venue image used as a thumbnail.
pub const THUMBNAIL_RATIO: &str = "3_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pass {
    Artists,
    Venues,
    Shows,
}

impl Pass {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Venues => "venues",
            Self::Shows => "shows",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single record was not stored.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("No {kind} named '{name}'")]
    ReferenceMissing { kind: &'static str, name: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl RecordError {
    /// Classifies a store failure, recognising unique-constraint violations.
    #[must_use]
    pub fn from_store(err: &anyhow::Error) -> Self {
        let unique = err
            .downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .and_then(|e| match e {
                SqlErr::UniqueConstraintViolation(msg) => Some(msg),
                _ => None,
            });

        match unique {
            Some(msg) => Self::Duplicate(msg),
            None => Self::Database(format!("{err:#}")),
        }
    }

    const fn outcome_label(&self) -> &'static str {
        match self {
            Self::Duplicate(_) => "duplicate",
            Self::ReferenceMissing { .. } => "missing_reference",
            Self::InvalidRecord(_) | Self::Database(_) => "failed",
        }
    }
}

/// Per-pass tally of record outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub pass: Pass,
    pub created: usize,
    pub duplicates: usize,
    pub missing_references: usize,
    pub failed: usize,
}

impl PassSummary {
    #[must_use]
    pub const fn new(pass: Pass) -> Self {
        Self {
            pass,
            created: 0,
            duplicates: 0,
            missing_references: 0,
            failed: 0,
        }
    }

    /// Records that were deliberately passed over (already present, or
    /// pointing at a missing artist/venue).
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.duplicates + self.missing_references
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.skipped() + self.failed
    }

    fn record(&mut self, label: &str, outcome: Result<(), RecordError>) {
        let outcome_label = match &outcome {
            Ok(()) => "created",
            Err(e) => e.outcome_label(),
        };
        metrics::counter!(
            "ingest_records_total",
            "pass" => self.pass.as_str(),
            "outcome" => outcome_label
        )
        .increment(1);

        match outcome {
            Ok(()) => self.created += 1,
            Err(RecordError::Duplicate(_)) => {
                self.duplicates += 1;
                info!(pass = %self.pass, record = label, "Already present, skipping");
            }
            Err(e @ RecordError::ReferenceMissing { .. }) => {
                self.missing_references += 1;
                warn!(pass = %self.pass, record = label, "Skipping record: {e}");
            }
            Err(e) => {
                self.failed += 1;
                warn!(pass = %self.pass, record = label, "Failed to store record: {e}");
            }
        }
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} created, {} duplicate, {} missing reference, {} failed",
            self.pass, self.created, self.duplicates, self.missing_references, self.failed
        )
    }
}

/// Attraction names of an event, in upstream order.
pub fn attraction_names(event: &EventRecord) -> impl Iterator<Item = Option<&str>> {
    event
        .embedded
        .attractions
        .iter()
        .map(|a| a.name.as_deref().map(str::trim).filter(|n| !n.is_empty()))
}

/// URL of the first `3_1` image, if any.
#[must_use]
pub fn thumbnail_url(record: &VenueRecord) -> Option<&str> {
    record
        .images
        .iter()
        .find(|img| img.ratio.as_deref() == Some(THUMBNAIL_RATIO))
        .and_then(|img| img.url.as_deref())
}

/// Trimmed record name for log lines, `<unnamed>` when blank.
fn record_label(name: Option<&str>) -> &str {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("<unnamed>")
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, RecordError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RecordError::InvalidRecord(format!("missing {field}")))
}

/// Maps a venue record onto a new venue row.
///
/// The two-letter `stateCode` is preferred; `state.name` is the fallback.
pub fn venue_from_record(
    record: &VenueRecord,
    default_thumbnail: &str,
) -> Result<NewVenue, RecordError> {
    let name = required(record.name.as_deref(), "name")?;
    let city = required(
        record.city.as_ref().and_then(|c| c.name.as_deref()),
        "city.name",
    )?;
    let state = record
        .state
        .as_ref()
        .and_then(|s| {
            s.state_code
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .or(s.name.as_deref())
        });
    let state = required(state, "state.name")?;

    let address = record
        .address
        .as_ref()
        .and_then(|a| a.line1.as_deref())
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(ToString::to_string);

    let thumbnail = thumbnail_url(record).unwrap_or(default_thumbnail).to_string();

    Ok(NewVenue {
        name: name.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        address,
        thumbnail: Some(thumbnail),
    })
}

/// What a show record refers to, before the references are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDraft {
    pub artist_name: String,
    pub venue_name: String,
    pub show_date: DateTime<Utc>,
}

/// Takes the first attraction and first venue of the event.
///
/// Additional attractions are not linked; a show models exactly one artist.
pub fn show_from_event(event: &EventRecord) -> Result<ShowDraft, RecordError> {
    let artist_name = required(
        event.embedded.attractions.first().and_then(|a| a.name.as_deref()),
        "attractions[0].name",
    )?;
    let venue_name = required(
        event.embedded.venues.first().and_then(|v| v.name.as_deref()),
        "venues[0].name",
    )?;
    let raw_date = required(event.start_date_time(), "dates.start.dateTime")?;

    let show_date = DateTime::parse_from_rfc3339(raw_date)
        .map_err(|e| RecordError::InvalidRecord(format!("bad dateTime '{raw_date}': {e}")))?
        .with_timezone(&Utc);

    Ok(ShowDraft {
        artist_name: artist_name.to_string(),
        venue_name: venue_name.to_string(),
        show_date,
    })
}

#[derive(Clone)]
pub struct Reconciler {
    store: Store,
    default_thumbnail: String,
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Store, default_thumbnail: impl Into<String>) -> Self {
        Self {
            store,
            default_thumbnail: default_thumbnail.into(),
        }
    }

    /// Creates an artist for every attraction of every event.
    pub async fn import_artists(&self, events: &[EventRecord]) -> PassSummary {
        let mut summary = PassSummary::new(Pass::Artists);

        for event in events {
            for name in attraction_names(event) {
                let outcome = match name {
                    Some(name) => self.create_artist(name).await,
                    None => Err(RecordError::InvalidRecord(
                        "attraction without a name".to_string(),
                    )),
                };
                summary.record(record_label(name), outcome);
            }
        }

        info!("Import pass finished: {summary}");
        summary
    }

    pub async fn import_venues(&self, venues: &[VenueRecord]) -> PassSummary {
        let mut summary = PassSummary::new(Pass::Venues);

        for record in venues {
            let label = record_label(record.name.as_deref());
            let outcome = match venue_from_record(record, &self.default_thumbnail) {
                Ok(venue) => self
                    .store
                    .create_venue(&venue)
                    .await
                    .map(|_| ())
                    .map_err(|e| RecordError::from_store(&e)),
                Err(e) => Err(e),
            };
            summary.record(label, outcome);
        }

        info!("Import pass finished: {summary}");
        summary
    }

    /// Links the first attraction and venue of each event as a show.
    ///
    /// Not idempotent: running the same events twice stores every show twice.
    pub async fn import_shows(&self, events: &[EventRecord]) -> PassSummary {
        let mut summary = PassSummary::new(Pass::Shows);

        for event in events {
            let label = record_label(event.name.as_deref());
            let outcome = match show_from_event(event) {
                Ok(draft) => self.create_show(&draft).await,
                Err(e) => Err(e),
            };
            summary.record(label, outcome);
        }

        info!("Import pass finished: {summary}");
        summary
    }

    async fn create_artist(&self, name: &str) -> Result<(), RecordError> {
        self.store
            .create_artist(name)
            .await
            .map(|_| ())
            .map_err(|e| RecordError::from_store(&e))
    }

    async fn create_show(&self, draft: &ShowDraft) -> Result<(), RecordError> {
        let store_err = |e: anyhow::Error| RecordError::from_store(&e);

        let artist = self
            .store
            .get_artist_by_name(&draft.artist_name)
            .await
            .map_err(store_err)?
            .ok_or_else(|| RecordError::ReferenceMissing {
                kind: "artist",
                name: draft.artist_name.clone(),
            })?;

        let venue = self
            .store
            .get_venue_by_name(&draft.venue_name)
            .await
            .map_err(store_err)?
            .ok_or_else(|| RecordError::ReferenceMissing {
                kind: "venue",
                name: draft.venue_name.clone(),
            })?;

        self.store
            .create_show(artist.id, venue.id, draft.show_date)
            .await
            .map(|_| ())
            .map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ticketmaster::{
        AddressRef, EventDates, EventEmbedded, EventStart, ImageRef, NamedRef, StateRef,
    };

    const DEFAULT_THUMB: &str = "images/venue-default.png";

    fn named(name: &str) -> NamedRef {
        NamedRef {
            name: Some(name.to_string()),
        }
    }

    fn event(name: &str, attractions: &[&str], venue: &str, date_time: &str) -> EventRecord {
        EventRecord {
            name: Some(name.to_string()),
            dates: Some(EventDates {
                start: Some(EventStart {
                    date_time: Some(date_time.to_string()),
                    local_date: None,
                }),
            }),
            embedded: EventEmbedded {
                attractions: attractions.iter().map(|a| named(a)).collect(),
                venues: vec![named(venue)],
            },
        }
    }

    fn venue_record(name: &str) -> VenueRecord {
        VenueRecord {
            name: Some(name.to_string()),
            city: Some(named("Minneapolis")),
            state: Some(StateRef {
                name: Some("Minnesota".to_string()),
                state_code: Some("MN".to_string()),
            }),
            address: None,
            images: Vec::new(),
        }
    }

    async fn reconciler() -> (Reconciler, Store) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        (Reconciler::new(store.clone(), DEFAULT_THUMB), store)
    }

    #[test]
    fn venue_without_address_has_none() {
        let venue = venue_from_record(&venue_record("Turf Club"), DEFAULT_THUMB).unwrap();
        assert_eq!(venue.address, None);
        assert_eq!(venue.state, "MN");
    }

    #[test]
    fn venue_address_line1_is_used() {
        let mut record = venue_record("First Avenue");
        record.address = Some(AddressRef {
            line1: Some("701 N 1st Ave".to_string()),
        });
        let venue = venue_from_record(&record, DEFAULT_THUMB).unwrap();
        assert_eq!(venue.address.as_deref(), Some("701 N 1st Ave"));
    }

    #[test]
    fn venue_thumbnail_prefers_three_by_one() {
        let mut record = venue_record("First Avenue");
        record.images = vec![
            ImageRef {
                ratio: Some("16_9".to_string()),
                url: Some("https://img/wide.jpg".to_string()),
            },
            ImageRef {
                ratio: Some("3_1".to_string()),
                url: Some("https://img/banner.jpg".to_string()),
            },
        ];
        let venue = venue_from_record(&record, DEFAULT_THUMB).unwrap();
        assert_eq!(venue.thumbnail.as_deref(), Some("https://img/banner.jpg"));
    }

    #[test]
    fn venue_thumbnail_falls_back_to_default() {
        let mut record = venue_record("Turf Club");
        record.images = vec![ImageRef {
            ratio: Some("4_3".to_string()),
            url: Some("https://img/square.jpg".to_string()),
        }];
        let venue = venue_from_record(&record, DEFAULT_THUMB).unwrap();
        assert_eq!(venue.thumbnail.as_deref(), Some(DEFAULT_THUMB));
    }

    #[test]
    fn venue_state_falls_back_to_name() {
        let mut record = venue_record("Turf Club");
        record.state = Some(StateRef {
            name: Some("MN".to_string()),
            state_code: None,
        });
        let venue = venue_from_record(&record, DEFAULT_THUMB).unwrap();
        assert_eq!(venue.state, "MN");
    }

    #[test]
    fn venue_without_city_is_invalid() {
        let mut record = venue_record("Nowhere");
        record.city = None;
        let err = venue_from_record(&record, DEFAULT_THUMB).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord(_)));
    }

    #[test]
    fn show_draft_uses_first_attraction_and_venue() {
        let draft = show_from_event(&event(
            "Double bill",
            &["REM", "Opener"],
            "First Avenue",
            "2017-02-02T00:00:00Z",
        ))
        .unwrap();
        assert_eq!(draft.artist_name, "REM");
        assert_eq!(draft.venue_name, "First Avenue");
        assert_eq!(draft.show_date.to_rfc3339(), "2017-02-02T00:00:00+00:00");
    }

    #[test]
    fn show_draft_rejects_bad_date() {
        let err = show_from_event(&event("x", &["REM"], "First Avenue", "tomorrow")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn reimporting_artists_keeps_one_row() {
        let (reconciler, store) = reconciler().await;
        let events = vec![
            event("a", &["REM", "Yes"], "First Avenue", "2017-02-02T00:00:00Z"),
            event("b", &["REM"], "Turf Club", "2017-03-02T00:00:00Z"),
        ];

        let first = reconciler.import_artists(&events).await;
        assert_eq!(first.created, 2);
        assert_eq!(first.duplicates, 1);

        let second = reconciler.import_artists(&events).await;
        assert_eq!(second.created, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(second.skipped(), 3);

        assert_eq!(store.count_artists_named("REM").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unnamed_attraction_fails_without_aborting() {
        let (reconciler, store) = reconciler().await;
        let mut ev = event("a", &["REM"], "First Avenue", "2017-02-02T00:00:00Z");
        ev.embedded.attractions.insert(0, NamedRef { name: None });

        let summary = reconciler.import_artists(&[ev]).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
        assert!(store.get_artist_by_name("REM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn venue_import_skips_duplicates() {
        let (reconciler, store) = reconciler().await;
        let records = vec![venue_record("First Avenue"), venue_record("First Avenue")];

        let summary = reconciler.import_venues(&records).await;
        assert_eq!(summary.created, 1);
        assert_eq!(summary.duplicates, 1);

        let venue = store.get_venue_by_name("First Avenue").await.unwrap().unwrap();
        assert_eq!(venue.address, None);
        assert_eq!(venue.thumbnail.as_deref(), Some(DEFAULT_THUMB));
    }

    #[tokio::test]
    async fn show_import_links_existing_artist_and_venue() {
        let (reconciler, store) = reconciler().await;
        store.create_artist("REM").await.unwrap();
        let venue_id = store
            .create_venue(&venue_from_record(&venue_record("First Avenue"), DEFAULT_THUMB).unwrap())
            .await
            .unwrap();

        let events = vec![event("REM", &["REM"], "First Avenue", "2017-02-02T00:00:00Z")];
        let summary = reconciler.import_shows(&events).await;
        assert_eq!(summary.created, 1);

        let shows = store.shows_for_venue(venue_id).await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].artist.name, "REM");
        assert_eq!(shows[0].show_date.date_naive().to_string(), "2017-02-02");
    }

    #[tokio::test]
    async fn show_with_unknown_artist_is_skipped() {
        let (reconciler, store) = reconciler().await;
        store.create_artist("REM").await.unwrap();
        store
            .create_venue(&venue_from_record(&venue_record("First Avenue"), DEFAULT_THUMB).unwrap())
            .await
            .unwrap();

        let events = vec![
            event("ghost", &["Nobody"], "First Avenue", "2017-01-01T00:00:00Z"),
            event("REM", &["REM"], "First Avenue", "2017-02-02T00:00:00Z"),
        ];
        let summary = reconciler.import_shows(&events).await;

        assert_eq!(summary.missing_references, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(store.count_shows().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn show_import_is_not_idempotent() {
        let (reconciler, store) = reconciler().await;
        store.create_artist("REM").await.unwrap();
        store
            .create_venue(&venue_from_record(&venue_record("First Avenue"), DEFAULT_THUMB).unwrap())
            .await
            .unwrap();

        let events = vec![event("REM", &["REM"], "First Avenue", "2017-02-02T00:00:00Z")];
        reconciler.import_shows(&events).await;
        let second = reconciler.import_shows(&events).await;

        assert_eq!(second.created, 1);
        assert_eq!(store.count_shows().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn show_with_unknown_venue_is_skipped() {
        let (reconciler, store) = reconciler().await;
        store.create_artist("REM").await.unwrap();
        store
            .create_venue(&venue_from_record(&venue_record("First Avenue"), DEFAULT_THUMB).unwrap())
            .await
            .unwrap();

        let events = vec![
            event("REM", &["REM"], "Nowhere", "2017-01-01T00:00:00Z"),
            event("REM", &["REM"], "First Avenue", "2017-02-02T00:00:00Z"),
        ];
        let summary = reconciler.import_shows(&events).await;

        assert_eq!(summary.missing_references, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.count_shows().await.unwrap(), 1);
    }

    #[test]
    fn record_labels_are_trimmed() {
        assert_eq!(record_label(Some("  First Avenue ")), "First Avenue");
        assert_eq!(record_label(Some("   ")), "<unnamed>");
        assert_eq!(record_label(None), "<unnamed>");
    }

    #[tokio::test]
    async fn padded_venue_name_is_stored_trimmed() {
        let (reconciler, store) = reconciler().await;
        let summary = reconciler
            .import_venues(&[venue_record("  Turf Club  ")])
            .await;

        assert_eq!(summary.created, 1);
        assert!(store.get_venue_by_name("Turf Club").await.unwrap().is_some());
    }

    #[test]
    fn summary_display() {
        let mut summary = PassSummary::new(Pass::Venues);
        summary.record("a", Ok(()));
        summary.record("b", Err(RecordError::Duplicate("venues.name".to_string())));
        assert_eq!(
            summary.to_string(),
            "venues: 1 created, 1 duplicate, 0 missing reference, 0 failed"
        );
    }
}
