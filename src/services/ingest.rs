//! Ingestion passes as triggered by an operator.
//!
//! A pass fetches one collection from the event source and hands it to the
//! [`Reconciler`]. Fetch failures abort the pass before the store is touched;
//! everything after that is best-effort per record.

use crate::clients::ticketmaster::{EventSource, SourceError};
use crate::config::TicketmasterConfig;
use crate::services::reconciler::{Pass, PassSummary, Reconciler};
use std::sync::Arc;
use tracing::{error, info};

pub const AUTH_ERROR_MESSAGE: &str =
    "You were not able to be authorized. Check your ticketmaster key is being properly set";

pub const UNAVAILABLE_MESSAGE: &str = "There was a problem. Try again later.";

/// How a triggered pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The pass ran to completion, however many records were skipped.
    Ok(PassSummary),
    /// The upstream rejected the credential.
    AuthError,
    /// Any other failure fetching from the upstream.
    Unavailable,
}

impl IngestOutcome {
    /// Operator-facing message for the outcome.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::AuthError => AUTH_ERROR_MESSAGE,
            Self::Unavailable => UNAVAILABLE_MESSAGE,
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl From<Result<PassSummary, SourceError>> for IngestOutcome {
    fn from(result: Result<PassSummary, SourceError>) -> Self {
        match result {
            Ok(summary) => Self::Ok(summary),
            Err(SourceError::Auth) => Self::AuthError,
            Err(SourceError::Unavailable(_) | SourceError::MalformedResponse(_)) => {
                Self::Unavailable
            }
        }
    }
}

pub struct IngestService {
    source: Arc<dyn EventSource>,
    reconciler: Reconciler,
    settings: TicketmasterConfig,
}

impl IngestService {
    #[must_use]
    pub fn new(
        source: Arc<dyn EventSource>,
        reconciler: Reconciler,
        settings: TicketmasterConfig,
    ) -> Self {
        Self {
            source,
            reconciler,
            settings,
        }
    }

    pub async fn ingest_artists(&self) -> IngestOutcome {
        let result = async {
            let events = self
                .source
                .fetch_events(&self.settings.dma_id, &self.settings.classification)
                .await?;
            Ok::<_, SourceError>(self.reconciler.import_artists(&events).await)
        }
        .await;

        Self::finish(Pass::Artists, result)
    }

    pub async fn ingest_venues(&self) -> IngestOutcome {
        let result = async {
            let venues = self
                .source
                .fetch_venues(&self.settings.state_code, &self.settings.classification)
                .await?;
            Ok::<_, SourceError>(self.reconciler.import_venues(&venues).await)
        }
        .await;

        Self::finish(Pass::Venues, result)
    }

    pub async fn ingest_shows(&self) -> IngestOutcome {
        let result = async {
            let events = self
                .source
                .fetch_events(&self.settings.dma_id, &self.settings.classification)
                .await?;
            Ok::<_, SourceError>(self.reconciler.import_shows(&events).await)
        }
        .await;

        Self::finish(Pass::Shows, result)
    }

    /// Runs the pass matching `pass`.
    pub async fn run(&self, pass: Pass) -> IngestOutcome {
        match pass {
            Pass::Artists => self.ingest_artists().await,
            Pass::Venues => self.ingest_venues().await,
            Pass::Shows => self.ingest_shows().await,
        }
    }

    fn finish(pass: Pass, result: Result<PassSummary, SourceError>) -> IngestOutcome {
        match &result {
            Ok(summary) => info!(
                %pass,
                created = summary.created,
                skipped = summary.skipped(),
                failed = summary.failed,
                "Ingestion pass complete"
            ),
            Err(e) => error!(%pass, "Ingestion pass aborted: {e}"),
        }
        let outcome = IngestOutcome::from(result);
        metrics::counter!(
            "ingest_passes_total",
            "pass" => pass.as_str(),
            "ok" => if outcome.is_ok() { "true" } else { "false" }
        )
        .increment(1);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ticketmaster::{EventRecord, VenueRecord};
    use crate::db::Store;

    struct FailingSource(fn() -> SourceError);

    #[async_trait::async_trait]
    impl EventSource for FailingSource {
        async fn fetch_events(&self, _: &str, _: &str) -> Result<Vec<EventRecord>, SourceError> {
            Err((self.0)())
        }

        async fn fetch_venues(&self, _: &str, _: &str) -> Result<Vec<VenueRecord>, SourceError> {
            Err((self.0)())
        }
    }

    async fn service(source: FailingSource) -> IngestService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        IngestService::new(
            Arc::new(source),
            Reconciler::new(store, "default.png"),
            TicketmasterConfig::default(),
        )
    }

    #[tokio::test]
    async fn auth_failure_maps_to_auth_error() {
        let service = service(FailingSource(|| SourceError::Auth)).await;
        for pass in [Pass::Artists, Pass::Venues, Pass::Shows] {
            let outcome = service.run(pass).await;
            assert_eq!(outcome, IngestOutcome::AuthError);
            assert_eq!(outcome.message(), AUTH_ERROR_MESSAGE);
        }
    }

    #[tokio::test]
    async fn malformed_body_maps_to_unavailable() {
        let service = service(FailingSource(|| {
            SourceError::MalformedResponse("missing _embedded".to_string())
        }))
        .await;
        assert_eq!(service.ingest_shows().await, IngestOutcome::Unavailable);
    }

    #[test]
    fn ok_message() {
        let outcome = IngestOutcome::Ok(PassSummary::new(Pass::Artists));
        assert_eq!(outcome.message(), "ok");
    }
}
