//! Operator triggers for the three ingestion passes.
//!
//! These answer in plain text rather than the JSON envelope: `ok` with 200,
//! or one of the two operator messages with 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::services::{IngestOutcome, Pass};

fn respond(outcome: &IngestOutcome) -> Response {
    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, outcome.message()).into_response()
}

/// `/artist`
pub async fn ingest_artists(State(state): State<Arc<AppState>>) -> Response {
    respond(&state.ingest.run(Pass::Artists).await)
}

/// `/venue`
pub async fn ingest_venues(State(state): State<Arc<AppState>>) -> Response {
    respond(&state.ingest.run(Pass::Venues).await)
}

/// `/show`
pub async fn ingest_shows(State(state): State<Arc<AppState>>) -> Response {
    respond(&state.ingest.run(Pass::Shows).await)
}
