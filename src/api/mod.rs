use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::{EventSource, TicketmasterClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{IngestService, NoteService, Reconciler, SeaOrmNoteService};

mod artists;
pub mod auth;
mod error;
mod ingest;
mod notes;
mod observability;
mod shows;
mod system;
mod types;
mod users;
mod validation;
mod venues;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub config: Arc<Config>,

    pub ingest: Arc<IngestService>,

    pub notes: Arc<dyn NoteService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Builds the state around an explicit event source.
pub async fn create_app_state_with_source(
    config: Config,
    source: Arc<dyn EventSource>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let reconciler = Reconciler::new(store.clone(), config.ticketmaster.default_thumbnail.clone());
    let ingest = Arc::new(IngestService::new(
        source,
        reconciler,
        config.ticketmaster.clone(),
    ));
    let notes: Arc<dyn NoteService> = Arc::new(SeaOrmNoteService::new(store.clone()));

    Ok(Arc::new(AppState {
        store,
        config: Arc::new(config),
        ingest,
        notes,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let source = Arc::new(TicketmasterClient::new(config.ticketmaster.clone())?);
    create_app_state_with_source(config, source, prometheus_handle).await
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config.server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = Router::new()
        .merge(create_public_router())
        .merge(create_protected_router(state.clone()));

    Router::new()
        .merge(create_ingest_router(state.clone()))
        .nest("/api", api_router)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_requests))
}

fn create_ingest_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/artist",
            get(ingest::ingest_artists).post(ingest::ingest_artists),
        )
        .route(
            "/venue",
            get(ingest::ingest_venues).post(ingest::ingest_venues),
        )
        .route("/show", get(ingest::ingest_shows).post(ingest::ingest_shows))
        .route_layer(middleware::from_fn_with_state(state, auth::require_operator))
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(artists::list_artists))
        .route("/artists/{id}", get(artists::get_artist))
        .route("/artists/{id}/shows", get(artists::artist_shows))
        .route("/venues", get(venues::list_venues))
        .route("/venues/{id}", get(venues::get_venue))
        .route("/venues/{id}/shows", get(venues::venue_shows))
        .route("/shows/{id}", get(shows::get_show))
        .route("/shows/{id}/notes", get(shows::list_show_notes))
        .route("/notes/latest", get(notes::latest_notes))
        .route("/users/{id}", get(users::get_user))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows/{id}/notes", post(shows::create_show_note))
        .route("/notes/mine", get(notes::my_notes))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/users/me", get(users::get_me))
        .route("/users/me/profile", put(users::update_profile))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}
