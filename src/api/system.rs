//! System API endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// Returns version, uptime and catalog counts.
///
/// # Endpoint
/// `GET /api/system/status`
///
/// A failed database ping is reported in the body rather than as an error.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database ping failed: {e:#}");
            false
        }
    };

    let (artists, venues, shows) = if database_ok {
        let (artists, venues, shows) = tokio::try_join!(
            state.store.list_artists(),
            state.store.list_venues(),
            state.store.count_shows(),
        )?;
        (artists.len(), venues.len(), shows)
    } else {
        (0, 0, 0)
    };

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
        artists,
        venues,
        shows,
    })))
}
