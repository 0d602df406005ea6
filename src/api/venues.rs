use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, ShowDto, VenueDto};

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VenueDto>>>, ApiError> {
    let venues = state.store.list_venues().await?;
    Ok(Json(ApiResponse::success(
        venues.into_iter().map(VenueDto::from).collect(),
    )))
}

pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<VenueDto>>, ApiError> {
    let id = validate_id("venue", id)?;
    let venue = state
        .store
        .get_venue(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Venue", id))?;

    Ok(Json(ApiResponse::success(venue.into())))
}

/// Artists who played the venue, newest show first.
pub async fn venue_shows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ShowDto>>>, ApiError> {
    let id = validate_id("venue", id)?;
    if state.store.get_venue(id).await?.is_none() {
        return Err(ApiError::not_found("Venue", id));
    }

    let shows = state.store.shows_for_venue(id).await?;
    Ok(Json(ApiResponse::success(
        shows.into_iter().map(ShowDto::from).collect(),
    )))
}
