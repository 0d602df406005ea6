use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, ArtistDto, ShowDto};

pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ArtistDto>>>, ApiError> {
    let artists = state.store.list_artists().await?;
    Ok(Json(ApiResponse::success(
        artists.into_iter().map(ArtistDto::from).collect(),
    )))
}

pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ArtistDto>>, ApiError> {
    let id = validate_id("artist", id)?;
    let artist = state
        .store
        .get_artist(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artist", id))?;

    Ok(Json(ApiResponse::success(artist.into())))
}

/// Venues the artist has played, newest show first.
pub async fn artist_shows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ShowDto>>>, ApiError> {
    let id = validate_id("artist", id)?;
    if state.store.get_artist(id).await?.is_none() {
        return Err(ApiError::not_found("Artist", id));
    }

    let shows = state.store.shows_for_artist(id).await?;
    Ok(Json(ApiResponse::success(
        shows.into_iter().map(ShowDto::from).collect(),
    )))
}
