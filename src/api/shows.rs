use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, NoteDto, ShowDto};
use crate::domain::ShowId;
use crate::services::NoteInput;

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let id = validate_id("show", id)?;
    let show = state
        .store
        .get_show(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Show", id))?;

    Ok(Json(ApiResponse::success(show.into())))
}

pub async fn list_show_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<NoteDto>>>, ApiError> {
    let id = validate_id("show", id)?;
    let notes = state.notes.for_show(ShowId::new(id)).await?;
    Ok(Json(ApiResponse::success(notes)))
}

/// Posts a note on the show as the calling user.
pub async fn create_show_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(input): Json<NoteInput>,
) -> Result<(StatusCode, Json<ApiResponse<NoteDto>>), ApiError> {
    let id = validate_id("show", id)?;
    let note = state
        .notes
        .create(ShowId::new(id), user.id(), input)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(note))))
}
