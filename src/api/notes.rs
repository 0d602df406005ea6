use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, NoteDto};
use crate::domain::NoteId;
use crate::services::NoteInput;

pub async fn latest_notes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NoteDto>>>, ApiError> {
    let notes = state.notes.latest().await?;
    Ok(Json(ApiResponse::success(notes)))
}

pub async fn my_notes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<NoteDto>>>, ApiError> {
    let notes = state.notes.for_user(user.id()).await?;
    Ok(Json(ApiResponse::success(notes)))
}

pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NoteDto>>, ApiError> {
    let id = validate_id("note", id)?;
    let note = state.notes.get_owned(NoteId::new(id), user.id()).await?;
    Ok(Json(ApiResponse::success(note)))
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(input): Json<NoteInput>,
) -> Result<Json<ApiResponse<NoteDto>>, ApiError> {
    let id = validate_id("note", id)?;
    let note = state
        .notes
        .update(NoteId::new(id), user.id(), input)
        .await?;
    Ok(Json(ApiResponse::success(note)))
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("note", id)?;
    state.notes.delete(NoteId::new(id), user.id()).await?;
    Ok(Json(ApiResponse::success(())))
}
