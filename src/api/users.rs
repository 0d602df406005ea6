use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_bio, validate_id};
use super::{ApiError, ApiResponse, AppState, MeDto, UpdateProfileRequest, UserProfileDto};
use crate::domain::UserId;

/// Public profile with the user's notes.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserProfileDto>>, ApiError> {
    let id = validate_id("user", id)?;
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let (bio, notes) = tokio::try_join!(
        async { state.store.get_profile_bio(id).await.map_err(ApiError::from) },
        async { state.notes.for_user(UserId::new(id)).await.map_err(ApiError::from) },
    )?;

    Ok(Json(ApiResponse::success(UserProfileDto {
        id: user.id,
        username: user.username,
        bio,
        notes,
    })))
}

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<MeDto>>, ApiError> {
    let bio = state.store.get_profile_bio(user.id).await?;
    Ok(Json(ApiResponse::success(MeDto::new(user, bio))))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<MeDto>>, ApiError> {
    let bio = validate_bio(&payload.bio)?;
    state.store.set_profile_bio(user.id, bio).await?;

    tracing::info!(user = %user.username, "Profile updated");

    let bio = Some(bio.to_string());
    Ok(Json(ApiResponse::success(MeDto::new(user, bio))))
}
