use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::User;
use crate::domain::UserId;

/// The user resolved from the request's API key.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> UserId {
        UserId::new(self.0.id)
    }
}

/// Requires a valid API key and makes the user available as
/// `Extension<CurrentUser>`.
///
/// Keys are read from:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <api_key>` header
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &headers).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Guards the ingestion triggers.
///
/// Only admin users may run a pass unless `server.require_operator_auth`
/// is turned off.
pub async fn require_operator(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.server.require_operator_auth {
        return Ok(next.run(request).await);
    }

    let user = authenticate(&state, &headers).await?;
    if !user.is_admin {
        tracing::warn!(user = %user.username, "Non-admin tried to trigger ingestion");
        return Err(ApiError::Forbidden(
            "Ingestion requires an operator account".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let key = extract_api_key(headers)
        .ok_or_else(|| ApiError::Unauthorized("API key required".to_string()))?;

    let user = state
        .store
        .verify_api_key(&key)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid API key".to_string()))?;

    tracing::Span::current().record("user_id", user.username.as_str());
    Ok(user)
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}
