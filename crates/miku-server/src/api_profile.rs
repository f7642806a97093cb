//! Profile endpoints for the current user.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json};
use miku_turn::UserContext;
use miku_types::{User, UserUpdate};
use std::sync::Arc;

/// Handler for `GET /api/profile`.
pub async fn get_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<User>, ApiError> {
    let user = state.history.get_or_create_user(ctx.user_id).await?;
    Ok(Json(user))
}

/// Handler for `PUT /api/profile`.
///
/// Empty strings and empty preference maps count as absent.
pub async fn update_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<UserContext>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(update) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let update = UserUpdate {
        name: update.name.filter(|n| !n.trim().is_empty()),
        likes: update.likes.filter(|l| !l.trim().is_empty()),
        preferences: update.preferences.filter(|p| !p.is_empty()),
    };

    let user = if update.is_empty() {
        state.history.get_or_create_user(ctx.user_id).await?
    } else {
        state.history.update_user(ctx.user_id, update).await?
    };

    tracing::info!(user_id = %user.id, "profile updated");
    Ok(Json(user))
}
