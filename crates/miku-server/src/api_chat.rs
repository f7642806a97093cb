//! Conversation turn endpoint.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use miku_turn::{TurnError, UserContext};
use miku_types::Emotion;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Response body for a completed turn.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Raw reply, leading emotion tag included.
    pub reply: String,
    pub emotion: Emotion,
    /// Base64-encoded audio, `null` when none was produced.
    pub audio: Option<String>,
}

/// Handler for `POST /chat`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<UserContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .turns
        .run_detached(ctx, request.text)
        .await
        .map_err(|e| match e {
            TurnError::InvalidInput(msg) => ApiError::BadRequest(msg),
            TurnError::Generation(_) | TurnError::Interrupted(_) => {
                tracing::error!(user_id = %ctx.user_id, error = %e, "chat turn failed");
                ApiError::InternalServerError(e.to_string())
            }
        })?;

    tracing::debug!(
        turn_id = %outcome.diagnostics.turn_id,
        audio = outcome.result.audio.is_some(),
        "chat turn served"
    );

    let result = outcome.result;
    Ok(Json(ChatResponse {
        reply: result.reply,
        emotion: result.emotion,
        audio: result.audio.map(|bytes| BASE64_STANDARD.encode(bytes)),
    }))
}
