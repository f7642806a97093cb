//! Realtime room credential endpoint.

use crate::api::ApiError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Participant name used when the caller gives none.
pub const DEFAULT_PARTICIPANT_NAME: &str = "User";

/// Request body for `POST /token`. The body itself may be empty.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed LiveKit access token.
    pub token: String,
    /// LiveKit server URL the client should connect to.
    pub url: String,
}

/// Handler for `POST /token`.
///
/// The name is used as both identity and display name. Callers are not
/// authenticated.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let request: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?
    };

    if !state.voice_service.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "realtime voice is not configured".to_string(),
        ));
    }

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PARTICIPANT_NAME.to_string());

    let token = state
        .voice_service
        .issue_credential(&name, &name, state.voice_service.room())
        .map_err(|e| {
            tracing::error!(error = %e, "failed to issue room token");
            ApiError::InternalServerError(e.to_string())
        })?;

    tracing::info!(participant = %name, room = state.voice_service.room(), "issued room token");

    Ok(Json(TokenResponse {
        token,
        url: state.voice_service.get_url().to_string(),
    }))
}
