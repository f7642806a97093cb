//! Miku server library logic.

pub mod api;
pub mod api_chat;
pub mod api_profile;
pub mod api_token;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use miku_history::HistoryStore;
use miku_turn::TurnOrchestrator;
use miku_types::UserId;
use miku_voice::VoiceService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Turn pipeline.
    pub turns: TurnOrchestrator,
    /// History store, also used directly by the profile endpoints.
    pub history: Arc<dyn HistoryStore>,
    /// LiveKit credential issuer.
    pub voice_service: Arc<VoiceService>,
    /// User every request acts as.
    pub default_user_id: UserId,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Page served at `/`.
    pub index_path: String,
}

/// Maximum request body size (64 KiB). Utterances and profile updates are small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/chat", post(api_chat::chat_handler))
        .route("/token", post(api_token::token_handler))
        .route(
            "/api/profile",
            get(api_profile::get_profile_handler).put(api_profile::update_profile_handler),
        );

    let router = if std::path::Path::new(&state.static_dir).is_dir() {
        tracing::info!(path = %state.static_dir, "serving static files at /static");
        router.nest_service("/static", ServeDir::new(&state.static_dir))
    } else {
        tracing::info!(path = %state.static_dir, "static directory not found, skipping");
        router
    };

    let router = if std::path::Path::new(&state.index_path).is_file() {
        tracing::info!(path = %state.index_path, "serving index page at /");
        router.route_service("/", ServeFile::new(&state.index_path))
    } else {
        tracing::info!(path = %state.index_path, "index page not found, skipping");
        router
    };

    router
        .layer(axum::middleware::from_fn(middleware::user_context_middleware))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
