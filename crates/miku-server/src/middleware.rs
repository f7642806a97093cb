use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use miku_turn::UserContext;
use std::sync::Arc;

use crate::AppState;

/// Attaches the caller's [`UserContext`] to the request.
///
/// There is no authentication: every request acts as the configured
/// default user.
pub async fn user_context_middleware(
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .default_user_id;

    req.extensions_mut().insert(UserContext::new(user_id));

    Ok(next.run(req).await)
}
