//! Request middleware: bearer authentication and access logging.

use crate::error::ApiError;
use crate::extract::BearerToken;
use crate::AppState;
use api_shared::auth::bearer_token;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

/// Require a live session token.
///
/// On success the caller's [`Actor`](yaqeen_core::Actor) and the raw token are injected into
/// request extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = bearer_token(header)
        .map_err(|_| ApiError::Unauthorized)?
        .to_string();

    let actor = state.services.accounts.authenticate(&token)?;

    req.extensions_mut().insert(actor);
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}

/// Log every request with its method, path, status and duration.
pub async fn log_access(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = std::time::Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "handled request"
    );
    response
}
