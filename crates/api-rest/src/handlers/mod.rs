//! HTTP handlers, one module per resource.

pub mod accounts;
pub mod attachments;
pub mod issues;
pub mod profiles;
pub mod requests;

use crate::error::ApiError;
use api_shared::{HealthRes, HealthService, MessageRes};
use axum::response::Json;
use yaqeen_core::CoreResult;

/// Run a service call that hashes passwords off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> CoreResult<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub async fn welcome() -> Json<MessageRes> {
    Json(MessageRes {
        message: "Welcome to the Yaqeen API!".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
