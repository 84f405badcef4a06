//! # API REST
//!
//! REST API implementation for Yaqeen.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer session authentication
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for request and response bodies and `yaqeen-core` for everything else.

#![warn(rust_2018_idioms)]

mod convert;
mod error;
mod extract;
mod handlers;
mod middleware;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use handlers::{accounts, attachments, issues, profiles, requests};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use yaqeen_core::config::{
    data_file_from_env_value, password_iterations_from_env_value, token_ttl_from_env_value,
};
use yaqeen_core::{CoreConfig, Services};

/// Default listen address when `YAQEEN_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::welcome,
        handlers::health,
        accounts::register,
        accounts::login,
        accounts::refresh,
        accounts::logout,
        accounts::me,
        profiles::list_patients,
        profiles::create_patient,
        profiles::get_patient,
        profiles::update_patient,
        profiles::delete_patient,
        profiles::list_doctors,
        profiles::create_doctor,
        profiles::get_doctor,
        profiles::update_doctor,
        profiles::delete_doctor,
        issues::list_issues,
        issues::create_issue,
        issues::get_issue,
        issues::update_issue,
        issues::delete_issue,
        issues::accept_issue,
        issues::decline_issue,
        issues::complete_issue,
        attachments::list_documents,
        attachments::create_document,
        attachments::get_document,
        attachments::delete_document,
        attachments::list_comments,
        attachments::create_comment,
        attachments::get_comment,
        attachments::update_comment,
        attachments::delete_comment,
        requests::list_requests,
        requests::create_request,
        requests::get_request,
        requests::decide_request,
    ),
    components(schemas(
        api_shared::MessageRes,
        api_shared::HealthRes,
        api_shared::ErrorBody,
        api_shared::ErrorDetail,
        api_shared::RegisterReq,
        api_shared::RegisterRes,
        api_shared::LoginReq,
        api_shared::RefreshReq,
        api_shared::SessionRes,
        api_shared::UserRes,
        api_shared::PatientReq,
        api_shared::PatientRes,
        api_shared::CreateDoctorReq,
        api_shared::UpdateDoctorReq,
        api_shared::DoctorRes,
        api_shared::CreateIssueReq,
        api_shared::UpdateIssueReq,
        api_shared::IssueRes,
        api_shared::IssueDetailRes,
        api_shared::CreateDocumentReq,
        api_shared::DocumentRes,
        api_shared::CreateCommentReq,
        api_shared::UpdateCommentReq,
        api_shared::CommentRes,
        api_shared::CreateRequestReq,
        api_shared::RequestActionReq,
        api_shared::RequestRes,
    ))
)]
pub struct ApiDoc;

/// Resolve the core configuration from `YAQEEN_*` environment variables.
///
/// # Errors
/// Returns an error if a numeric variable is not a positive integer or the data file path is a
/// directory.
pub fn core_config_from_env() -> anyhow::Result<CoreConfig> {
    let data_file = data_file_from_env_value(std::env::var("YAQEEN_DATA_FILE").ok());
    let token_ttl = token_ttl_from_env_value(std::env::var("YAQEEN_TOKEN_TTL_SECS").ok())?;
    let iterations =
        password_iterations_from_env_value(std::env::var("YAQEEN_PASSWORD_ITERATIONS").ok())?;
    Ok(CoreConfig::new(data_file, token_ttl, iterations)?)
}

/// Build the REST router with every route, Swagger UI and the middleware stack.
///
/// Everything except the welcome, health, registration, login and refresh routes requires an
/// `Authorization: Bearer <token>` header.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .route("/register", post(accounts::register))
        .route("/users/login", post(accounts::login))
        .route("/users/token/refresh", post(accounts::refresh));

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/users/logout", post(accounts::logout))
        .route("/users/me", get(accounts::me))
        .route(
            "/patients",
            get(profiles::list_patients).post(profiles::create_patient),
        )
        .route(
            "/patients/:id",
            get(profiles::get_patient)
                .put(profiles::update_patient)
                .delete(profiles::delete_patient),
        )
        .route(
            "/doctors",
            get(profiles::list_doctors).post(profiles::create_doctor),
        )
        .route(
            "/doctors/:id",
            get(profiles::get_doctor)
                .put(profiles::update_doctor)
                .delete(profiles::delete_doctor),
        )
        .route(
            "/issues",
            get(issues::list_issues).post(issues::create_issue),
        )
        .route(
            "/issues/:id",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route("/issues/:id/accept", post(issues::accept_issue))
        .route("/issues/:id/decline", post(issues::decline_issue))
        .route("/issues/:id/complete", post(issues::complete_issue))
        .route(
            "/documents",
            get(attachments::list_documents).post(attachments::create_document),
        )
        .route(
            "/documents/:id",
            get(attachments::get_document).delete(attachments::delete_document),
        )
        .route(
            "/comments",
            get(attachments::list_comments).post(attachments::create_comment),
        )
        .route(
            "/comments/:id",
            get(attachments::get_comment)
                .put(attachments::update_comment)
                .delete(attachments::delete_comment),
        )
        .route(
            "/patient-requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/patient-requests/:id", get(requests::get_request))
        .route(
            "/patient-requests/:id/action",
            post(requests::decide_request),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::log_access))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
