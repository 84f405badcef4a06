use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;
use api_shared::{CreateRequestReq, RequestActionReq, RequestRes};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Json;
use yaqeen_core::model::{IssueId, RequestDecision, RequestId, Specialty};
use yaqeen_core::{Actor, NewRequest};

#[utoipa::path(
    get,
    path = "/patient-requests",
    responses(
        (status = 200, description = "Requests visible to the caller, newest first", body = [RequestRes])
    )
)]
/// List patient requests.
///
/// Patients see their own requests. Doctors see the pending requests they may triage and the
/// ones they already decided.
#[axum::debug_handler]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<RequestRes>>, ApiError> {
    let requests = state.services.requests.list_requests(&actor)?;
    Ok(Json(requests.iter().map(convert::request).collect()))
}

#[utoipa::path(
    post,
    path = "/patient-requests",
    request_body = CreateRequestReq,
    responses(
        (status = 201, description = "Request submitted", body = RequestRes),
        (status = 403, description = "Caller is not a patient", body = api_shared::ErrorBody),
        (status = 409, description = "Attached issue is not pending", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateRequestReq>,
) -> Result<(StatusCode, Json<RequestRes>), ApiError> {
    let specialty = req
        .specialty
        .as_deref()
        .map(str::parse::<Specialty>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let request = state.services.requests.create_request(
        &actor,
        NewRequest {
            title: req.title,
            description: req.description,
            specialty,
            issue_id: req.issue_id.map(IssueId),
        },
    )?;
    Ok((StatusCode::CREATED, Json(convert::request(&request))))
}

#[utoipa::path(
    get,
    path = "/patient-requests/{id}",
    params(("id" = u64, Path, description = "Patient request id")),
    responses(
        (status = 200, description = "Patient request", body = RequestRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<RequestRes>, ApiError> {
    let request = state.services.requests.get_request(&actor, RequestId(id))?;
    Ok(Json(convert::request(&request)))
}

#[utoipa::path(
    post,
    path = "/patient-requests/{id}/action",
    params(("id" = u64, Path, description = "Patient request id")),
    request_body = RequestActionReq,
    responses(
        (status = 200, description = "Request decided", body = RequestRes),
        (status = 400, description = "Unknown action", body = api_shared::ErrorBody),
        (status = 403, description = "Caller may not triage this request", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Request already decided, or its issue names another doctor", body = api_shared::ErrorBody)
    )
)]
/// Accept or decline a pending request.
///
/// Accepting assigns the caller to the attached issue, or opens a new accepted issue when the
/// request has none.
#[axum::debug_handler]
pub async fn decide_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<RequestActionReq>,
) -> Result<Json<RequestRes>, ApiError> {
    let decision = req
        .action
        .parse::<RequestDecision>()
        .map_err(ApiError::BadRequest)?;
    let request = state
        .services
        .requests
        .decide_request(&actor, RequestId(id), decision)?;
    Ok(Json(convert::request(&request)))
}
