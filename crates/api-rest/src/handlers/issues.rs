use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;
use api_shared::{CreateIssueReq, IssueDetailRes, IssueRes, UpdateIssueReq};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Json;
use yaqeen_core::model::{IssueId, UserId};
use yaqeen_core::{Actor, IssueUpdate, NewIssue};

#[utoipa::path(
    get,
    path = "/issues",
    responses(
        (status = 200, description = "Issues visible to the caller, newest first", body = [IssueRes])
    )
)]
/// List issues: patients see the ones they raised, doctors the ones assigned to them.
#[axum::debug_handler]
pub async fn list_issues(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<IssueRes>>, ApiError> {
    let issues = state.services.issues.list_issues(&actor)?;
    Ok(Json(issues.iter().map(convert::issue).collect()))
}

#[utoipa::path(
    post,
    path = "/issues",
    request_body = CreateIssueReq,
    responses(
        (status = 201, description = "Issue raised", body = IssueRes),
        (status = 400, description = "Invalid issue", body = api_shared::ErrorBody),
        (status = 403, description = "Caller is not a patient", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateIssueReq>,
) -> Result<(StatusCode, Json<IssueRes>), ApiError> {
    let issue = state.services.issues.create_issue(
        &actor,
        NewIssue {
            title: req.title,
            description: req.description,
            doctor: req.doctor_id.map(UserId),
        },
    )?;
    Ok((StatusCode::CREATED, Json(convert::issue(&issue))))
}

#[utoipa::path(
    get,
    path = "/issues/{id}",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Issue with its documents and comments", body = IssueDetailRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<IssueDetailRes>, ApiError> {
    let detail = state.services.issues.get_issue(&actor, IssueId(id))?;
    Ok(Json(convert::issue_detail(&detail)))
}

#[utoipa::path(
    put,
    path = "/issues/{id}",
    params(("id" = u64, Path, description = "Issue id")),
    request_body = UpdateIssueReq,
    responses(
        (status = 200, description = "Issue updated", body = IssueRes),
        (status = 400, description = "doctor_id combined with unassign_doctor", body = api_shared::ErrorBody),
        (status = 403, description = "Not the caller's issue", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed or no longer pending", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<UpdateIssueReq>,
) -> Result<Json<IssueRes>, ApiError> {
    let doctor = match (req.doctor_id, req.unassign_doctor) {
        (Some(_), true) => {
            return Err(ApiError::BadRequest(
                "doctor_id and unassign_doctor cannot be combined".into(),
            ));
        }
        (Some(doctor), false) => Some(Some(UserId(doctor))),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let issue = state.services.issues.update_issue(
        &actor,
        IssueId(id),
        IssueUpdate {
            title: req.title,
            description: req.description,
            doctor,
        },
    )?;
    Ok(Json(convert::issue(&issue)))
}

#[utoipa::path(
    delete,
    path = "/issues/{id}",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 204, description = "Issue removed with its attachments"),
        (status = 403, description = "Not the caller's issue", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue is no longer pending", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    state.services.issues.delete_issue(&actor, IssueId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/issues/{id}/accept",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Issue accepted", body = IssueRes),
        (status = 403, description = "Caller is not the assigned doctor", body = api_shared::ErrorBody),
        (status = 409, description = "Issue is not pending", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn accept_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<IssueRes>, ApiError> {
    let issue = state.services.issues.accept_issue(&actor, IssueId(id))?;
    Ok(Json(convert::issue(&issue)))
}

#[utoipa::path(
    post,
    path = "/issues/{id}/decline",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Issue declined", body = IssueRes),
        (status = 403, description = "Caller is not the assigned doctor", body = api_shared::ErrorBody),
        (status = 409, description = "Issue is not pending", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn decline_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<IssueRes>, ApiError> {
    let issue = state.services.issues.decline_issue(&actor, IssueId(id))?;
    Ok(Json(convert::issue(&issue)))
}

#[utoipa::path(
    post,
    path = "/issues/{id}/complete",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Issue completed; its attachments are now frozen", body = IssueRes),
        (status = 403, description = "Caller is not the assigned doctor", body = api_shared::ErrorBody),
        (status = 409, description = "Issue is not accepted", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn complete_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<IssueRes>, ApiError> {
    let issue = state.services.issues.complete_issue(&actor, IssueId(id))?;
    Ok(Json(convert::issue(&issue)))
}
