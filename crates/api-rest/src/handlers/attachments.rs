use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;
use api_shared::{
    CommentRes, CreateCommentReq, CreateDocumentReq, DocumentRes, IssueFilter, UpdateCommentReq,
};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Json;
use yaqeen_core::model::{CommentId, DocumentId, IssueId};
use yaqeen_core::Actor;

#[utoipa::path(
    get,
    path = "/documents",
    params(IssueFilter),
    responses(
        (status = 200, description = "Documents on issues visible to the caller", body = [DocumentRes]),
        (status = 404, description = "Filter issue not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiQuery(filter): ApiQuery<IssueFilter>,
) -> Result<Json<Vec<DocumentRes>>, ApiError> {
    let documents = state
        .services
        .attachments
        .list_documents(&actor, filter.issue_id.map(IssueId))?;
    Ok(Json(documents.iter().map(convert::document).collect()))
}

#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentReq,
    responses(
        (status = 201, description = "Document recorded", body = DocumentRes),
        (status = 400, description = "File type or size not allowed", body = api_shared::ErrorBody),
        (status = 404, description = "Issue not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed", body = api_shared::ErrorBody)
    )
)]
/// Record a document (PDF or image, up to 5 MiB) on an issue.
#[axum::debug_handler]
pub async fn create_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateDocumentReq>,
) -> Result<(StatusCode, Json<DocumentRes>), ApiError> {
    let document = state.services.attachments.create_document(
        &actor,
        IssueId(req.issue_id),
        &req.file_name,
        req.size_bytes,
    )?;
    Ok((StatusCode::CREATED, Json(convert::document(&document))))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = u64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = DocumentRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<DocumentRes>, ApiError> {
    let document = state
        .services
        .attachments
        .get_document(&actor, DocumentId(id))?;
    Ok(Json(convert::document(&document)))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = u64, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document removed"),
        (status = 403, description = "Caller did not raise the issue", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .attachments
        .delete_document(&actor, DocumentId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/comments",
    params(IssueFilter),
    responses(
        (status = 200, description = "Comments on issues visible to the caller", body = [CommentRes]),
        (status = 404, description = "Filter issue not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiQuery(filter): ApiQuery<IssueFilter>,
) -> Result<Json<Vec<CommentRes>>, ApiError> {
    let comments = state
        .services
        .attachments
        .list_comments(&actor, filter.issue_id.map(IssueId))?;
    Ok(Json(comments.iter().map(convert::comment).collect()))
}

#[utoipa::path(
    post,
    path = "/comments",
    request_body = CreateCommentReq,
    responses(
        (status = 201, description = "Comment added", body = CommentRes),
        (status = 404, description = "Issue not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateCommentReq>,
) -> Result<(StatusCode, Json<CommentRes>), ApiError> {
    let comment =
        state
            .services
            .attachments
            .create_comment(&actor, IssueId(req.issue_id), &req.content)?;
    Ok((StatusCode::CREATED, Json(convert::comment(&comment))))
}

#[utoipa::path(
    get,
    path = "/comments/{id}",
    params(("id" = u64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment", body = CommentRes),
        (status = 404, description = "Not found", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<CommentRes>, ApiError> {
    let comment = state.services.attachments.get_comment(&actor, CommentId(id))?;
    Ok(Json(convert::comment(&comment)))
}

#[utoipa::path(
    put,
    path = "/comments/{id}",
    params(("id" = u64, Path, description = "Comment id")),
    request_body = UpdateCommentReq,
    responses(
        (status = 200, description = "Comment edited", body = CommentRes),
        (status = 403, description = "Caller is not the author", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(req): ApiJson<UpdateCommentReq>,
) -> Result<Json<CommentRes>, ApiError> {
    let comment =
        state
            .services
            .attachments
            .update_comment(&actor, CommentId(id), &req.content)?;
    Ok(Json(convert::comment(&comment)))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = u64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment removed"),
        (status = 403, description = "Caller is not the author", body = api_shared::ErrorBody),
        (status = 404, description = "Not found", body = api_shared::ErrorBody),
        (status = 409, description = "Issue completed", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .attachments
        .delete_comment(&actor, CommentId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
