//! Request and response bodies of the REST API.
//!
//! Enumerations (roles, specialties, statuses) travel as lowercase strings and timestamps as
//! RFC 3339 strings.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

// Accounts

/// Registration form. Profile fields are optional; when given they must match the role.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// `patient` or `doctor`
    pub role: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Patient profile
    #[serde(default)]
    pub age: Option<u32>,
    /// Doctor profile: `radiology`, `pathology` or `cardiology`
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub years_experience: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRes {
    pub message: String,
    pub user: UserRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshReq {
    pub refresh: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub token: String,
    pub token_type: String,
    pub expires_at: String,
    pub user: UserRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub id: u64,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub date_joined: String,
}

// Profiles

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientReq {
    pub age: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: u64,
    pub user_id: u64,
    pub age: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDoctorReq {
    pub specialty: String,
    pub license_number: String,
    #[serde(default)]
    pub years_experience: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDoctorReq {
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub years_experience: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    /// Doctors are identified by their user id.
    pub id: u64,
    pub username: String,
    pub full_name: String,
    pub specialty: String,
    pub license_number: String,
    pub years_experience: u32,
}

// Issues

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateIssueReq {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub doctor_id: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateIssueReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<u64>,
    /// Removes the assigned doctor; cannot be combined with `doctor_id`.
    #[serde(default)]
    pub unassign_doctor: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueRes {
    pub id: u64,
    pub patient_id: u64,
    pub doctor_id: Option<u64>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueDetailRes {
    pub issue: IssueRes,
    pub documents: Vec<DocumentRes>,
    pub comments: Vec<CommentRes>,
}

// Attachments

/// Narrows a listing to one issue.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueFilter {
    pub issue_id: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDocumentReq {
    pub issue_id: u64,
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentRes {
    pub id: u64,
    pub issue_id: u64,
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentReq {
    pub issue_id: u64,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommentReq {
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentRes {
    pub id: u64,
    pub issue_id: u64,
    pub author_id: u64,
    /// Author's name and role, e.g. `Jane Doe (doctor)`.
    pub author: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

// Patient requests

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestReq {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub issue_id: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestActionReq {
    /// `accept` or `decline`
    pub action: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestRes {
    pub id: u64,
    pub patient_id: u64,
    pub title: String,
    pub description: String,
    pub specialty: Option<String>,
    pub issue_id: Option<u64>,
    pub status: String,
    pub handled_by: Option<u64>,
    pub created_at: String,
    pub updated_at: String,
}
