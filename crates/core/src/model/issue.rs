use super::{CommentId, DocumentId, IssueId, PatientId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Accepted => "accepted",
            IssueStatus::Declined => "declined",
            IssueStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub patient_id: PatientId,
    /// Assigned doctor, by user id.
    pub doctor: Option<UserId>,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_completed(&self) -> bool {
        self.status == IssueStatus::Completed
    }
}

/// Metadata for a file attached to an issue. File bytes are stored elsewhere.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub issue_id: IssueId,
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub issue_id: IssueId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its author's display name resolved.
#[derive(Clone, Debug)]
pub struct CommentView {
    pub comment: Comment,
    pub author: String,
}

/// An issue with its attachments, oldest first.
#[derive(Clone, Debug)]
pub struct IssueDetail {
    pub issue: Issue,
    pub documents: Vec<Document>,
    pub comments: Vec<CommentView>,
}
