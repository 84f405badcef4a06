use crate::model::{IssueStatus, RequestStatus};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("issue cannot move from {from} to {to}")]
    InvalidIssueTransition { from: IssueStatus, to: IssueStatus },
    #[error("patient request has already been {0}")]
    RequestAlreadyDecided(RequestStatus),
    #[error("issue {0} is completed; its comments and documents are immutable")]
    IssueCompleted(u64),

    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing or invalid session token")]
    InvalidToken,
    #[error("session token expired")]
    TokenExpired,
    #[error("password hash is malformed")]
    MalformedPasswordHash,

    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("failed to read snapshot file: {0}")]
    SnapshotRead(std::io::Error),
    #[error("failed to write snapshot file: {0}")]
    SnapshotWrite(std::io::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize snapshot: {0}")]
    Deserialization(serde_json::Error),
}

impl CoreError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub(crate) fn invalid(field: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidInput(format!("{field}: {err}"))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
