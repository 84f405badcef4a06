use super::{IssueId, PatientId, RequestId, Specialty, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A doctor's answer to a pending patient request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Accept,
    Decline,
}

impl FromStr for RequestDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(RequestDecision::Accept),
            "decline" => Ok(RequestDecision::Decline),
            other => Err(format!("unknown action {other:?} (expected accept or decline)")),
        }
    }
}

/// Free-form patient request awaiting triage by a doctor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientRequest {
    pub id: RequestId,
    pub patient_id: PatientId,
    pub title: String,
    pub description: String,
    /// Restricts which doctors may act on the request.
    pub specialty: Option<Specialty>,
    /// Issue the request is attached to; set on acceptance when none was given.
    pub issue_id: Option<IssueId>,
    pub status: RequestStatus,
    pub handled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
