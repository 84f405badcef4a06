//! Status machines for issues and patient requests.
//!
//! Issue: `pending -> accepted | declined`, `accepted -> completed`. Declined and completed
//! are terminal.
//!
//! Request: `pending -> accepted | declined`, decided once. Accepting a request either assigns
//! the issue it is attached to or opens a new accepted issue on the patient's behalf. An
//! attached issue already assigned to another doctor cannot be taken over.

use crate::error::{CoreError, CoreResult};
use crate::model::{
    Issue, IssueStatus, PatientRequest, RequestDecision, RequestId, RequestStatus, UserId,
};
use crate::store::Tables;
use chrono::{DateTime, Utc};

/// Validate an issue status change, returning the new status.
pub fn transition_issue(from: IssueStatus, to: IssueStatus) -> CoreResult<IssueStatus> {
    use IssueStatus::*;
    match (from, to) {
        (Pending, Accepted) | (Pending, Declined) | (Accepted, Completed) => Ok(to),
        _ => Err(CoreError::InvalidIssueTransition { from, to }),
    }
}

/// Validate a decision on a request, returning the request's new status.
pub fn decide(current: RequestStatus, decision: RequestDecision) -> CoreResult<RequestStatus> {
    if current != RequestStatus::Pending {
        return Err(CoreError::RequestAlreadyDecided(current));
    }
    Ok(match decision {
        RequestDecision::Accept => RequestStatus::Accepted,
        RequestDecision::Decline => RequestStatus::Declined,
    })
}

/// Record `doctor`'s decision on a request, creating or assigning its issue on acceptance.
///
/// The caller is responsible for authorising `doctor`; this only enforces the workflow.
pub(crate) fn apply_decision(
    tables: &mut Tables,
    request_id: RequestId,
    doctor: UserId,
    decision: RequestDecision,
    now: DateTime<Utc>,
) -> CoreResult<PatientRequest> {
    let request = tables.request(request_id)?.clone();
    let status = decide(request.status, decision)?;

    let issue_id = match (decision, request.issue_id) {
        (RequestDecision::Decline, attached) => attached,
        (RequestDecision::Accept, Some(issue_id)) => {
            let issue = tables.issue(issue_id)?;
            if issue.doctor.is_some_and(|assigned| assigned != doctor) {
                return Err(CoreError::Conflict(format!(
                    "issue {issue_id} is assigned to another doctor"
                )));
            }
            let accepted = transition_issue(issue.status, IssueStatus::Accepted)?;
            if let Some(issue) = tables.issues.get_mut(&issue_id) {
                issue.doctor = Some(doctor);
                issue.status = accepted;
                issue.updated_at = now;
            }
            Some(issue_id)
        }
        (RequestDecision::Accept, None) => {
            let id = tables.next_issue_id();
            tables.issues.insert(
                id,
                Issue {
                    id,
                    patient_id: request.patient_id,
                    doctor: Some(doctor),
                    title: request.title.clone(),
                    description: request.description.clone(),
                    status: IssueStatus::Accepted,
                    created_at: now,
                    updated_at: now,
                },
            );
            Some(id)
        }
    };

    let updated = PatientRequest {
        status,
        issue_id,
        handled_by: Some(doctor),
        updated_at: now,
        ..request
    };
    tables.requests.insert(request_id, updated.clone());
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatientId;

    fn tables_with_request(issue_id: Option<crate::model::IssueId>) -> (Tables, RequestId) {
        let mut t = Tables::default();
        let id = t.next_request_id();
        let now = Utc::now();
        t.requests.insert(
            id,
            PatientRequest {
                id,
                patient_id: PatientId(1),
                title: "Recurring chest pain".into(),
                description: "Worse after climbing stairs".into(),
                specialty: None,
                issue_id,
                status: RequestStatus::Pending,
                handled_by: None,
                created_at: now,
                updated_at: now,
            },
        );
        (t, id)
    }

    #[test]
    fn issue_transitions_follow_the_lifecycle() {
        use IssueStatus::*;
        assert_eq!(transition_issue(Pending, Accepted).unwrap(), Accepted);
        assert_eq!(transition_issue(Pending, Declined).unwrap(), Declined);
        assert_eq!(transition_issue(Accepted, Completed).unwrap(), Completed);

        for (from, to) in [
            (Pending, Completed),
            (Accepted, Declined),
            (Declined, Accepted),
            (Completed, Accepted),
            (Completed, Pending),
            (Accepted, Accepted),
        ] {
            assert!(
                matches!(
                    transition_issue(from, to),
                    Err(CoreError::InvalidIssueTransition { .. })
                ),
                "{from} -> {to} should be rejected"
            );
        }
    }

    #[test]
    fn requests_are_decided_once() {
        assert_eq!(
            decide(RequestStatus::Pending, RequestDecision::Decline).unwrap(),
            RequestStatus::Declined
        );
        assert!(matches!(
            decide(RequestStatus::Accepted, RequestDecision::Decline),
            Err(CoreError::RequestAlreadyDecided(RequestStatus::Accepted))
        ));
    }

    #[test]
    fn accepting_unattached_request_opens_assigned_issue() {
        let (mut t, id) = tables_with_request(None);
        let updated =
            apply_decision(&mut t, id, UserId(30), RequestDecision::Accept, Utc::now()).unwrap();

        assert_eq!(updated.status, RequestStatus::Accepted);
        assert_eq!(updated.handled_by, Some(UserId(30)));
        let issue = t.issue(updated.issue_id.unwrap()).unwrap();
        assert_eq!(issue.status, IssueStatus::Accepted);
        assert_eq!(issue.doctor, Some(UserId(30)));
        assert_eq!(issue.patient_id, PatientId(1));
        assert_eq!(issue.title, "Recurring chest pain");
    }

    #[test]
    fn accepting_attached_request_assigns_existing_issue() {
        let mut seed = Tables::default();
        let issue_id = seed.next_issue_id();
        let (mut t, id) = tables_with_request(Some(issue_id));
        let now = Utc::now();
        t.issues.insert(
            issue_id,
            Issue {
                id: issue_id,
                patient_id: PatientId(1),
                doctor: None,
                title: "Existing".into(),
                description: String::new(),
                status: IssueStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        );

        let updated = apply_decision(&mut t, id, UserId(30), RequestDecision::Accept, now).unwrap();
        assert_eq!(updated.issue_id, Some(issue_id));
        assert_eq!(t.issues.len(), 1);
        let issue = t.issue(issue_id).unwrap();
        assert_eq!(issue.doctor, Some(UserId(30)));
        assert_eq!(issue.status, IssueStatus::Accepted);
    }

    #[test]
    fn accepting_cannot_take_over_another_doctors_issue() {
        let mut seed = Tables::default();
        let issue_id = seed.next_issue_id();
        let (mut t, id) = tables_with_request(Some(issue_id));
        let now = Utc::now();
        t.issues.insert(
            issue_id,
            Issue {
                id: issue_id,
                patient_id: PatientId(1),
                doctor: Some(UserId(40)),
                title: "Chosen doctor".into(),
                description: String::new(),
                status: IssueStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        );

        let err = apply_decision(&mut t, id, UserId(30), RequestDecision::Accept, now);
        assert!(matches!(err, Err(CoreError::Conflict(_))));
        assert_eq!(t.issue(issue_id).unwrap().doctor, Some(UserId(40)));
        assert_eq!(t.request(id).unwrap().status, RequestStatus::Pending);

        let updated = apply_decision(&mut t, id, UserId(40), RequestDecision::Accept, now).unwrap();
        assert_eq!(updated.status, RequestStatus::Accepted);
        assert_eq!(t.issue(issue_id).unwrap().status, IssueStatus::Accepted);
    }

    #[test]
    fn declining_leaves_issues_alone() {
        let (mut t, id) = tables_with_request(None);
        let updated =
            apply_decision(&mut t, id, UserId(30), RequestDecision::Decline, Utc::now()).unwrap();
        assert_eq!(updated.status, RequestStatus::Declined);
        assert_eq!(updated.issue_id, None);
        assert!(t.issues.is_empty());

        let again = apply_decision(&mut t, id, UserId(31), RequestDecision::Accept, Utc::now());
        assert!(matches!(again, Err(CoreError::RequestAlreadyDecided(_))));
    }
}
