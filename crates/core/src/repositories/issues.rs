//! Issues raised by patients and the doctors' responses to them.

use crate::access::{self, Actor};
use crate::error::{CoreError, CoreResult};
use crate::model::{CommentView, Issue, IssueDetail, IssueId, IssueStatus, UserId};
use crate::store::{Store, Tables};
use crate::triage::transition_issue;
use crate::validation::validate_title;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    /// Doctor to assign straight away, by user id.
    pub doctor: Option<UserId>,
}

/// Partial update of an issue; `None` leaves a field unchanged.
///
/// `doctor: Some(None)` unassigns the issue.
#[derive(Clone, Debug, Default)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub doctor: Option<Option<UserId>>,
}

fn ensure_doctor_exists(tables: &Tables, doctor: Option<UserId>) -> CoreResult<()> {
    match doctor {
        Some(id) if !tables.doctors.contains_key(&id) => Err(CoreError::InvalidInput(format!(
            "doctor {id} does not exist"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn issue_detail(tables: &Tables, issue: &Issue) -> CoreResult<IssueDetail> {
    let documents = tables
        .documents
        .values()
        .filter(|d| d.issue_id == issue.id)
        .cloned()
        .collect();
    let comments = tables
        .comments
        .values()
        .filter(|c| c.issue_id == issue.id)
        .map(|c| comment_view(tables, c))
        .collect::<CoreResult<_>>()?;
    Ok(IssueDetail {
        issue: issue.clone(),
        documents,
        comments,
    })
}

pub(crate) fn comment_view(
    tables: &Tables,
    comment: &crate::model::Comment,
) -> CoreResult<CommentView> {
    Ok(CommentView {
        comment: comment.clone(),
        author: tables.user(comment.author_id)?.display_name(),
    })
}

#[derive(Clone)]
pub struct IssueService {
    store: Arc<Store>,
}

impl IssueService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Issues visible to the caller, newest first.
    pub fn list_issues(&self, actor: &Actor) -> CoreResult<Vec<Issue>> {
        self.store.read(|tables| {
            let mut issues: Vec<Issue> = tables
                .issues()
                .filter(|i| access::can_view_issue(actor, i, tables))
                .cloned()
                .collect();
            issues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(issues)
        })
    }

    pub fn get_issue(&self, actor: &Actor, id: IssueId) -> CoreResult<IssueDetail> {
        self.store.read(|tables| {
            let issue = access::visible_issue(actor, tables, id)?;
            issue_detail(tables, issue)
        })
    }

    /// Raise a new issue for the calling patient. New issues always start pending.
    pub fn create_issue(&self, actor: &Actor, new: NewIssue) -> CoreResult<Issue> {
        let title = validate_title(&new.title)?;
        let now = Utc::now();

        let issue = self.store.write(|tables| {
            let patient_id = access::own_patient(actor, tables)?.id;
            ensure_doctor_exists(tables, new.doctor)?;

            let id = tables.next_issue_id();
            let issue = Issue {
                id,
                patient_id,
                doctor: new.doctor,
                title,
                description: new.description.trim().to_string(),
                status: IssueStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            tables.issues.insert(id, issue.clone());
            Ok(issue)
        })?;

        tracing::info!(issue_id = %issue.id, patient_id = %issue.patient_id, "created issue");
        Ok(issue)
    }

    /// Edit an issue the caller raised. Completed issues are frozen and the assigned doctor
    /// can only change while the issue is pending.
    pub fn update_issue(&self, actor: &Actor, id: IssueId, update: IssueUpdate) -> CoreResult<Issue> {
        let title = update.title.as_deref().map(validate_title).transpose()?;

        self.store.write(|tables| {
            let issue = access::visible_issue(actor, tables, id)?;
            if !access::owns_issue(actor, issue, tables) {
                return Err(CoreError::forbidden("only the patient who raised an issue may edit it"));
            }
            access::ensure_open(issue)?;
            if let Some(doctor) = update.doctor {
                if doctor != issue.doctor && issue.status != IssueStatus::Pending {
                    return Err(CoreError::Conflict(format!(
                        "the doctor of a {} issue cannot be changed",
                        issue.status
                    )));
                }
                ensure_doctor_exists(tables, doctor)?;
            }

            let issue = tables
                .issues
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("issue", id))?;
            if let Some(title) = title {
                issue.title = title;
            }
            if let Some(description) = update.description {
                issue.description = description.trim().to_string();
            }
            if let Some(doctor) = update.doctor {
                issue.doctor = doctor;
            }
            issue.updated_at = Utc::now();
            Ok(issue.clone())
        })
    }

    /// Withdraw a pending issue the caller raised, with its attachments.
    pub fn delete_issue(&self, actor: &Actor, id: IssueId) -> CoreResult<()> {
        self.store.write(|tables| {
            let issue = access::visible_issue(actor, tables, id)?;
            if !access::owns_issue(actor, issue, tables) {
                return Err(CoreError::forbidden("only the patient who raised an issue may delete it"));
            }
            if issue.status != IssueStatus::Pending {
                return Err(CoreError::Conflict(format!(
                    "only pending issues can be deleted; this one is {}",
                    issue.status
                )));
            }
            tables.remove_issue_cascade(id);
            Ok(())
        })?;
        tracing::info!(issue_id = %id, "deleted issue");
        Ok(())
    }

    pub fn accept_issue(&self, actor: &Actor, id: IssueId) -> CoreResult<Issue> {
        self.set_status(actor, id, IssueStatus::Accepted)
    }

    pub fn decline_issue(&self, actor: &Actor, id: IssueId) -> CoreResult<Issue> {
        self.set_status(actor, id, IssueStatus::Declined)
    }

    pub fn complete_issue(&self, actor: &Actor, id: IssueId) -> CoreResult<Issue> {
        self.set_status(actor, id, IssueStatus::Completed)
    }

    fn set_status(&self, actor: &Actor, id: IssueId, to: IssueStatus) -> CoreResult<Issue> {
        let issue = self.store.write(|tables| {
            let issue = access::visible_issue(actor, tables, id)?;
            if !access::assigned_to_issue(actor, issue) {
                return Err(CoreError::forbidden("only the assigned doctor may change an issue's status"));
            }
            let status = transition_issue(issue.status, to)?;

            let issue = tables
                .issues
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("issue", id))?;
            issue.status = status;
            issue.updated_at = Utc::now();
            Ok(issue.clone())
        })?;
        tracing::info!(issue_id = %id, status = %issue.status, "changed issue status");
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Specialty;
    use crate::repositories::test_support::Fixture;

    #[test]
    fn only_patients_with_profiles_raise_issues() {
        let fx = Fixture::new();
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let err = fx
            .issues
            .create_issue(
                &doc,
                NewIssue {
                    title: "x".into(),
                    description: String::new(),
                    doctor: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn new_issues_are_pending_and_validate_title_and_doctor() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);

        let long = NewIssue {
            title: "t".repeat(201),
            description: String::new(),
            doctor: None,
        };
        assert!(matches!(fx.issues.create_issue(&alice, long), Err(CoreError::InvalidInput(_))));

        let ghost_doctor = NewIssue {
            title: "Rash".into(),
            description: String::new(),
            doctor: Some(UserId(404)),
        };
        assert!(matches!(
            fx.issues.create_issue(&alice, ghost_doctor),
            Err(CoreError::InvalidInput(_))
        ));

        let id = fx.issue_for(&alice, None);
        assert_eq!(fx.issues.get_issue(&alice, id).unwrap().issue.status, IssueStatus::Pending);
    }

    #[test]
    fn issue_lists_are_filtered_by_role() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let (bob, _) = fx.patient("bob", 40);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");

        fx.issue_for(&alice, Some(doc.user_id));
        fx.issue_for(&alice, None);
        fx.issue_for(&bob, None);

        assert_eq!(fx.issues.list_issues(&alice).unwrap().len(), 2);
        assert_eq!(fx.issues.list_issues(&bob).unwrap().len(), 1);
        assert_eq!(fx.issues.list_issues(&doc).unwrap().len(), 1);
    }

    #[test]
    fn other_patients_get_not_found() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let (bob, _) = fx.patient("bob", 40);
        let id = fx.issue_for(&alice, None);
        assert!(matches!(
            fx.issues.get_issue(&bob, id),
            Err(CoreError::NotFound { kind: "issue", .. })
        ));
    }

    #[test]
    fn assigned_doctor_drives_the_lifecycle() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let id = fx.issue_for(&alice, Some(doc.user_id));

        assert!(matches!(
            fx.issues.accept_issue(&alice, id),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            fx.issues.complete_issue(&doc, id),
            Err(CoreError::InvalidIssueTransition { .. })
        ));
        assert_eq!(fx.issues.accept_issue(&doc, id).unwrap().status, IssueStatus::Accepted);
        assert_eq!(fx.issues.complete_issue(&doc, id).unwrap().status, IssueStatus::Completed);
        assert!(fx.issues.decline_issue(&doc, id).is_err());
    }

    #[test]
    fn doctor_change_only_while_pending() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let a = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let b = fx.doctor("drb", Specialty::Radiology, "LIC-2");
        let id = fx.issue_for(&alice, Some(a.user_id));

        let moved = fx
            .issues
            .update_issue(
                &alice,
                id,
                IssueUpdate {
                    doctor: Some(Some(b.user_id)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.doctor, Some(b.user_id));

        fx.issues.accept_issue(&b, id).unwrap();
        let err = fx
            .issues
            .update_issue(
                &alice,
                id,
                IssueUpdate {
                    doctor: Some(None),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        let retitled = fx
            .issues
            .update_issue(
                &alice,
                id,
                IssueUpdate {
                    title: Some("Persistent rash".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(retitled.title, "Persistent rash");
    }

    #[test]
    fn completed_issues_are_frozen_and_only_pending_ones_deleted() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let id = fx.issue_for(&alice, Some(doc.user_id));
        fx.issues.accept_issue(&doc, id).unwrap();

        assert!(matches!(fx.issues.delete_issue(&alice, id), Err(CoreError::Conflict(_))));
        fx.issues.complete_issue(&doc, id).unwrap();
        assert!(matches!(
            fx.issues.update_issue(&alice, id, IssueUpdate::default()),
            Err(CoreError::IssueCompleted(_))
        ));

        let pending = fx.issue_for(&alice, None);
        fx.issues.delete_issue(&alice, pending).unwrap();
        assert!(fx.issues.get_issue(&alice, pending).is_err());
    }
}
