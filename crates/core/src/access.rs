//! Role-based authorization.
//!
//! Visibility follows the list filters: a patient sees their own profile, issues and requests;
//! a doctor sees every patient, the issues assigned to them and the requests they can triage.
//! Records outside the caller's visible set are reported as not found, so their existence is
//! not disclosed. Visible records the caller may not change are reported as forbidden.

use crate::error::{CoreError, CoreResult};
use crate::model::{
    Comment, CommentId, Doctor, Document, DocumentId, Issue, IssueId, Patient, PatientId,
    PatientRequest, RequestId, RequestStatus, Role, UserId,
};
use crate::store::Tables;

/// The authenticated caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// The caller's patient profile; only patients with a profile qualify.
pub fn own_patient<'t>(actor: &Actor, tables: &'t Tables) -> CoreResult<&'t Patient> {
    if actor.role != Role::Patient {
        return Err(CoreError::forbidden("only patients may do this"));
    }
    tables
        .patient_for_user(actor.user_id)
        .ok_or_else(|| CoreError::forbidden("a patient profile is required"))
}

/// The caller's doctor profile; only doctors with a profile qualify.
pub fn own_doctor<'t>(actor: &Actor, tables: &'t Tables) -> CoreResult<&'t Doctor> {
    if actor.role != Role::Doctor {
        return Err(CoreError::forbidden("only doctors may do this"));
    }
    tables
        .doctors
        .get(&actor.user_id)
        .ok_or_else(|| CoreError::forbidden("a doctor profile is required"))
}

pub fn can_view_patient(actor: &Actor, patient: &Patient) -> bool {
    match actor.role {
        Role::Patient => patient.user_id == actor.user_id,
        Role::Doctor => true,
    }
}

pub fn can_view_doctor(actor: &Actor, doctor: &Doctor) -> bool {
    match actor.role {
        Role::Patient => true,
        Role::Doctor => doctor.user_id == actor.user_id,
    }
}

/// Whether the caller is the patient who raised `issue`.
pub fn owns_issue(actor: &Actor, issue: &Issue, tables: &Tables) -> bool {
    actor.role == Role::Patient
        && tables
            .patients
            .get(&issue.patient_id)
            .is_some_and(|p| p.user_id == actor.user_id)
}

/// Whether the caller is the doctor assigned to `issue`.
pub fn assigned_to_issue(actor: &Actor, issue: &Issue) -> bool {
    actor.role == Role::Doctor && issue.doctor == Some(actor.user_id)
}

pub fn can_view_issue(actor: &Actor, issue: &Issue, tables: &Tables) -> bool {
    owns_issue(actor, issue, tables) || assigned_to_issue(actor, issue)
}

/// Whether `doctor` may accept or decline `request`.
pub fn can_triage(doctor: &Doctor, request: &PatientRequest) -> bool {
    request
        .specialty
        .map_or(true, |wanted| wanted == doctor.specialty)
}

pub fn can_view_request(actor: &Actor, request: &PatientRequest, tables: &Tables) -> bool {
    match actor.role {
        Role::Patient => tables
            .patients
            .get(&request.patient_id)
            .is_some_and(|p| p.user_id == actor.user_id),
        Role::Doctor => {
            if request.handled_by == Some(actor.user_id) {
                return true;
            }
            request.status == RequestStatus::Pending
                && tables
                    .doctors
                    .get(&actor.user_id)
                    .is_some_and(|d| can_triage(d, request))
        }
    }
}

/// Rejects changes to the attachments of a completed issue.
pub fn ensure_open(issue: &Issue) -> CoreResult<()> {
    if issue.is_completed() {
        return Err(CoreError::IssueCompleted(issue.id.0));
    }
    Ok(())
}

pub fn visible_patient<'t>(
    actor: &Actor,
    tables: &'t Tables,
    id: PatientId,
) -> CoreResult<&'t Patient> {
    let patient = tables.patient(id)?;
    if !can_view_patient(actor, patient) {
        return Err(CoreError::not_found("patient", id));
    }
    Ok(patient)
}

pub fn visible_doctor<'t>(actor: &Actor, tables: &'t Tables, id: UserId) -> CoreResult<&'t Doctor> {
    let doctor = tables.doctor(id)?;
    if !can_view_doctor(actor, doctor) {
        return Err(CoreError::not_found("doctor", id));
    }
    Ok(doctor)
}

pub fn visible_issue<'t>(actor: &Actor, tables: &'t Tables, id: IssueId) -> CoreResult<&'t Issue> {
    let issue = tables.issue(id)?;
    if !can_view_issue(actor, issue, tables) {
        return Err(CoreError::not_found("issue", id));
    }
    Ok(issue)
}

pub fn visible_comment<'t>(
    actor: &Actor,
    tables: &'t Tables,
    id: CommentId,
) -> CoreResult<&'t Comment> {
    let comment = tables.comment(id)?;
    match tables.issues.get(&comment.issue_id) {
        Some(issue) if can_view_issue(actor, issue, tables) => Ok(comment),
        _ => Err(CoreError::not_found("comment", id)),
    }
}

pub fn visible_document<'t>(
    actor: &Actor,
    tables: &'t Tables,
    id: DocumentId,
) -> CoreResult<&'t Document> {
    let document = tables.document(id)?;
    match tables.issues.get(&document.issue_id) {
        Some(issue) if can_view_issue(actor, issue, tables) => Ok(document),
        _ => Err(CoreError::not_found("document", id)),
    }
}

pub fn visible_request<'t>(
    actor: &Actor,
    tables: &'t Tables,
    id: RequestId,
) -> CoreResult<&'t PatientRequest> {
    let request = tables.request(id)?;
    if !can_view_request(actor, request, tables) {
        return Err(CoreError::not_found("patient request", id));
    }
    Ok(request)
}
