//! Patient requests and their triage by doctors.

use crate::access::{self, Actor};
use crate::error::{CoreError, CoreResult};
use crate::model::{
    IssueId, IssueStatus, PatientRequest, RequestDecision, RequestId, RequestStatus, Specialty,
};
use crate::store::Store;
use crate::triage::apply_decision;
use crate::validation::validate_title;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    /// Restricts triage to doctors of this specialty; `None` lets any doctor decide.
    pub specialty: Option<Specialty>,
    /// An existing pending issue of the patient that the request is about.
    pub issue_id: Option<IssueId>,
}

#[derive(Clone)]
pub struct RequestService {
    store: Arc<Store>,
}

impl RequestService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Requests visible to the caller, newest first.
    ///
    /// Patients see their own; doctors see pending requests they can triage and the ones they
    /// already decided.
    pub fn list_requests(&self, actor: &Actor) -> CoreResult<Vec<PatientRequest>> {
        self.store.read(|tables| {
            let mut requests: Vec<_> = tables
                .requests()
                .filter(|r| access::can_view_request(actor, r, tables))
                .cloned()
                .collect();
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(requests)
        })
    }

    pub fn get_request(&self, actor: &Actor, id: RequestId) -> CoreResult<PatientRequest> {
        self.store
            .read(|tables| access::visible_request(actor, tables, id).cloned())
    }

    pub fn create_request(&self, actor: &Actor, req: NewRequest) -> CoreResult<PatientRequest> {
        let title = validate_title(&req.title)?;
        let now = Utc::now();

        let request = self.store.write(|tables| {
            let patient_id = access::own_patient(actor, tables)?.id;

            if let Some(issue_id) = req.issue_id {
                let issue = access::visible_issue(actor, tables, issue_id)?;
                if issue.status != IssueStatus::Pending {
                    return Err(CoreError::Conflict(format!(
                        "issue {issue_id} is {} and cannot be attached to a request",
                        issue.status
                    )));
                }
            }

            let id = tables.next_request_id();
            let request = PatientRequest {
                id,
                patient_id,
                title,
                description: req.description.trim().to_string(),
                specialty: req.specialty,
                issue_id: req.issue_id,
                status: RequestStatus::Pending,
                handled_by: None,
                created_at: now,
                updated_at: now,
            };
            tables.requests.insert(id, request.clone());
            Ok(request)
        })?;

        tracing::info!(request_id = %request.id, patient_id = %request.patient_id, "submitted patient request");
        Ok(request)
    }

    /// Accept or decline a pending request.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `Forbidden` if the caller is not a doctor with a profile, or their specialty does not
    ///   match the one the request asks for,
    /// - `NotFound` if the request does not exist or is not visible to the caller,
    /// - `RequestAlreadyDecided` if another decision was already recorded,
    /// - `Conflict` if accepting would reassign an attached issue that names another doctor.
    pub fn decide_request(
        &self,
        actor: &Actor,
        id: RequestId,
        decision: RequestDecision,
    ) -> CoreResult<PatientRequest> {
        let now = Utc::now();

        let request = self.store.write(|tables| {
            let doctor = access::own_doctor(actor, tables)?;
            let request = tables.request(id)?;
            if request.status != RequestStatus::Pending {
                if request.handled_by == Some(actor.user_id) {
                    return Err(CoreError::RequestAlreadyDecided(request.status));
                }
                return Err(CoreError::not_found("patient request", id));
            }
            if !access::can_triage(doctor, request) {
                return Err(CoreError::forbidden(format!(
                    "request {id} is reserved for {} doctors",
                    request.specialty.map_or("other", Specialty::as_str)
                )));
            }
            apply_decision(tables, id, actor.user_id, decision, now)
        })?;

        tracing::info!(
            request_id = %request.id,
            doctor_id = %actor.user_id,
            status = %request.status,
            "decided patient request"
        );
        Ok(request)
    }
}
