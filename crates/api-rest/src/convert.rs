//! Mapping from core records to response bodies.

use api_shared::{
    CommentRes, DocumentRes, DoctorRes, IssueDetailRes, IssueRes, PatientRes, RequestRes,
    SessionRes, UserRes,
};
use chrono::{DateTime, SecondsFormat, Utc};
use yaqeen_core::model::{
    CommentView, Document, DoctorProfile, Issue, IssueDetail, Patient, PatientRequest, User,
};
use yaqeen_core::Session;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn user(user: &User) -> UserRes {
    UserRes {
        id: user.id.0,
        username: user.username.clone(),
        email: user.email.as_ref().map(ToString::to_string),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role.as_str().into(),
        profile_picture: user.profile_picture.clone(),
        is_active: user.is_active,
        date_joined: timestamp(&user.date_joined),
    }
}

pub fn session(session: &Session) -> SessionRes {
    SessionRes {
        token: session.token.clone(),
        token_type: "Bearer".into(),
        expires_at: timestamp(&session.expires_at),
        user: user(&session.user),
    }
}

pub fn patient(patient: &Patient) -> PatientRes {
    PatientRes {
        id: patient.id.0,
        user_id: patient.user_id.0,
        age: patient.age,
    }
}

pub fn doctor(profile: &DoctorProfile) -> DoctorRes {
    DoctorRes {
        id: profile.doctor.user_id.0,
        username: profile.user.username.clone(),
        full_name: profile.user.full_name(),
        specialty: profile.doctor.specialty.as_str().into(),
        license_number: profile.doctor.license_number.clone(),
        years_experience: profile.doctor.years_experience,
    }
}

pub fn issue(issue: &Issue) -> IssueRes {
    IssueRes {
        id: issue.id.0,
        patient_id: issue.patient_id.0,
        doctor_id: issue.doctor.map(|d| d.0),
        title: issue.title.clone(),
        description: issue.description.clone(),
        status: issue.status.as_str().into(),
        created_at: timestamp(&issue.created_at),
        updated_at: timestamp(&issue.updated_at),
    }
}

pub fn issue_detail(detail: &IssueDetail) -> IssueDetailRes {
    IssueDetailRes {
        issue: issue(&detail.issue),
        documents: detail.documents.iter().map(document).collect(),
        comments: detail.comments.iter().map(comment).collect(),
    }
}

pub fn document(document: &Document) -> DocumentRes {
    DocumentRes {
        id: document.id.0,
        issue_id: document.issue_id.0,
        file_name: document.file_name.clone(),
        size_bytes: document.size_bytes,
        uploaded_at: timestamp(&document.uploaded_at),
    }
}

pub fn comment(view: &CommentView) -> CommentRes {
    let c = &view.comment;
    CommentRes {
        id: c.id.0,
        issue_id: c.issue_id.0,
        author_id: c.author_id.0,
        author: view.author.clone(),
        content: c.content.clone(),
        created_at: timestamp(&c.created_at),
        updated_at: timestamp(&c.updated_at),
    }
}

pub fn request(request: &PatientRequest) -> RequestRes {
    RequestRes {
        id: request.id.0,
        patient_id: request.patient_id.0,
        title: request.title.clone(),
        description: request.description.clone(),
        specialty: request.specialty.map(|s| s.as_str().into()),
        issue_id: request.issue_id.map(|i| i.0),
        status: request.status.as_str().into(),
        handled_by: request.handled_by.map(|u| u.0),
        created_at: timestamp(&request.created_at),
        updated_at: timestamp(&request.updated_at),
    }
}
