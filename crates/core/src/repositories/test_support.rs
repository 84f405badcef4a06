//! Shared fixtures for service tests.

use crate::access::Actor;
use crate::config::CoreConfig;
use crate::model::{IssueId, PatientId, Role, Specialty, UserId};
use crate::repositories::accounts::{
    AccountService, NewDoctorProfile, NewPatientProfile, NewProfile, RegisterUser,
};
use crate::repositories::attachments::AttachmentService;
use crate::repositories::issues::{IssueService, NewIssue};
use crate::repositories::profiles::ProfileService;
use crate::repositories::requests::RequestService;
use crate::session::SessionRegistry;
use crate::store::Store;
use std::sync::Arc;

pub(crate) const PASSWORD: &str = "s3cure-pass";

fn capitalise(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn accounts() -> (AccountService, Arc<Store>) {
    let cfg = CoreConfig::in_memory().with_password_iterations(1);
    let store = Arc::new(Store::in_memory());
    let sessions = Arc::new(SessionRegistry::new(cfg.token_ttl()));
    (
        AccountService::new(Arc::new(cfg), store.clone(), sessions),
        store,
    )
}

pub(crate) fn registration(username: &str, role: Role, profile: Option<NewProfile>) -> RegisterUser {
    RegisterUser {
        username: username.into(),
        password: PASSWORD.into(),
        email: Some(format!("{username}@example.com")),
        first_name: capitalise(username),
        last_name: "Tester".into(),
        role,
        profile_picture: None,
        profile,
    }
}

pub(crate) fn patient_registration(username: &str, age: u32) -> RegisterUser {
    registration(
        username,
        Role::Patient,
        Some(NewProfile::Patient(NewPatientProfile { age })),
    )
}

pub(crate) struct Fixture {
    pub store: Arc<Store>,
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub issues: IssueService,
    pub attachments: AttachmentService,
    pub requests: RequestService,
}

impl Fixture {
    pub fn new() -> Self {
        let (accounts, store) = accounts();
        Self {
            profiles: ProfileService::new(store.clone()),
            issues: IssueService::new(store.clone()),
            attachments: AttachmentService::new(store.clone()),
            requests: RequestService::new(store.clone()),
            accounts,
            store,
        }
    }

    pub fn patient(&self, username: &str, age: u32) -> (Actor, PatientId) {
        let user = self
            .accounts
            .register(patient_registration(username, age))
            .unwrap();
        let patient_id = self
            .store
            .read(|t| Ok(t.patient_for_user(user.id).map(|p| p.id)))
            .unwrap()
            .unwrap();
        (Actor::new(user.id, Role::Patient), patient_id)
    }

    pub fn doctor(&self, username: &str, specialty: Specialty, license: &str) -> Actor {
        let profile = NewProfile::Doctor(NewDoctorProfile {
            specialty,
            license_number: license.into(),
            years_experience: 5,
        });
        let user = self
            .accounts
            .register(registration(username, Role::Doctor, Some(profile)))
            .unwrap();
        Actor::new(user.id, Role::Doctor)
    }

    pub fn issue_for(&self, patient: &Actor, doctor: Option<UserId>) -> IssueId {
        self.issues
            .create_issue(
                patient,
                NewIssue {
                    title: "Rash on forearm".into(),
                    description: "Appeared two days ago".into(),
                    doctor,
                },
            )
            .unwrap()
            .id
    }
}
