//! # Yaqeen Core
//!
//! Core business logic for the Yaqeen medical issue tracker.
//!
//! This crate contains the record model, the access rules and the services over them:
//! - Accounts with salted password hashes and bearer sessions
//! - Patient and doctor profiles
//! - Issues, their comments and documents
//! - Patient requests and their triage by doctors
//!
//! Records live in memory and are optionally snapshotted to a JSON file after every change.
//!
//! **No API concerns**: HTTP servers, request parsing and response shapes belong in `api-rest`
//! and `api-shared`.

pub mod access;
pub mod config;
pub mod constants;
mod error;
pub mod model;
pub mod password;
pub mod repositories;
pub mod session;
pub mod store;
pub mod triage;
pub mod validation;

pub use access::Actor;
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use repositories::accounts::{
    AccountService, NewDoctorProfile, NewPatientProfile, NewProfile, RegisterUser, Session,
};
pub use repositories::attachments::AttachmentService;
pub use repositories::issues::{IssueService, IssueUpdate, NewIssue};
pub use repositories::profiles::{DoctorUpdate, ProfileService};
pub use repositories::requests::{NewRequest, RequestService};
pub use session::SessionRegistry;
pub use store::Store;

use std::sync::Arc;

/// Every service, wired to one store and one session registry.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub issues: IssueService,
    pub attachments: AttachmentService,
    pub requests: RequestService,
}

impl Services {
    /// Open the store described by `cfg` and build the services over it.
    pub fn open(cfg: CoreConfig) -> CoreResult<Self> {
        let store = Arc::new(Store::open(&cfg)?);
        Ok(Self::with_store(Arc::new(cfg), store))
    }

    pub fn with_store(cfg: Arc<CoreConfig>, store: Arc<Store>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(cfg.token_ttl()));
        Self {
            accounts: AccountService::new(cfg, store.clone(), sessions),
            profiles: ProfileService::new(store.clone()),
            issues: IssueService::new(store.clone()),
            attachments: AttachmentService::new(store.clone()),
            requests: RequestService::new(store),
        }
    }
}
