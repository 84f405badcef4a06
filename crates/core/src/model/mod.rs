//! Record types held by the store.
//!
//! Every record type has its own identifier newtype so that, for example, a patient id can
//! never be passed where an issue id is expected. Identifiers are allocated sequentially per
//! table starting at 1.

mod issue;
mod profile;
mod request;
mod user;

pub use issue::{Comment, CommentView, Document, Issue, IssueDetail, IssueStatus};
pub use profile::{Doctor, DoctorProfile, Patient, Specialty};
pub use request::{PatientRequest, RequestDecision, RequestStatus};
pub use user::{Role, User};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

record_id!(
    /// Identifier of a [`User`]. Doctors are keyed by their user id.
    UserId
);
record_id!(PatientId);
record_id!(IssueId);
record_id!(DocumentId);
record_id!(CommentId);
record_id!(RequestId);
