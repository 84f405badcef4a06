//! Services over the record store.
//!
//! Each service takes the authenticated [`Actor`](crate::Actor) for every operation and applies
//! the access rules from [`crate::access`] before reading or changing anything.

pub mod accounts;
pub mod attachments;
pub mod issues;
pub mod profiles;
pub mod requests;

#[cfg(test)]
pub(crate) mod test_support;
