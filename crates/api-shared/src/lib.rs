//! # API Shared
//!
//! Shared utilities and definitions for the Yaqeen APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Bearer header parsing
//!
//! Used by `api-rest`; kept free of core types so that API shapes change independently of the
//! record model.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::{HealthRes, HealthService};
