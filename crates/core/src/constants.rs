//! Constants used throughout the Yaqeen core crate.
//!
//! Field limits mirror the column constraints of the record types so that validation and
//! storage agree on a single definition.

/// Default session lifetime when no explicit TTL is configured.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Longest session lifetime the configuration accepts (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Default PBKDF2 iteration count for stored password hashes.
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 600_000;

/// Algorithm tag prefixed to encoded password hashes.
pub const PASSWORD_HASH_ALGORITHM: &str = "pbkdf2_sha256";

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_NAME_LEN: usize = 150;
pub const MAX_ISSUE_TITLE_LEN: usize = 200;
pub const MAX_LICENSE_NUMBER_LEN: usize = 50;

/// Extensions accepted for issue documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Extensions accepted for profile pictures.
pub const PROFILE_PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Upper bound for a single document (5 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 5 * 1024 * 1024;
