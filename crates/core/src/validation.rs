//! Input validation utilities.
//!
//! This module contains functions for validating user inputs to ensure they meet
//! safety and correctness requirements before being stored.

use crate::constants::{
    MAX_DOCUMENT_BYTES, MAX_ISSUE_TITLE_LEN, MAX_NAME_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN,
};
use crate::{CoreError, CoreResult};
use yaqeen_types::NonEmptyText;

/// Validates a username: non-empty, bounded, letters, digits and `@.+-_` only.
pub fn validate_username(username: &str) -> CoreResult<String> {
    let username = NonEmptyText::bounded(username, MAX_USERNAME_LEN)
        .map_err(|e| CoreError::invalid("username", e))?;

    let ok = username
        .as_str()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !ok {
        return Err(CoreError::InvalidInput(
            "username may only contain letters, digits and @/./+/-/_".into(),
        ));
    }

    Ok(username.into_string())
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "password cannot be blank".into(),
        ));
    }
    Ok(())
}

/// First and last names are optional but bounded.
pub fn validate_name(field: &str, value: &str) -> CoreResult<String> {
    let value = value.trim();
    if value.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::InvalidInput(format!(
            "{field} exceeds maximum length of {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn validate_title(title: &str) -> CoreResult<String> {
    NonEmptyText::bounded(title, MAX_ISSUE_TITLE_LEN)
        .map(NonEmptyText::into_string)
        .map_err(|e| CoreError::invalid("title", e))
}

/// Checks a file name against an allow-list of extensions, case-insensitively.
pub fn validate_file_extension(file_name: &str, allowed: &[&str]) -> CoreResult<String> {
    let name = NonEmptyText::new(file_name).map_err(|e| CoreError::invalid("file", e))?;

    if name.as_str().contains(['/', '\\']) {
        return Err(CoreError::InvalidInput(
            "file name must not contain path separators".into(),
        ));
    }

    let extension = name
        .as_str()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !allowed.contains(&extension.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "file extension {extension:?} is not allowed (allowed: {})",
            allowed.join(", ")
        )));
    }

    Ok(name.into_string())
}

pub fn validate_document_size(size_bytes: u64) -> CoreResult<()> {
    if size_bytes == 0 {
        return Err(CoreError::InvalidInput("document is empty".into()));
    }
    if size_bytes > MAX_DOCUMENT_BYTES {
        return Err(CoreError::InvalidInput(format!(
            "document exceeds maximum size of {MAX_DOCUMENT_BYTES} bytes"
        )));
    }
    Ok(())
}
