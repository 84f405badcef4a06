/// Why an `Authorization` header could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthHeaderError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header is not a bearer token")]
    NotBearer,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is ignored.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthHeaderError> {
    let header = header.ok_or(AuthHeaderError::Missing)?.trim();
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthHeaderError::NotBearer)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthHeaderError::NotBearer);
    }
    Ok(token)
}
