//! Password hashing.
//!
//! Hashes are PBKDF2-HMAC-SHA256 encoded as
//! `pbkdf2_sha256$<iterations>$<salt, base64>$<hash, base64>` so that the iteration count can be
//! raised later without invalidating existing accounts.

use crate::constants::PASSWORD_HASH_ALGORITHM;
use crate::error::{CoreError, CoreResult};
use base64::{engine::general_purpose, Engine as _};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LENGTH] = rand::random();
    encode(password, &salt, iterations)
}

/// Check `password` against an encoded hash in constant time.
///
/// A malformed hash is an error rather than a mismatch so that corrupted records surface.
pub fn verify_password(password: &str, encoded: &str) -> CoreResult<bool> {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CoreError::MalformedPasswordHash);
    };
    if algorithm != PASSWORD_HASH_ALGORITHM {
        return Err(CoreError::MalformedPasswordHash);
    }

    let iterations: u32 = iterations
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(CoreError::MalformedPasswordHash)?;
    let salt = general_purpose::STANDARD
        .decode(salt)
        .map_err(|_| CoreError::MalformedPasswordHash)?;
    let expected = general_purpose::STANDARD
        .decode(expected)
        .map_err(|_| CoreError::MalformedPasswordHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(CoreError::MalformedPasswordHash);
    }

    let mut actual = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut actual);
    Ok(actual.as_slice().ct_eq(expected.as_slice()).into())
}

fn encode(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    format!(
        "{}${}${}${}",
        PASSWORD_HASH_ALGORITHM,
        iterations,
        general_purpose::STANDARD.encode(salt),
        general_purpose::STANDARD.encode(hash)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_correct_password_only() {
        let encoded = hash_password("correct horse", 10);
        assert!(verify_password("correct horse", &encoded).unwrap());
        assert!(!verify_password("correct horsf", &encoded).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw123456", 1), hash_password("pw123456", 1));
    }

    #[test]
    fn encoding_records_iterations() {
        let encoded = hash_password("secret12", 7);
        assert!(encoded.starts_with("pbkdf2_sha256$7$"));
    }

    #[test]
    fn malformed_hashes_are_errors() {
        for bad in [
            "",
            "md5$1$c2FsdA==$aGFzaA==",
            "pbkdf2_sha256$0$c2FsdA==$aGFzaA==",
            "pbkdf2_sha256$x$c2FsdA==$aGFzaA==",
            "pbkdf2_sha256$1$c2FsdA==$aGFzaA==",
            "pbkdf2_sha256$1$c2FsdA==$aGFzaA==$extra",
        ] {
            assert!(
                matches!(verify_password("pw", bad), Err(CoreError::MalformedPasswordHash)),
                "{bad:?} should be malformed"
            );
        }
    }
}
