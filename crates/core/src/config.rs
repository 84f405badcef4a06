//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{DEFAULT_PASSWORD_ITERATIONS, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use crate::{CoreError, CoreResult};
use chrono::Duration;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: Option<PathBuf>,
    token_ttl: Duration,
    password_iterations: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `data_file` is the JSON snapshot location; `None` keeps all records in memory.
    pub fn new(
        data_file: Option<PathBuf>,
        token_ttl: Duration,
        password_iterations: u32,
    ) -> CoreResult<Self> {
        if token_ttl <= Duration::zero() || token_ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(CoreError::InvalidInput(format!(
                "token ttl must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        if password_iterations == 0 {
            return Err(CoreError::InvalidInput(
                "password iterations must be at least 1".into(),
            ));
        }
        if let Some(path) = &data_file {
            if path.as_os_str().is_empty() || path.is_dir() {
                return Err(CoreError::InvalidInput(format!(
                    "data file must be a file path: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            data_file,
            token_ttl,
            password_iterations,
        })
    }

    /// Memory-only configuration with defaults, as used by tests and the CLI dry runs.
    pub fn in_memory() -> Self {
        Self {
            data_file: None,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
        }
    }

    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations.max(1);
        self
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
    }
}

/// Parse the session TTL from an optional environment value in seconds.
///
/// If `value` is `None` or empty/whitespace, returns the default TTL. Values above one year are
/// rejected.
pub fn token_ttl_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    let secs = parse_positive(value, "YAQEEN_TOKEN_TTL_SECS")?.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    if secs > MAX_TOKEN_TTL_SECS {
        return Err(CoreError::InvalidInput(format!(
            "YAQEEN_TOKEN_TTL_SECS must be at most {MAX_TOKEN_TTL_SECS}, got {secs}"
        )));
    }
    Duration::try_seconds(secs).ok_or_else(|| {
        CoreError::InvalidInput("YAQEEN_TOKEN_TTL_SECS is out of range".into())
    })
}

/// Parse the PBKDF2 iteration count from an optional environment value.
pub fn password_iterations_from_env_value(value: Option<String>) -> CoreResult<u32> {
    match parse_positive(value, "YAQEEN_PASSWORD_ITERATIONS")? {
        None => Ok(DEFAULT_PASSWORD_ITERATIONS),
        Some(n) => u32::try_from(n).map_err(|_| {
            CoreError::InvalidInput("YAQEEN_PASSWORD_ITERATIONS is out of range".into())
        }),
    }
}

/// Treat an empty or whitespace-only value as unset.
pub fn data_file_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_positive(value: Option<String>, name: &str) -> CoreResult<Option<i64>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(CoreError::InvalidInput(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}
