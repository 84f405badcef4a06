//! Bearer session registry.
//!
//! Tokens are 32 random bytes rendered as URL-safe base64. Only the SHA-256 digest of a token is
//! retained, so a leaked registry cannot be replayed. Expired entries are dropped lazily when
//! they are presented and whenever a new token is issued.

use crate::error::{CoreError, CoreResult};
use crate::model::UserId;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

type TokenHash = [u8; 32];

#[derive(Clone, Copy, Debug)]
struct SessionEntry {
    user_id: UserId,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// What a live token resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
}

/// A freshly issued bearer token. The plain token is only ever available here.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<TokenHash, SessionEntry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: UserId) -> CoreResult<IssuedToken> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn resolve(&self, token: &str) -> CoreResult<SessionClaims> {
        self.resolve_at(token, Utc::now())
    }

    /// Exchange a live token for a new one; the presented token stops working.
    pub fn rotate(&self, token: &str) -> CoreResult<(SessionClaims, IssuedToken)> {
        let now = Utc::now();
        let claims = self.resolve_at(token, now)?;
        self.revoke(token)?;
        let issued = self.issue_at(claims.user_id, now)?;
        Ok((claims, issued))
    }

    /// Returns whether the token was live.
    pub fn revoke(&self, token: &str) -> CoreResult<bool> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        Ok(sessions.remove(&hash_token(token)).is_some())
    }

    /// Drop every session belonging to `user_id`.
    pub fn revoke_user(&self, user_id: UserId) -> CoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        sessions.retain(|_, entry| entry.user_id != user_id);
        Ok(())
    }

    fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> CoreResult<IssuedToken> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| CoreError::InvalidInput("session ttl is out of range".into()))?;
        let token = generate_token();

        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                issued_at: now,
                expires_at,
            },
        );

        Ok(IssuedToken { token, expires_at })
    }

    fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> CoreResult<SessionClaims> {
        let key = hash_token(token);
        let entry = {
            let sessions = self.sessions.read().map_err(|_| CoreError::LockPoisoned)?;
            sessions.get(&key).copied()
        };

        match entry {
            None => Err(CoreError::InvalidToken),
            Some(entry) if entry.expires_at <= now => {
                let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
                sessions.remove(&key);
                Err(CoreError::TokenExpired)
            }
            Some(entry) => Ok(SessionClaims {
                user_id: entry.user_id,
                issued_at: entry.issued_at,
            }),
        }
    }
}

fn hash_token(token: &str) -> TokenHash {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
