use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use yaqeen_types::EmailAddress;

/// Account role. Decides which profile a user may own and which records they see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role {other:?} (expected patient or doctor)")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<EmailAddress>,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    /// Sessions issued before this instant are no longer honoured.
    #[serde(default)]
    pub sessions_revoked_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether a session issued at `issued_at` still belongs to a usable account.
    pub fn honours_session(&self, issued_at: DateTime<Utc>) -> bool {
        self.is_active && self.sessions_revoked_at.map_or(true, |cutoff| issued_at >= cutoff)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Name shown as a comment author: `"Jane Doe (doctor)"`, or the username when no name is set.
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        let name = if name.is_empty() {
            self.username.as_str()
        } else {
            name.as_str()
        };
        format!("{} ({})", name, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId(1),
            username: "jdoe".into(),
            email: None,
            first_name: first.into(),
            last_name: last.into(),
            role: Role::Doctor,
            profile_picture: None,
            password_hash: String::new(),
            is_active: true,
            date_joined: Utc::now(),
            sessions_revoked_at: None,
        }
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("PATIENT".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!(" Doctor ".parse::<Role>().unwrap(), Role::Doctor);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn revocation_cutoff_rejects_older_sessions() {
        let mut u = user("Jane", "Doe");
        let before = Utc::now() - chrono::Duration::minutes(5);
        assert!(u.honours_session(before));

        u.sessions_revoked_at = Some(Utc::now());
        assert!(!u.honours_session(before));
        assert!(u.honours_session(Utc::now() + chrono::Duration::seconds(1)));

        u.is_active = false;
        assert!(!u.honours_session(Utc::now() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(user("Jane", "Doe").display_name(), "Jane Doe (doctor)");
        assert_eq!(user("", "").display_name(), "jdoe (doctor)");
        assert_eq!(user("Jane", "").display_name(), "Jane (doctor)");
    }
}
