//! Account management: registration, login and bearer sessions.
//!
//! Password hashing runs outside the store lock.
//!
//! Sessions live in this process only. Deactivation is also recorded on the user as a revocation
//! cutoff, so a deactivation written by another process (the admin CLI) ends the sessions held
//! here as soon as the store picks up the new snapshot.

use crate::access::Actor;
use crate::config::CoreConfig;
use crate::constants::PROFILE_PICTURE_EXTENSIONS;
use crate::error::{CoreError, CoreResult};
use crate::model::{Role, Specialty, User};
use crate::password::{hash_password, verify_password};
use crate::repositories::profiles::{insert_doctor_profile, insert_patient_profile};
use crate::session::SessionRegistry;
use crate::store::Store;
use crate::validation::{validate_file_extension, validate_name, validate_password, validate_username};
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock};
use yaqeen_types::EmailAddress;

/// Fields of a patient profile supplied at registration.
#[derive(Clone, Debug)]
pub struct NewPatientProfile {
    pub age: u32,
}

/// Fields of a doctor profile supplied at registration or profile creation.
#[derive(Clone, Debug)]
pub struct NewDoctorProfile {
    pub specialty: Specialty,
    pub license_number: String,
    pub years_experience: u32,
}

/// Profile created together with the account, matching its role.
#[derive(Clone, Debug)]
pub enum NewProfile {
    Patient(NewPatientProfile),
    Doctor(NewDoctorProfile),
}

#[derive(Clone, Debug)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub profile: Option<NewProfile>,
}

/// An authenticated session handed back to the client.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Clone)]
pub struct AccountService {
    cfg: Arc<CoreConfig>,
    store: Arc<Store>,
    sessions: Arc<SessionRegistry>,
    dummy_hash: Arc<OnceLock<String>>,
}

impl AccountService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<Store>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            cfg,
            store,
            sessions,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash checked against when no account matches, so misses cost as much as hits.
    fn dummy_hash(&self) -> &str {
        self.dummy_hash
            .get_or_init(|| hash_password("yaqeen-no-such-user", self.cfg.password_iterations()))
    }

    /// Create an account and, when supplied, its profile.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidInput` if any field fails validation or the profile does not match the role,
    /// - `Conflict` if the username or doctor licence number is already taken.
    pub fn register(&self, req: RegisterUser) -> CoreResult<User> {
        let username = validate_username(&req.username)?;
        validate_password(&req.password)?;
        let first_name = validate_name("first_name", &req.first_name)?;
        let last_name = validate_name("last_name", &req.last_name)?;
        let email = req
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|e| CoreError::invalid("email", e))?;
        let profile_picture = req
            .profile_picture
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| validate_file_extension(p, PROFILE_PICTURE_EXTENSIONS))
            .transpose()?;

        match (&req.role, &req.profile) {
            (Role::Patient, Some(NewProfile::Doctor(_))) | (Role::Doctor, Some(NewProfile::Patient(_))) => {
                return Err(CoreError::InvalidInput(format!(
                    "profile fields do not match role {}",
                    req.role
                )));
            }
            _ => {}
        }

        let password_hash = hash_password(&req.password, self.cfg.password_iterations());
        let now = Utc::now();

        let user = self.store.write(|tables| {
            if tables.user_by_username(&username).is_some() {
                return Err(CoreError::Conflict(format!(
                    "a user with username {username:?} already exists"
                )));
            }

            let id = tables.next_user_id();
            let user = User {
                id,
                username: username.clone(),
                email,
                first_name,
                last_name,
                role: req.role,
                profile_picture,
                password_hash,
                is_active: true,
                date_joined: now,
                sessions_revoked_at: None,
            };
            tables.users.insert(id, user.clone());

            match req.profile {
                Some(NewProfile::Patient(profile)) => {
                    insert_patient_profile(tables, id, profile.age)?;
                }
                Some(NewProfile::Doctor(profile)) => {
                    insert_doctor_profile(tables, id, profile)?;
                }
                None => {}
            }

            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown usernames, wrong passwords and deactivated accounts all answer
    /// `InvalidCredentials`, and each runs one password hash before answering.
    pub fn login(&self, username: &str, password: &str) -> CoreResult<Session> {
        let user = self
            .store
            .read(|tables| Ok(tables.user_by_username(username.trim()).cloned()))?;
        let Some(user) = user else {
            let _ = verify_password(password, self.dummy_hash());
            tracing::warn!("failed login for unknown user");
            return Err(CoreError::InvalidCredentials);
        };

        let matches = verify_password(password, &user.password_hash)?;
        if !matches || !user.is_active {
            tracing::warn!(user_id = %user.id, active = user.is_active, "failed login");
            return Err(CoreError::InvalidCredentials);
        }

        let issued = self.sessions.issue(user.id)?;
        tracing::info!(user_id = %user.id, "opened session");
        Ok(Session {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Exchange a live token for a fresh one.
    pub fn refresh(&self, token: &str) -> CoreResult<Session> {
        let (claims, issued) = self.sessions.rotate(token)?;
        let user = self.store.read(|tables| tables.user(claims.user_id).cloned());
        let user = match user {
            Ok(user) if user.honours_session(claims.issued_at) => user,
            _ => {
                self.sessions.revoke(&issued.token)?;
                return Err(CoreError::InvalidToken);
            }
        };
        Ok(Session {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    pub fn logout(&self, token: &str) -> CoreResult<()> {
        if !self.sessions.revoke(token)? {
            return Err(CoreError::InvalidToken);
        }
        Ok(())
    }

    /// Resolve a bearer token to the calling user.
    pub fn authenticate(&self, token: &str) -> CoreResult<Actor> {
        let claims = self.sessions.resolve(token)?;
        self.store.read(|tables| match tables.users.get(&claims.user_id) {
            Some(user) if user.honours_session(claims.issued_at) => {
                Ok(Actor::new(user.id, user.role))
            }
            _ => Err(CoreError::InvalidToken),
        })
    }

    pub fn me(&self, actor: &Actor) -> CoreResult<User> {
        self.store.read(|tables| tables.user(actor.user_id).cloned())
    }

    /// Deactivate or reactivate an account; deactivation ends all of its sessions.
    pub fn set_active(&self, username: &str, active: bool) -> CoreResult<User> {
        let user = self.store.write(|tables| {
            let id = tables
                .user_by_username(username)
                .map(|u| u.id)
                .ok_or_else(|| CoreError::InvalidInput(format!("no user named {username:?}")))?;
            let user = tables
                .users
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("user", id))?;
            user.is_active = active;
            if !active {
                user.sessions_revoked_at = Some(Utc::now());
            }
            Ok(user.clone())
        })?;
        if !active {
            self.sessions.revoke_user(user.id)?;
        }
        tracing::info!(user_id = %user.id, active, "changed account status");
        Ok(user)
    }
}
