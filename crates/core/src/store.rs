//! In-process record store.
//!
//! All record tables live behind a single `RwLock`. Reads share the lock; writes stage their
//! changes on a copy of the tables, persist the copy to the JSON snapshot (when one is
//! configured) and only then publish it. A failed write therefore leaves both memory and disk
//! untouched. A snapshot replaced by another process is picked up on the next read or write.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::{
    Comment, CommentId, Doctor, Document, DocumentId, Issue, IssueId, Patient, PatientId,
    PatientRequest, RequestId, User, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct Sequences {
    user: u64,
    patient: u64,
    issue: u64,
    document: u64,
    comment: u64,
    request: u64,
}

/// Every record table plus the id sequences.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tables {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) patients: BTreeMap<PatientId, Patient>,
    pub(crate) doctors: BTreeMap<UserId, Doctor>,
    pub(crate) issues: BTreeMap<IssueId, Issue>,
    pub(crate) documents: BTreeMap<DocumentId, Document>,
    pub(crate) comments: BTreeMap<CommentId, Comment>,
    pub(crate) requests: BTreeMap<RequestId, PatientRequest>,
    #[serde(default)]
    sequences: Sequences,
}

impl Tables {
    pub(crate) fn next_user_id(&mut self) -> UserId {
        self.sequences.user += 1;
        UserId(self.sequences.user)
    }

    pub(crate) fn next_patient_id(&mut self) -> PatientId {
        self.sequences.patient += 1;
        PatientId(self.sequences.patient)
    }

    pub(crate) fn next_issue_id(&mut self) -> IssueId {
        self.sequences.issue += 1;
        IssueId(self.sequences.issue)
    }

    pub(crate) fn next_document_id(&mut self) -> DocumentId {
        self.sequences.document += 1;
        DocumentId(self.sequences.document)
    }

    pub(crate) fn next_comment_id(&mut self) -> CommentId {
        self.sequences.comment += 1;
        CommentId(self.sequences.comment)
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.sequences.request += 1;
        RequestId(self.sequences.request)
    }

    pub fn user(&self, id: UserId) -> CoreResult<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    pub fn patient(&self, id: PatientId) -> CoreResult<&Patient> {
        self.patients
            .get(&id)
            .ok_or_else(|| CoreError::not_found("patient", id))
    }

    pub fn doctor(&self, id: UserId) -> CoreResult<&Doctor> {
        self.doctors
            .get(&id)
            .ok_or_else(|| CoreError::not_found("doctor", id))
    }

    pub fn issue(&self, id: IssueId) -> CoreResult<&Issue> {
        self.issues
            .get(&id)
            .ok_or_else(|| CoreError::not_found("issue", id))
    }

    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents
            .get(&id)
            .ok_or_else(|| CoreError::not_found("document", id))
    }

    pub fn comment(&self, id: CommentId) -> CoreResult<&Comment> {
        self.comments
            .get(&id)
            .ok_or_else(|| CoreError::not_found("comment", id))
    }

    pub fn request(&self, id: RequestId) -> CoreResult<&PatientRequest> {
        self.requests
            .get(&id)
            .ok_or_else(|| CoreError::not_found("patient request", id))
    }

    pub fn patient_for_user(&self, user_id: UserId) -> Option<&Patient> {
        self.patients.values().find(|p| p.user_id == user_id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn doctors(&self) -> impl Iterator<Item = &Doctor> {
        self.doctors.values()
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn requests(&self) -> impl Iterator<Item = &PatientRequest> {
        self.requests.values()
    }

    /// Removes an issue together with its documents, comments and any requests attached to it.
    pub(crate) fn remove_issue_cascade(&mut self, id: IssueId) {
        self.issues.remove(&id);
        self.documents.retain(|_, d| d.issue_id != id);
        self.comments.retain(|_, c| c.issue_id != id);
        for request in self.requests.values_mut() {
            if request.issue_id == Some(id) {
                request.issue_id = None;
            }
        }
    }
}

/// Size and modification time of the snapshot file as last loaded or written by this store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    seen: Option<Fingerprint>,
}

/// Shared handle to the record tables.
///
/// Several processes may open the same snapshot (the server and the admin CLI). Before every
/// read and write the store compares the file against the version it last saw and reloads it
/// when another process has replaced it, so a write always applies on top of the newest
/// snapshot. There is no cross-process lock: two writes landing within the same instant can
/// still race.
#[derive(Debug)]
pub struct Store {
    state: RwLock<State>,
    snapshot: Option<PathBuf>,
}

impl Store {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            snapshot: None,
        }
    }

    /// Open the store described by `cfg`, loading the snapshot file if it already exists.
    pub fn open(cfg: &CoreConfig) -> CoreResult<Self> {
        let Some(path) = cfg.data_file() else {
            return Ok(Self::in_memory());
        };

        let mut state = State::default();
        if load_if_changed(path, &mut state)? {
            tracing::info!(
                path = %path.display(),
                users = state.tables.users.len(),
                issues = state.tables.issues.len(),
                "loaded snapshot"
            );
        } else {
            tracing::info!(path = %path.display(), "no snapshot yet; starting empty");
        }

        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path.to_path_buf()),
        })
    }

    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> CoreResult<T>) -> CoreResult<T> {
        if let Some(path) = &self.snapshot {
            let current = fingerprint(path)?;
            let stale = {
                let guard = self.state.read().map_err(|_| CoreError::LockPoisoned)?;
                current.is_some() && guard.seen != current
            };
            if stale {
                let mut guard = self.state.write().map_err(|_| CoreError::LockPoisoned)?;
                reload(path, &mut guard)?;
            }
        }
        let guard = self.state.read().map_err(|_| CoreError::LockPoisoned)?;
        f(&guard.tables)
    }

    /// Apply `f` to a staged copy of the tables and publish it if `f` and persistence succeed.
    pub fn write<T>(&self, f: impl FnOnce(&mut Tables) -> CoreResult<T>) -> CoreResult<T> {
        let mut guard = self.state.write().map_err(|_| CoreError::LockPoisoned)?;
        if let Some(path) = &self.snapshot {
            reload(path, &mut guard)?;
        }
        let mut staged = guard.tables.clone();
        let out = f(&mut staged)?;
        if let Some(path) = &self.snapshot {
            persist(path, &staged)?;
            guard.seen = fingerprint(path)?;
        }
        guard.tables = staged;
        Ok(out)
    }
}

fn fingerprint(path: &Path) -> CoreResult<Option<Fingerprint>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(Fingerprint {
            modified: meta.modified().map_err(CoreError::SnapshotRead)?,
            len: meta.len(),
        })),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::SnapshotRead(e)),
    }
}

/// Replace `state` with the file contents when the file differs from what `state` last saw.
///
/// A missing file leaves `state` alone. Returns whether anything was loaded.
fn load_if_changed(path: &Path, state: &mut State) -> CoreResult<bool> {
    let current = fingerprint(path)?;
    if current.is_none() || current == state.seen {
        return Ok(false);
    }
    // fingerprint first: a replacement racing this read shows up as a mismatch next time
    let contents = fs::read_to_string(path).map_err(CoreError::SnapshotRead)?;
    state.tables = serde_json::from_str(&contents).map_err(CoreError::Deserialization)?;
    state.seen = current;
    Ok(true)
}

fn reload(path: &Path, state: &mut State) -> CoreResult<()> {
    if load_if_changed(path, state)? {
        tracing::info!(path = %path.display(), "reloaded snapshot changed by another process");
    }
    Ok(())
}

fn persist(path: &Path, tables: &Tables) -> CoreResult<()> {
    let json = serde_json::to_vec_pretty(tables).map_err(CoreError::Serialization)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(CoreError::SnapshotWrite)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(CoreError::SnapshotWrite)?;
    fs::rename(&tmp, path).map_err(CoreError::SnapshotWrite)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, User};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn insert_user(tables: &mut Tables, username: &str) -> UserId {
        let id = tables.next_user_id();
        tables.users.insert(
            id,
            User {
                id,
                username: username.into(),
                email: None,
                first_name: String::new(),
                last_name: String::new(),
                role: Role::Patient,
                profile_picture: None,
                password_hash: String::new(),
                is_active: true,
                date_joined: Utc::now(),
                sessions_revoked_at: None,
            },
        );
        id
    }

    fn cfg(path: PathBuf) -> CoreConfig {
        CoreConfig::new(Some(path), Duration::seconds(60), 1).unwrap()
    }

    #[test]
    fn failed_write_leaves_tables_untouched() {
        let store = Store::in_memory();
        let result: CoreResult<()> = store.write(|t| {
            insert_user(t, "ghost");
            Err(CoreError::Conflict("nope".into()))
        });
        assert!(result.is_err());
        let count = store.read(|t| Ok(t.users().count())).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn snapshot_round_trips_records_and_sequences() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("yaqeen.json");

        let store = Store::open(&cfg(path.clone())).unwrap();
        store.write(|t| Ok(insert_user(t, "alice"))).unwrap();
        let bob = store.write(|t| Ok(insert_user(t, "bob"))).unwrap();
        store
            .write(|t| {
                t.users.remove(&bob);
                Ok(())
            })
            .unwrap();
        assert!(path.is_file());

        let reopened = Store::open(&cfg(path)).unwrap();
        let next = reopened.write(|t| Ok(insert_user(t, "carol"))).unwrap();
        // ids are never reused, even after the highest one was deleted
        assert_eq!(next, UserId(3));
        let alice = reopened
            .read(|t| Ok(t.user_by_username("alice").map(|u| u.id)))
            .unwrap();
        assert_eq!(alice, Some(UserId(1)));
    }

    #[test]
    fn missing_snapshot_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&cfg(dir.path().join("absent.json"))).unwrap();
        assert_eq!(store.read(|t| Ok(t.users().count())).unwrap(), 0);
    }

    #[test]
    fn writes_from_another_store_are_picked_up_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yaqeen.json");
        let server = Store::open(&cfg(path.clone())).unwrap();
        server.write(|t| Ok(insert_user(t, "alice"))).unwrap();

        let admin = Store::open(&cfg(path.clone())).unwrap();
        admin
            .write(|t| {
                let alice = t.users.values_mut().next().unwrap();
                alice.is_active = false;
                Ok(())
            })
            .unwrap();

        let seen = server
            .read(|t| Ok(t.user_by_username("alice").map(|u| u.is_active)))
            .unwrap();
        assert_eq!(seen, Some(false));

        let bob = server.write(|t| Ok(insert_user(t, "bob"))).unwrap();
        assert_eq!(bob, UserId(2));

        let on_disk = Store::open(&cfg(path)).unwrap();
        let users = on_disk
            .read(|t| Ok(t.users().map(|u| (u.username.clone(), u.is_active)).collect::<Vec<_>>()))
            .unwrap();
        assert_eq!(
            users,
            vec![("alice".to_string(), false), ("bob".to_string(), true)]
        );
    }
}
