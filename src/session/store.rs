//! Session storage.

use super::{SessionError, SessionId, SessionSnapshot};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Storage for session snapshots.
///
/// `update` must run its closure and write the result back without letting
/// another update of the same session interleave; callers rely on it for
/// lost-update freedom.
pub trait SessionStore: Send + Sync {
    /// Store a new session, replacing any snapshot with the same id.
    fn insert(&self, snapshot: SessionSnapshot) -> Result<(), SessionError>;

    fn load(&self, id: SessionId) -> Result<Option<SessionSnapshot>, SessionError>;

    /// Atomically read, transform, and write back one session.
    ///
    /// Returns `Ok(None)` when the session does not exist. If `apply` fails,
    /// the stored snapshot is left unchanged.
    fn update<R, E, F>(&self, id: SessionId, apply: F) -> Result<Option<R>, E>
    where
        F: FnOnce(SessionSnapshot) -> Result<(SessionSnapshot, R), E>,
        E: From<SessionError>;

    /// Drop a session. Returns whether it existed.
    fn remove(&self, id: SessionId) -> Result<bool, SessionError>;
}

/// How snapshots are encoded at rest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotEncoding {
    /// UTF-8 JSON, as a cookie payload would carry it
    #[default]
    Json,
    /// Compact bincode
    Binary,
}

impl SnapshotEncoding {
    fn encode(self, snapshot: &SessionSnapshot) -> Result<Vec<u8>, SessionError> {
        match self {
            Self::Json => snapshot.to_json().map(String::into_bytes),
            Self::Binary => snapshot.to_bytes(),
        }
    }

    fn decode(self, raw: &[u8]) -> Result<SessionSnapshot, SessionError> {
        match self {
            Self::Json => {
                let text = std::str::from_utf8(raw)
                    .map_err(|e| SessionError::DeserializationFailed(e.to_string()))?;
                SessionSnapshot::from_json(text)
            }
            Self::Binary => SessionSnapshot::from_bytes(raw),
        }
    }
}

/// Process-local store keeping encoded snapshots behind one mutex.
///
/// Holding the lock across read-modify-write serializes concurrent updates,
/// so two requests for the same session never overwrite each other.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    encoding: SnapshotEncoding,
    sessions: Mutex<HashMap<SessionId, Vec<u8>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: SnapshotEncoding) -> Self {
        Self {
            encoding,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Vec<u8>>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|e| SessionError::StoreUnavailable(e.to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        let encoded = self.encoding.encode(&snapshot)?;
        self.lock()?.insert(snapshot.id, encoded);
        Ok(())
    }

    fn load(&self, id: SessionId) -> Result<Option<SessionSnapshot>, SessionError> {
        let sessions = self.lock()?;
        sessions
            .get(&id)
            .map(|raw| self.encoding.decode(raw))
            .transpose()
    }

    fn update<R, E, F>(&self, id: SessionId, apply: F) -> Result<Option<R>, E>
    where
        F: FnOnce(SessionSnapshot) -> Result<(SessionSnapshot, R), E>,
        E: From<SessionError>,
    {
        let mut sessions = self.lock()?;
        let Some(raw) = sessions.get(&id) else {
            return Ok(None);
        };

        let current = self.encoding.decode(raw)?;
        let (next, result) = apply(current)?;
        let encoded = self.encoding.encode(&next)?;
        sessions.insert(id, encoded);
        Ok(Some(result))
    }

    fn remove(&self, id: SessionId) -> Result<bool, SessionError> {
        Ok(self.lock()?.remove(&id).is_some())
    }
}
