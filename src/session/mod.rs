//! Session snapshots, storage, and the request facade.
//!
//! A session carries one `UserState` and its `PointLedger` inside a
//! versioned `SessionSnapshot`. Snapshots encode to JSON (for cookie-style
//! payloads) or bincode, and decoding rejects versions this build does not
//! understand.

pub mod error;
pub mod service;
pub mod store;

pub use error::SessionError;
pub use service::{PointsReport, ServiceError, SessionService, TaskReport};
pub use store::{InMemorySessionStore, SessionStore, SnapshotEncoding};

use crate::core::UserState;
use crate::ledger::{LedgerEntry, PointLedger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Opaque session identifier.
pub type SessionId = Uuid;

/// Serializable snapshot of one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Session identifier
    pub id: SessionId,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,

    /// The participant's record
    pub state: UserState,

    /// Point changes applied so far
    pub ledger: PointLedger,
}

impl SessionSnapshot {
    /// Open a new session around a freshly created state.
    pub fn new(state: UserState, ledger: PointLedger) -> Self {
        let now = Utc::now();
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            state,
            ledger,
        }
    }

    /// Next snapshot of the same session with a new state and ledger entry.
    pub fn advance(&self, state: UserState, entry: LedgerEntry) -> Self {
        Self {
            version: self.version,
            id: self.id,
            created_at: self.created_at,
            updated_at: entry.timestamp,
            state,
            ledger: self.ledger.record(entry),
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let snapshot: Self = serde_json::from_str(raw)
            .map_err(|e| SessionError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SessionError> {
        bincode::serialize(self).map_err(|e| SessionError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self, SessionError> {
        let snapshot: Self = bincode::deserialize(raw)
            .map_err(|e| SessionError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SessionError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::ledger::Activity;
    use crate::validation::Registration;

    fn snapshot() -> SessionSnapshot {
        let engine = Engine::reference();
        let state = engine
            .create(&Registration {
                name: "Ada".to_string(),
                age: 30,
                screen_time_hours_per_day: 1.5,
                reward_id: 2,
            })
            .unwrap();
        let ledger = PointLedger::new().record(LedgerEntry::new(Activity::Registered, 0, 0));
        SessionSnapshot::new(state, ledger)
    }

    #[test]
    fn json_snapshot_survives_encoding() {
        let original = snapshot();
        let decoded = SessionSnapshot::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn binary_snapshot_survives_encoding() {
        let original = snapshot();
        let decoded = SessionSnapshot::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn future_version_is_rejected() {
        let mut future = snapshot();
        future.version = SNAPSHOT_VERSION + 1;
        let raw = future.to_json().unwrap();

        assert_eq!(
            SessionSnapshot::from_json(&raw),
            Err(SessionError::UnsupportedVersion {
                found: SNAPSHOT_VERSION + 1,
                supported: SNAPSHOT_VERSION,
            })
        );
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            SessionSnapshot::from_json("not json"),
            Err(SessionError::DeserializationFailed(_))
        ));
        assert!(matches!(
            SessionSnapshot::from_bytes(&[1, 2, 3]),
            Err(SessionError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn advance_keeps_identity_and_appends() {
        let first = snapshot();
        let engine = Engine::reference();
        let next_state = engine.start_study(&first.state).unwrap().state;
        let entry = LedgerEntry::new(Activity::StudyStarted, 0, 10);

        let second = first.advance(next_state, entry);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.ledger.len(), 2);
        assert_eq!(second.state.points(), 10);
        assert_eq!(first.ledger.len(), 1);
    }
}
