//! Session snapshot and store errors.

use thiserror::Error;

/// Errors that can occur while saving, loading, or storing sessions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Session store lock was poisoned by a panicking writer
    #[error("Session store is unavailable: {0}")]
    StoreUnavailable(String),
}
