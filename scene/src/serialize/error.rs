//! Error types for snapshot serialization and deserialization.

use thiserror::Error;

use crate::SceneError;

/// Errors that can occur while encoding scene data.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Format encoding error (RON/bincode).
    #[error("format error: {0}")]
    FormatError(String),
}

/// Errors that can occur while decoding scene data.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Format decoding error.
    #[error("format error: {0}")]
    FormatError(String),
    /// The blob decoded fine but describes a different kind of entity.
    #[error("snapshot kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors produced by capturing or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    /// The scene refused the capture or the restore (dead entity, occupied slot…).
    #[error(transparent)]
    Scene(#[from] SceneError),
}
