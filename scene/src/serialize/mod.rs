//! Serialization of scene state.
//!
//! This module provides:
//!
//! - [`Value`]: format-agnostic attribute value
//! - [`PackedNode`] / [`PackedComponent`] / [`PackedScene`]: serde-facing
//!   copies of scene state that unpack under their original handles
//! - [`EntitySnapshot`] / [`SceneSnapshot`]: immutable encoded captures used
//!   by editor actions to undo and redo
//! - [`Format`] / [`encode`] / [`decode`]: format-specific I/O (feature-gated)

mod error;
mod format;
mod packed;
mod snapshot;
pub mod value;

pub use error::{DeserializeError, SerializeError, SnapshotError};
pub use format::Format;
pub use packed::{NodeLocation, PackedComponent, PackedNode, PackedScene};
pub use snapshot::{EntitySnapshot, SceneSnapshot, SnapshotKind};
pub use value::Value;

// Re-export format functions
pub use format::{decode, encode};
