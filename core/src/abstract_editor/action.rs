//! Editable targets and reversible editor actions.
//!
//! This module defines the core abstractions for an undo/redo editor system:
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: a reversible edit operation (Command pattern)
//! - [`EditActionError`] / [`EditActionResult`]: error handling for actions
//!
//! EditActions are self-contained: each implementation internally stores whatever
//! data it needs (target identifiers, old/new values, packed snapshots, etc.)
//! and never borrows from the object that produced it.

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Lets the consumer of a
/// `Box<dyn EditAction<T>>` inspect which concrete action it received.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on any type that actions can operate on, such as a scene
/// graph or a document.
///
/// # Example
///
/// ```ignore
/// struct MyScene { /* ... */ }
/// impl Editable for MyScene {}
/// ```
pub trait Editable: 'static {}

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The target object was not found.
    TargetNotFound(String),
    /// The target is in an invalid state for this action.
    InvalidState(String),
    /// A custom error with a description.
    Custom(String),
}

impl fmt::Display for EditActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EditActionError {}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible editor action (Command pattern).
///
/// An action is produced *after* the edit it describes has already happened,
/// so there is no separate "execute" step: the target is in the redone state
/// when the action is handed over. [`undo`](Self::undo) returns the target to
/// the state before the edit and [`redo`](Self::redo) brings it back.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different action types can be stored
/// in a single undo/redo stack as `Box<dyn EditAction<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct RenameNode {
///     node: NodeId,
///     old_name: String,
///     new_name: String,
/// }
///
/// impl EditAction<Scene> for RenameNode {
///     fn undo(&mut self, target: &mut Scene) -> EditActionResult {
///         target.set_name(self.node, &self.old_name);
///         Ok(())
///     }
///
///     fn redo(&mut self, target: &mut Scene) -> EditActionResult {
///         target.set_name(self.node, &self.new_name);
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Rename node"
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny + Send {
    /// Reverses the action.
    ///
    /// Must restore the target to the state it had before the edit.
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// Re-applies the action after an [`undo`](Self::undo).
    ///
    /// Must restore the target to the state it had right after the edit.
    fn redo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description for display in the edit menu.
    ///
    /// Examples: `"Create node"`, `"Change attribute 'Name'"`.
    fn description(&self) -> &str;
}
