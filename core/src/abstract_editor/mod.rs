//! Abstract editor framework for reversible editing operations.
//!
//! This module provides the foundational traits and types for building
//! undo/redo-capable editor actions. It is decoupled from the concrete
//! editable type (a scene graph, a document) so that higher-level crates
//! can produce concrete actions.
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: a self-contained reversible unit with `undo` and `redo`
//!
//! Sequencing actions (undo/redo stacks, grouping unrelated edits) is the
//! job of the undo-stack manager that consumes them, not of this module.

mod action;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
