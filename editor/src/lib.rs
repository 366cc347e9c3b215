//! # Quill Editor
//!
//! Builders that turn scene mutations into reversible editor actions.
//!
//! ## Builders
//!
//! - [`CreateNodeActionBuilder`] / [`RemoveNodeActionBuilder`]
//! - [`CreateComponentActionBuilder`] / [`RemoveComponentActionBuilder`]
//! - [`ChangeNodeAttributesActionBuilder`] / [`ChangeComponentAttributesActionBuilder`],
//!   sharing a [`ChangeAttributeBuffer`] across one editing gesture
//!
//! ## Actions
//!
//! Every builder produces an [`EditorAction`], a boxed
//! [`EditAction<Scene>`](EditAction) ready for the undo stack, or `None`
//! when there is nothing to undo.
//!
//! ## Snapshot granularity
//!
//! [`scope::resolve_scope`] maps an attribute's declared
//! [`ScopeHint`](quill_scene::ScopeHint) to what must be captured: the value
//! alone, the owning entity, or the whole scene.
//!
//! ## Configuration
//!
//! [`config::ActionConfig`] is read from TOML and selects the snapshot
//! format and the default scope for node creation.

pub mod actions;
mod builders;
pub mod capture;
pub mod config;
pub mod scope;

pub use actions::EditorAction;
pub use builders::{
    ChangeAttributeBuffer, ChangeComponentAttributesActionBuilder,
    ChangeNodeAttributesActionBuilder, CreateComponentActionBuilder, CreateNodeActionBuilder,
    RemoveComponentActionBuilder, RemoveNodeActionBuilder, targets_from,
};
pub use quill_core::abstract_editor::{AsAny, EditAction, EditActionError, EditActionResult};
