//! # Quill Core
//!
//! Core crate for Quill: the reversible-action abstractions shared by the
//! scene model and the editor action builders.

pub mod abstract_editor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
