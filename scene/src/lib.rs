//! # Quill Scene
//!
//! The scene model edited by Quill's editor actions.
//!
//! ## Core Types
//!
//! - [`Scene`]: tree of nodes carrying reflected attributes and components
//! - [`NodeId`] / [`ComponentId`]: generational handles that stop resolving
//!   once their object is removed
//! - [`EntityId`]: either of the two
//! - [`SharedScene`] / [`WeakScene`]: shared and non-owning scene references
//!
//! ## Reflection
//!
//! - [`attribute::AttributeInfo`]: attribute descriptor with a
//!   [`attribute::ScopeHint`]
//! - [`attribute::ComponentRegistry`]: node attributes and component types
//!
//! ## Serialization
//!
//! - [`serialize::EntitySnapshot`] / [`serialize::SceneSnapshot`]: encoded
//!   captures that restore under the original handles

pub mod attribute;
mod handle;
mod hierarchy;
mod scene;
pub mod serialize;

pub use attribute::{AttributeInfo, ComponentRegistry, ComponentTypeInfo, ScopeHint};
pub use handle::{ComponentId, EntityId, NodeId};
pub use scene::{Scene, SceneError, SharedScene, WeakScene};
