//! Snapshot granularity policy.
//!
//! An attribute change is undone by restoring the narrowest state that still
//! covers its side effects:
//!
//! | Scope            | Captured state                              |
//! |------------------|---------------------------------------------|
//! | `AttributeOnly`  | the attribute value                         |
//! | `EntityLocal`    | the owning node's subtree                   |
//! | `SceneWide`      | the whole scene                             |
//!
//! The scope is intrinsic to the attribute; it never depends on the values
//! involved in a particular edit.

use quill_scene::{AttributeInfo, ComponentTypeInfo, NodeId, Scene, ScopeHint};

/// Granularity needed to reverse a change of `attribute`.
pub fn resolve_scope(attribute: &AttributeInfo) -> ScopeHint {
    attribute.scope_hint()
}

/// Granularity needed to reverse creating or removing a component of `info`.
pub fn component_scope(info: &ComponentTypeInfo) -> ScopeHint {
    info.attributes()
        .iter()
        .map(resolve_scope)
        .max()
        .unwrap_or_default()
}

/// Granularity needed to reverse creating or removing the subtree at `node`.
pub fn subtree_scope(scene: &Scene, node: NodeId) -> ScopeHint {
    scene.effective_scope(node)
}
