//! Snapshot capture for the builders.
//!
//! Each function returns `None` instead of an error: a dead reference is an
//! expected outcome (logged at `debug`), an encoding failure is not (logged
//! at `error`). Either way the builder ends up producing no action.

use quill_scene::serialize::{EntitySnapshot, SceneSnapshot, Value};
use quill_scene::{ComponentId, EntityId, NodeId, Scene, SharedScene, WeakScene};

/// Captured value of a single attribute.
pub type AttributeSnapshot = Value;

/// Upgrades a weak scene reference, logging when the scene is gone.
pub(crate) fn upgrade(scene: &WeakScene) -> Option<SharedScene> {
    let shared = scene.upgrade();
    if shared.is_none() {
        log::debug!("Scene was dropped, nothing to capture");
    }
    shared
}

pub fn capture_attribute(scene: &Scene, entity: EntityId, name: &str) -> Option<AttributeSnapshot> {
    let value = scene.attribute(entity, name).cloned();
    if value.is_none() {
        log::debug!("{entity} has no attribute '{name}' to capture");
    }
    value
}

/// Captures the subtree rooted at `node`.
pub fn capture_node(scene: &Scene, node: NodeId) -> Option<EntitySnapshot> {
    if !scene.is_node_alive(node) {
        log::debug!("{node} is dead, skipping snapshot");
        return None;
    }
    EntitySnapshot::capture_node(scene, node)
        .inspect_err(|e| log::error!("Failed to capture {node}: {e}"))
        .ok()
}

pub fn capture_component(scene: &Scene, component: ComponentId) -> Option<EntitySnapshot> {
    if !scene.is_component_alive(component) {
        log::debug!("{component} is dead, skipping snapshot");
        return None;
    }
    EntitySnapshot::capture_component(scene, component)
        .inspect_err(|e| log::error!("Failed to capture {component}: {e}"))
        .ok()
}

pub fn capture_scene(scene: &Scene) -> Option<SceneSnapshot> {
    SceneSnapshot::capture(scene)
        .inspect_err(|e| log::error!("Failed to capture scene '{}': {e}", scene.name()))
        .ok()
}

/// The node whose subtree holds the state of `entity`: the node itself, or
/// the component's owner.
pub fn owning_node(scene: &Scene, entity: EntityId) -> Option<NodeId> {
    match entity {
        EntityId::Node(node) => scene.is_node_alive(node).then_some(node),
        EntityId::Component(component) => scene.component_node(component),
    }
}

/// Captures a node subtree or a single component.
pub fn capture_entity(scene: &Scene, entity: EntityId) -> Option<EntitySnapshot> {
    match entity {
        EntityId::Node(node) => capture_node(scene, node),
        EntityId::Component(component) => capture_component(scene, component),
    }
}
