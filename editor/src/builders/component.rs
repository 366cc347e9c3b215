use std::sync::Arc;

use quill_scene::{ComponentId, NodeId, Scene, ScopeHint, SharedScene, WeakScene};

use super::Before;
use crate::actions::{
    ChangeEntitiesAction, ChangeSceneAction, CreateRemoveComponentAction, EditorAction, Lifecycle,
};
use crate::capture::{capture_component, capture_node, capture_scene, upgrade};
use crate::scope::component_scope;

fn type_scope(scene: &Scene, type_name: &str) -> ScopeHint {
    match scene.registry().component(type_name) {
        Some(info) => component_scope(info),
        None => {
            log::debug!("Component type '{type_name}' is not registered, assuming attribute-only");
            ScopeHint::AttributeOnly
        }
    }
}

/// Records the creation of a component on `node`.
///
/// The granularity follows the component type's widest attribute scope:
/// attribute-only types are recorded as the component alone, entity-local
/// types as the owning node's subtree, scene-wide types as the whole scene.
#[derive(Debug)]
pub struct CreateComponentActionBuilder {
    scene: WeakScene,
    node: NodeId,
    type_name: String,
    before: Option<Before>,
}

impl CreateComponentActionBuilder {
    pub fn new(scene: &SharedScene, node: NodeId, type_name: &str) -> Self {
        let guard = scene.read();
        let before = if guard.is_node_alive(node) {
            match type_scope(&guard, type_name) {
                ScopeHint::AttributeOnly => Some(Before::Nothing),
                ScopeHint::EntityLocal => capture_node(&guard, node).map(Before::Node),
                ScopeHint::SceneWide => capture_scene(&guard).map(Before::Scene),
            }
        } else {
            log::debug!("{node} is dead, component creation will not be recorded");
            None
        };
        Self {
            scene: Arc::downgrade(scene),
            node,
            type_name: type_name.to_owned(),
            before,
        }
    }

    /// Call after `component` was attached.
    pub fn build(self, component: ComponentId) -> Option<EditorAction> {
        let shared = upgrade(&self.scene)?;
        let scene = shared.read();
        if !scene.is_component_alive(component) {
            log::debug!("Created {component} is already gone, no action");
            return None;
        }
        let description = format!("Create component '{}'", self.type_name);
        match self.before? {
            Before::Nothing => {
                let snapshot = capture_component(&scene, component)?;
                Some(Box::new(CreateRemoveComponentAction::new(
                    Lifecycle::Created,
                    component,
                    &self.type_name,
                    snapshot,
                )))
            }
            Before::Node(before) => {
                let after = capture_node(&scene, self.node)?;
                Some(Box::new(ChangeEntitiesAction::new(
                    description,
                    vec![before],
                    vec![after],
                )))
            }
            Before::Scene(before) => {
                let after = capture_scene(&scene)?;
                Some(Box::new(ChangeSceneAction::new(description, before, after)))
            }
            Before::Component(_) => None,
        }
    }
}

/// Records the removal of a component.
///
/// Keeps the owning node: undo re-attaches the component to that node, at
/// its original index. If the node is gone by build time no action is
/// produced.
#[derive(Debug)]
pub struct RemoveComponentActionBuilder {
    scene: WeakScene,
    component: ComponentId,
    node: Option<NodeId>,
    type_name: String,
    before: Option<Before>,
}

impl RemoveComponentActionBuilder {
    pub fn new(scene: &SharedScene, component: ComponentId) -> Self {
        let guard = scene.read();
        let node = guard.component_node(component);
        let type_name = guard.component_type(component).unwrap_or_default().to_owned();
        let before = match node {
            Some(node) => match type_scope(&guard, &type_name) {
                ScopeHint::AttributeOnly => {
                    capture_component(&guard, component).map(Before::Component)
                }
                ScopeHint::EntityLocal => capture_node(&guard, node).map(Before::Node),
                ScopeHint::SceneWide => capture_scene(&guard).map(Before::Scene),
            },
            None => {
                log::debug!("{component} is dead, removal will not be recorded");
                None
            }
        };
        Self {
            scene: Arc::downgrade(scene),
            component,
            node,
            type_name,
            before,
        }
    }

    /// The node the component was attached to.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Call after the component was removed.
    pub fn build(self) -> Option<EditorAction> {
        let shared = upgrade(&self.scene)?;
        let scene = shared.read();
        let node = self.node?;
        if !scene.is_node_alive(node) {
            log::debug!("Owner {node} of removed {} is gone, no action", self.component);
            return None;
        }
        let description = format!("Remove component '{}'", self.type_name);
        match self.before? {
            Before::Component(snapshot) => Some(Box::new(CreateRemoveComponentAction::new(
                Lifecycle::Removed,
                self.component,
                &self.type_name,
                snapshot,
            ))),
            Before::Node(before) => {
                let after = capture_node(&scene, node)?;
                Some(Box::new(ChangeEntitiesAction::new(
                    description,
                    vec![before],
                    vec![after],
                )))
            }
            Before::Scene(before) => {
                let after = capture_scene(&scene)?;
                Some(Box::new(ChangeSceneAction::new(description, before, after)))
            }
            Before::Nothing => None,
        }
    }
}
