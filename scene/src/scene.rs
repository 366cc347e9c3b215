use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use quill_core::abstract_editor::Editable;
use thiserror::Error;

use crate::attribute::{self, AttributeInfo, Attributes, ComponentRegistry, ScopeHint};
use crate::handle::{ComponentId, EntityId, NodeId, Slots};
use crate::serialize::{Format, Value};

/// A scene shared between the editor and the objects that observe it.
pub type SharedScene = Arc<RwLock<Scene>>;

/// Non-owning reference to a [`SharedScene`]. Upgrading fails once the
/// scene has been dropped.
pub type WeakScene = Weak<RwLock<Scene>>;

/// Errors returned by scene mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("{0} is not alive")]
    DeadNode(NodeId),
    #[error("{0} is not alive")]
    DeadComponent(ComponentId),
    #[error("component type '{0}' is not registered")]
    UnknownComponentType(String),
    #[error("unknown attribute '{name}' on {entity}")]
    UnknownAttribute { entity: EntityId, name: String },
    #[error("the scene root cannot be removed or reparented")]
    RootNode,
    #[error("cannot parent {node} under its own descendant {parent}")]
    CyclicParent { node: NodeId, parent: NodeId },
    #[error("slot of {0} is occupied by another object")]
    SlotOccupied(EntityId),
}

pub(crate) struct NodeData {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub components: Vec<ComponentId>,
    pub attributes: Attributes,
}

impl NodeData {
    pub fn new(parent: Option<NodeId>, attributes: Attributes) -> Self {
        Self {
            parent,
            children: Vec::new(),
            components: Vec::new(),
            attributes,
        }
    }
}

pub(crate) struct ComponentData {
    pub node: NodeId,
    pub type_name: String,
    pub attributes: Attributes,
}

/// A scene: a tree of nodes, each carrying reflected attributes and an
/// ordered list of components.
///
/// Nodes and components are addressed through generational handles
/// ([`NodeId`], [`ComponentId`]) that stop resolving once the object is
/// removed. The scene always has a root node, which cannot be removed.
///
/// # Example
///
/// ```
/// use quill_scene::{Scene, attribute};
///
/// let mut scene = Scene::new("Level");
/// let crate_node = scene.create_node(scene.root(), "Crate").unwrap();
/// scene
///     .set_node_attribute(crate_node, attribute::POSITION, [1.0_f32, 0.0, 0.0].into())
///     .unwrap();
/// assert_eq!(scene.find_node("Crate"), Some(crate_node));
/// ```
pub struct Scene {
    name: String,
    root: NodeId,
    pub(crate) nodes: Slots<NodeId, NodeData>,
    pub(crate) components: Slots<ComponentId, ComponentData>,
    registry: ComponentRegistry,
    /// Next spawn tick; unique per spawned object.
    tick: u64,
    snapshot_format: Format,
}

impl Editable for Scene {}

impl Scene {
    /// Creates a scene holding only its root node.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, ComponentRegistry::new())
    }

    /// Creates a scene that knows the component types of `registry`.
    pub fn with_registry(name: impl Into<String>, registry: ComponentRegistry) -> Self {
        let name = name.into();
        let mut nodes = Slots::new();
        let mut root_attributes = Attributes::from_defaults(registry.node_attributes());
        root_attributes.set(attribute::NAME, Value::from(name.as_str()));
        let root = nodes.insert(0, NodeData::new(None, root_attributes));
        Self {
            name,
            root,
            nodes,
            components: Slots::new(),
            registry,
            tick: 1,
            snapshot_format: Format::default(),
        }
    }

    /// Wraps the scene for sharing with editor tooling.
    pub fn into_shared(self) -> SharedScene {
        Arc::new(RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Format used when capturing snapshots of this scene.
    pub fn snapshot_format(&self) -> Format {
        self.snapshot_format
    }

    pub fn set_snapshot_format(&mut self, format: Format) {
        self.snapshot_format = format;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn next_tick(&mut self) -> u64 {
        let tick = self.tick;
        self.tick += 1;
        tick
    }

    pub(crate) fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Makes sure future spawns never reuse `spawn_tick`.
    pub(crate) fn observe_tick(&mut self, spawn_tick: u64) {
        self.tick = self.tick.max(spawn_tick + 1);
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    // ---- Liveness ----

    pub fn is_node_alive(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn is_component_alive(&self, component: ComponentId) -> bool {
        self.components.contains(component)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        match entity {
            EntityId::Node(node) => self.is_node_alive(node),
            EntityId::Component(component) => self.is_component_alive(component),
        }
    }

    // ---- Node attributes ----

    pub fn node_attributes(&self, node: NodeId) -> Option<&Attributes> {
        self.nodes.get(node).map(|n| &n.attributes)
    }

    pub fn node_attribute(&self, node: NodeId, name: &str) -> Option<&Value> {
        self.nodes.get(node)?.attributes.get(name)
    }

    /// Sets a built-in node attribute.
    ///
    /// This is a plain write; use [`rename_node`](Self::rename_node) to
    /// rename a node together with the references pointing at it.
    pub fn set_node_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Value,
    ) -> Result<(), SceneError> {
        if self.registry.node_attribute(name).is_none() {
            return Err(SceneError::UnknownAttribute {
                entity: node.into(),
                name: name.to_owned(),
            });
        }
        let data = self.nodes.get_mut(node).ok_or(SceneError::DeadNode(node))?;
        data.attributes.set(name, value);
        Ok(())
    }

    // ---- Components ----

    /// Components of `node` in attachment order. Empty for dead nodes.
    pub fn components(&self, node: NodeId) -> &[ComponentId] {
        self.nodes
            .get(node)
            .map(|n| n.components.as_slice())
            .unwrap_or_default()
    }

    /// Attaches a new component of a registered type to `node`, with every
    /// attribute at its default value.
    pub fn create_component(
        &mut self,
        node: NodeId,
        type_name: &str,
    ) -> Result<ComponentId, SceneError> {
        if !self.is_node_alive(node) {
            return Err(SceneError::DeadNode(node));
        }
        let info = self
            .registry
            .component(type_name)
            .ok_or_else(|| SceneError::UnknownComponentType(type_name.to_owned()))?;
        let data = ComponentData {
            node,
            type_name: type_name.to_owned(),
            attributes: Attributes::from_defaults(info.attributes()),
        };
        let tick = self.next_tick();
        let component = self.components.insert(tick, data);
        if let Some(node_data) = self.nodes.get_mut(node) {
            node_data.components.push(component);
        }
        Ok(component)
    }

    /// Detaches and destroys a component.
    pub fn remove_component(&mut self, component: ComponentId) -> Result<(), SceneError> {
        let data = self
            .components
            .remove(component)
            .ok_or(SceneError::DeadComponent(component))?;
        if let Some(node_data) = self.nodes.get_mut(data.node) {
            node_data.components.retain(|&c| c != component);
        }
        Ok(())
    }

    pub fn component_node(&self, component: ComponentId) -> Option<NodeId> {
        self.components.get(component).map(|c| c.node)
    }

    pub fn component_type(&self, component: ComponentId) -> Option<&str> {
        self.components.get(component).map(|c| c.type_name.as_str())
    }

    /// Index of `component` among its node's components.
    pub fn component_index(&self, component: ComponentId) -> Option<usize> {
        let node = self.component_node(component)?;
        self.components(node).iter().position(|&c| c == component)
    }

    pub fn component_attribute(&self, component: ComponentId, name: &str) -> Option<&Value> {
        self.components.get(component)?.attributes.get(name)
    }

    /// Sets a declared component attribute and runs the type's attribute hook.
    pub fn set_component_attribute(
        &mut self,
        component: ComponentId,
        name: &str,
        value: Value,
    ) -> Result<(), SceneError> {
        let type_name = self
            .component_type(component)
            .ok_or(SceneError::DeadComponent(component))?;
        let info = self
            .registry
            .component(type_name)
            .ok_or_else(|| SceneError::UnknownComponentType(type_name.to_owned()))?;
        if info.attribute(name).is_none() {
            return Err(SceneError::UnknownAttribute {
                entity: component.into(),
                name: name.to_owned(),
            });
        }
        let hook = info.hook();
        if let Some(data) = self.components.get_mut(component) {
            data.attributes.set(name, value);
            if let Some(hook) = hook {
                hook(&mut data.attributes, name);
            }
        }
        Ok(())
    }

    // ---- Entity-generic attribute access ----

    /// Reflection data of attribute `name` on `entity`.
    pub fn attribute_info(&self, entity: EntityId, name: &str) -> Option<&AttributeInfo> {
        match entity {
            EntityId::Node(node) if self.is_node_alive(node) => self.registry.node_attribute(name),
            EntityId::Node(_) => None,
            EntityId::Component(component) => self
                .registry
                .component(self.component_type(component)?)?
                .attribute(name),
        }
    }

    pub fn attribute(&self, entity: EntityId, name: &str) -> Option<&Value> {
        match entity {
            EntityId::Node(node) => self.node_attribute(node, name),
            EntityId::Component(component) => self.component_attribute(component, name),
        }
    }

    /// Sets an attribute the way an editor inspector would (hooks run).
    pub fn set_attribute(
        &mut self,
        entity: EntityId,
        name: &str,
        value: Value,
    ) -> Result<(), SceneError> {
        match entity {
            EntityId::Node(node) => self.set_node_attribute(node, name, value),
            EntityId::Component(component) => {
                self.set_component_attribute(component, name, value)
            }
        }
    }

    /// Writes a previously captured attribute value back verbatim.
    ///
    /// No hooks run: the value is known to be consistent with the rest of
    /// the entity's state because it was captured from it.
    pub fn restore_attribute(
        &mut self,
        entity: EntityId,
        name: &str,
        value: Value,
    ) -> Result<(), SceneError> {
        let attributes = match entity {
            EntityId::Node(node) => self
                .nodes
                .get_mut(node)
                .map(|n| &mut n.attributes)
                .ok_or(SceneError::DeadNode(node))?,
            EntityId::Component(component) => self
                .components
                .get_mut(component)
                .map(|c| &mut c.attributes)
                .ok_or(SceneError::DeadComponent(component))?,
        };
        attributes.set(name, value);
        Ok(())
    }

    // ---- Cross-references ----

    /// Resolves a node-reference attribute of `component` to the node whose
    /// name it holds.
    pub fn resolve_reference(&self, component: ComponentId, name: &str) -> Option<NodeId> {
        let target = self.component_attribute(component, name)?.as_str()?;
        if target.is_empty() {
            return None;
        }
        self.find_node(target)
    }

    /// Renames a node and rewrites every node-reference attribute that
    /// pointed at its previous name.
    pub fn rename_node(&mut self, node: NodeId, new_name: &str) -> Result<(), SceneError> {
        let old_name = self
            .node_attribute(node, attribute::NAME)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(SceneError::DeadNode(node))?;
        self.set_node_attribute(node, attribute::NAME, Value::from(new_name))?;
        if old_name.is_empty() {
            return Ok(());
        }

        let mut rewrites = Vec::new();
        for (component, data) in self.components.iter() {
            let Some(info) = self.registry.component(&data.type_name) else {
                continue;
            };
            for attr in info.attributes().iter().filter(|a| a.is_node_reference()) {
                if data.attributes.get(attr.name()).and_then(Value::as_str) == Some(old_name.as_str()) {
                    rewrites.push((component, attr.name().to_owned()));
                }
            }
        }
        for (component, name) in rewrites {
            log::debug!("Rewriting reference {component}.{name}: '{old_name}' -> '{new_name}'");
            if let Some(data) = self.components.get_mut(component) {
                data.attributes.set(&name, Value::from(new_name));
            }
        }
        Ok(())
    }

    /// The widest scope hint among the component types found in the
    /// subtree rooted at `node`.
    pub fn effective_scope(&self, node: NodeId) -> ScopeHint {
        self.descendants(node)
            .into_iter()
            .flat_map(|n| self.components(n).iter().copied())
            .filter_map(|c| self.component_type(c))
            .filter_map(|t| self.registry.component(t))
            .map(|info| info.scope_hint())
            .max()
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("components", &self.components.len())
            .finish()
    }
}
