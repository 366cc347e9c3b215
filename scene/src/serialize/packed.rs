//! Packed scene data: the serde-facing form of nodes, components and whole
//! scenes.
//!
//! Packing copies state out of a [`Scene`] together with the handles and
//! positions needed to put it back. Unpacking writes it back under the
//! exact same [`NodeId`]s and [`ComponentId`]s, so references held by other
//! editor actions keep resolving. Attribute hooks never run on unpack.

use serde::{Deserialize, Serialize};

use crate::attribute::Attributes;
use crate::handle::{ComponentId, NodeId};
use crate::scene::{ComponentData, NodeData, Scene, SceneError};

/// Where a node sits in the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub parent: NodeId,
    /// Sibling index under `parent`.
    pub index: usize,
}

/// A node together with its components and all its descendants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedNode {
    pub id: NodeId,
    /// `None` for the scene root.
    pub location: Option<NodeLocation>,
    pub attributes: Attributes,
    pub components: Vec<PackedComponent>,
    pub children: Vec<PackedNode>,
}

/// A single component and its position on the owning node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedComponent {
    pub id: ComponentId,
    pub node: NodeId,
    /// Index among the owning node's components.
    pub index: usize,
    pub type_name: String,
    pub attributes: Attributes,
}

/// The whole scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedScene {
    /// Next free spawn tick at capture time.
    pub tick: u64,
    pub root: PackedNode,
}

impl Scene {
    /// Packs `node` and its subtree.
    pub fn pack_node(&self, node: NodeId) -> Result<PackedNode, SceneError> {
        let data = self.nodes.get(node).ok_or(SceneError::DeadNode(node))?;
        let location = data.parent.map(|parent| NodeLocation {
            parent,
            index: self.sibling_index(node).unwrap_or_default(),
        });
        let components = data
            .components
            .iter()
            .map(|&c| self.pack_component(c))
            .collect::<Result<Vec<_>, _>>()?;
        let children = data
            .children
            .iter()
            .map(|&child| self.pack_node(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PackedNode {
            id: node,
            location,
            attributes: data.attributes.clone(),
            components,
            children,
        })
    }

    pub fn pack_component(&self, component: ComponentId) -> Result<PackedComponent, SceneError> {
        let data = self
            .components
            .get(component)
            .ok_or(SceneError::DeadComponent(component))?;
        Ok(PackedComponent {
            id: component,
            node: data.node,
            index: self.component_index(component).unwrap_or_default(),
            type_name: data.type_name.clone(),
            attributes: data.attributes.clone(),
        })
    }

    pub fn pack_scene(&self) -> Result<PackedScene, SceneError> {
        Ok(PackedScene {
            tick: self.current_tick(),
            root: self.pack_node(self.root())?,
        })
    }

    /// Writes a packed subtree back at its recorded location.
    ///
    /// Nodes and components that are still alive are overwritten in place;
    /// dead ones are re-created under their packed handles. Live children
    /// and components that the packed state does not mention are removed.
    /// The location's parent must be alive.
    pub fn unpack_node(&mut self, packed: &PackedNode) -> Result<NodeId, SceneError> {
        let Some(location) = packed.location else {
            if packed.id != self.root() {
                return Err(SceneError::RootNode);
            }
            self.restore_subtree(packed, None)?;
            return Ok(packed.id);
        };
        if !self.is_node_alive(location.parent) {
            return Err(SceneError::DeadNode(location.parent));
        }
        if self.is_ancestor(packed.id, location.parent) {
            return Err(SceneError::CyclicParent {
                node: packed.id,
                parent: location.parent,
            });
        }

        self.restore_subtree(packed, Some(location.parent))?;
        let parent = self
            .nodes
            .get_mut(location.parent)
            .ok_or(SceneError::DeadNode(location.parent))?;
        parent.children.retain(|&c| c != packed.id);
        let index = location.index.min(parent.children.len());
        parent.children.insert(index, packed.id);
        Ok(packed.id)
    }

    /// Writes a packed component back onto its node at its recorded index.
    pub fn unpack_component(&mut self, packed: &PackedComponent) -> Result<ComponentId, SceneError> {
        if !self.is_node_alive(packed.node) {
            return Err(SceneError::DeadNode(packed.node));
        }
        self.write_component(packed, packed.node)?;
        let node = self
            .nodes
            .get_mut(packed.node)
            .ok_or(SceneError::DeadNode(packed.node))?;
        node.components.retain(|&c| c != packed.id);
        let index = packed.index.min(node.components.len());
        node.components.insert(index, packed.id);
        Ok(packed.id)
    }

    /// Replaces the entire scene content with `packed`.
    pub fn unpack_scene(&mut self, packed: &PackedScene) -> Result<(), SceneError> {
        self.nodes.clear();
        self.components.clear();
        self.restore_subtree(&packed.root, None)?;
        self.set_root(packed.root.id);
        // `tick` is the next free tick, so the last used one is `tick - 1`.
        self.observe_tick(packed.tick.saturating_sub(1));
        Ok(())
    }

    fn restore_subtree(
        &mut self,
        packed: &PackedNode,
        parent: Option<NodeId>,
    ) -> Result<(), SceneError> {
        let id = packed.id;
        if self.is_node_alive(id) {
            if self.parent(id) != parent {
                self.detach(id);
            }
        } else {
            if !self.nodes.insert_at(id, NodeData::new(parent, Attributes::new())) {
                return Err(SceneError::SlotOccupied(id.into()));
            }
            self.observe_tick(id.spawn_tick());
        }

        let components: Vec<ComponentId> = packed.components.iter().map(|c| c.id).collect();
        let stale: Vec<ComponentId> = self
            .components(id)
            .iter()
            .copied()
            .filter(|c| !components.contains(c))
            .collect();
        for component in stale {
            self.components.remove(component);
        }
        for component in &packed.components {
            self.write_component(component, id)?;
        }

        let children: Vec<NodeId> = packed.children.iter().map(|c| c.id).collect();
        let stale: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|c| !children.contains(c))
            .collect();
        for child in stale {
            self.despawn_subtree(child);
        }
        for child in &packed.children {
            self.restore_subtree(child, Some(id))?;
        }

        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = parent;
            data.attributes = packed.attributes.clone();
            data.components = components;
            data.children = children;
        }
        Ok(())
    }

    /// Overwrites or re-creates a component owned by `node`. Does not touch
    /// `node`'s component list.
    fn write_component(&mut self, packed: &PackedComponent, node: NodeId) -> Result<(), SceneError> {
        let previous_owner = match self.components.get_mut(packed.id) {
            Some(data) => {
                data.type_name = packed.type_name.clone();
                data.attributes = packed.attributes.clone();
                Some(std::mem::replace(&mut data.node, node))
            }
            None => {
                let data = ComponentData {
                    node,
                    type_name: packed.type_name.clone(),
                    attributes: packed.attributes.clone(),
                };
                if !self.components.insert_at(packed.id, data) {
                    return Err(SceneError::SlotOccupied(packed.id.into()));
                }
                self.observe_tick(packed.id.spawn_tick());
                None
            }
        };
        if let Some(owner) = previous_owner.filter(|&owner| owner != node)
            && let Some(owner_data) = self.nodes.get_mut(owner)
        {
            owner_data.components.retain(|&c| c != packed.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{self, AttributeInfo, ComponentRegistry, ComponentTypeInfo};
    use crate::serialize::Value;

    fn scene() -> Scene {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentTypeInfo::new("Light").with_attribute(AttributeInfo::new("Range", 10.0_f32)),
        );
        Scene::with_registry("Level", registry)
    }

    #[test]
    fn node_round_trip_keeps_identity_and_position() {
        let mut scene = scene();
        let root = scene.root();
        let a = scene.create_node(root, "A").unwrap();
        let b = scene.create_node(root, "B").unwrap();
        let c = scene.create_node(root, "C").unwrap();
        let child = scene.create_node(b, "B1").unwrap();
        let light = scene.create_component(child, "Light").unwrap();
        scene
            .set_component_attribute(light, "Range", Value::F32(3.0))
            .unwrap();

        let packed = scene.pack_node(b).unwrap();
        assert_eq!(packed.location, Some(NodeLocation { parent: root, index: 1 }));
        scene.remove_node(b).unwrap();
        assert_eq!(scene.children(root), &[a, c]);

        assert_eq!(scene.unpack_node(&packed).unwrap(), b);
        assert_eq!(scene.children(root), &[a, b, c]);
        assert_eq!(scene.children(b), &[child]);
        assert_eq!(scene.components(child), &[light]);
        assert_eq!(scene.component_attribute(light, "Range"), Some(&Value::F32(3.0)));
        assert_eq!(scene.pack_node(b).unwrap(), packed);
    }

    #[test]
    fn unpack_overwrites_live_state() {
        let mut scene = scene();
        let node = scene.create_node(scene.root(), "A").unwrap();
        let packed = scene.pack_node(node).unwrap();

        scene
            .set_node_attribute(node, attribute::ENABLED, Value::Bool(false))
            .unwrap();
        let extra_child = scene.create_node(node, "Extra").unwrap();
        let extra_light = scene.create_component(node, "Light").unwrap();

        scene.unpack_node(&packed).unwrap();
        assert_eq!(
            scene.node_attribute(node, attribute::ENABLED),
            Some(&Value::Bool(true))
        );
        assert!(!scene.is_node_alive(extra_child));
        assert!(!scene.is_component_alive(extra_light));
    }

    #[test]
    fn unpack_requires_live_parent() {
        let mut scene = scene();
        let parent = scene.create_node(scene.root(), "P").unwrap();
        let child = scene.create_node(parent, "C").unwrap();
        let packed = scene.pack_node(child).unwrap();
        scene.remove_node(parent).unwrap();
        assert_eq!(scene.unpack_node(&packed), Err(SceneError::DeadNode(parent)));
    }

    #[test]
    fn component_round_trip_keeps_index() {
        let mut scene = scene();
        let node = scene.create_node(scene.root(), "A").unwrap();
        let first = scene.create_component(node, "Light").unwrap();
        let second = scene.create_component(node, "Light").unwrap();
        let packed = scene.pack_component(first).unwrap();
        scene.remove_component(first).unwrap();

        assert_eq!(scene.unpack_component(&packed).unwrap(), first);
        assert_eq!(scene.components(node), &[first, second]);
    }

    #[test]
    fn scene_round_trip_and_tick_stays_monotonic() {
        let mut scene = scene();
        let root = scene.root();
        let a = scene.create_node(root, "A").unwrap();
        let packed = scene.pack_scene().unwrap();

        let b = scene.create_node(root, "B").unwrap();
        scene.remove_node(a).unwrap();
        scene.unpack_scene(&packed).unwrap();

        assert!(scene.is_node_alive(a));
        assert!(!scene.is_node_alive(b));
        assert_eq!(scene.children(root), &[a]);
        let fresh = scene.create_node(root, "Fresh").unwrap();
        assert_ne!(fresh, b);
    }
}
