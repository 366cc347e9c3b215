//! Opaque encoded snapshots of entities and whole scenes.
//!
//! A snapshot is a packed structure ([`PackedNode`], [`PackedComponent`] or
//! [`PackedScene`]) encoded with the scene's [`Format`]. Snapshots are
//! immutable; restoring one decodes it and unpacks it into a scene.

use serde::{Deserialize, Serialize};

use super::error::{DeserializeError, SnapshotError};
use super::format::{Format, decode, encode};
use super::packed::{PackedComponent, PackedNode, PackedScene};
use crate::handle::{ComponentId, EntityId, NodeId};
use crate::scene::Scene;

#[derive(Serialize, Deserialize)]
enum EntityPayload {
    Node(PackedNode),
    Component(PackedComponent),
}

impl EntityPayload {
    fn kind(&self) -> SnapshotKind {
        match self {
            Self::Node(_) => SnapshotKind::Node,
            Self::Component(_) => SnapshotKind::Component,
        }
    }
}

/// What an [`EntitySnapshot`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A node with its components and its whole subtree.
    Node,
    /// A single component.
    Component,
}

impl SnapshotKind {
    fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Component => "component",
        }
    }
}

/// Encoded state of a node subtree or of a single component.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    kind: SnapshotKind,
    target: EntityId,
    node: NodeId,
    format: Format,
    bytes: Vec<u8>,
}

impl EntitySnapshot {
    /// Captures `node` recursively, including its parent and sibling index.
    pub fn capture_node(scene: &Scene, node: NodeId) -> Result<Self, SnapshotError> {
        let packed = scene.pack_node(node)?;
        let format = scene.snapshot_format();
        Ok(Self {
            kind: SnapshotKind::Node,
            target: node.into(),
            node,
            format,
            bytes: encode(&EntityPayload::Node(packed), format)?,
        })
    }

    /// Captures a single component, including its owning node and index.
    pub fn capture_component(scene: &Scene, component: ComponentId) -> Result<Self, SnapshotError> {
        let packed = scene.pack_component(component)?;
        let format = scene.snapshot_format();
        let node = packed.node;
        Ok(Self {
            kind: SnapshotKind::Component,
            target: component.into(),
            node,
            format,
            bytes: encode(&EntityPayload::Component(packed), format)?,
        })
    }

    /// Writes the captured state back into `scene`, under the captured
    /// handles and at the captured position.
    pub fn restore(&self, scene: &mut Scene) -> Result<EntityId, SnapshotError> {
        let payload: EntityPayload = decode(&self.bytes, self.format)?;
        if payload.kind() != self.kind {
            return Err(DeserializeError::KindMismatch {
                expected: self.kind.name(),
                found: payload.kind().name(),
            }
            .into());
        }
        let restored = match payload {
            EntityPayload::Node(packed) => scene.unpack_node(&packed)?.into(),
            EntityPayload::Component(packed) => scene.unpack_component(&packed)?.into(),
        };
        log::trace!("Restored {} snapshot of {restored}", self.kind.name());
        Ok(restored)
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// The captured node or component.
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// The captured node, or the node owning the captured component.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encoded state of an entire scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    format: Format,
    node_count: usize,
    bytes: Vec<u8>,
}

impl SceneSnapshot {
    pub fn capture(scene: &Scene) -> Result<Self, SnapshotError> {
        let packed = scene.pack_scene()?;
        let format = scene.snapshot_format();
        Ok(Self {
            format,
            node_count: scene.node_count(),
            bytes: encode(&packed, format)?,
        })
    }

    /// Replaces the content of `scene` with the captured state.
    ///
    /// The blob is decoded before the scene is touched, so a corrupt
    /// snapshot leaves the scene unchanged.
    pub fn restore(&self, scene: &mut Scene) -> Result<(), SnapshotError> {
        let packed: PackedScene = decode(&self.bytes, self.format)?;
        scene.unpack_scene(&packed)?;
        log::trace!("Restored scene snapshot ({} nodes)", self.node_count);
        Ok(())
    }

    /// Number of nodes at capture time.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::attribute::{self, AttributeInfo, ComponentRegistry, ComponentTypeInfo};
    use crate::serialize::Value;

    fn scene(format: Format) -> Scene {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentTypeInfo::new("Light").with_attribute(AttributeInfo::new("Range", 10.0_f32)),
        );
        let mut scene = Scene::with_registry("Level", registry);
        scene.set_snapshot_format(format);
        scene
    }

    #[cfg(all(feature = "serialize-ron", feature = "serialize-bincode"))]
    #[rstest]
    #[case(Format::Ron)]
    #[case(Format::Bincode)]
    fn node_snapshot_restores_removed_subtree(#[case] format: Format) {
        let mut scene = scene(format);
        let node = scene.create_node(scene.root(), "Lamp").unwrap();
        let light = scene.create_component(node, "Light").unwrap();
        let snapshot = EntitySnapshot::capture_node(&scene, node).unwrap();
        assert_eq!(snapshot.kind(), SnapshotKind::Node);
        assert_eq!(snapshot.format(), format);
        assert!(!snapshot.is_empty());

        scene.remove_node(node).unwrap();
        assert_eq!(snapshot.restore(&mut scene).unwrap(), EntityId::Node(node));
        assert!(scene.is_component_alive(light));
        assert_eq!(scene.find_node("Lamp"), Some(node));
    }

    #[cfg(all(feature = "serialize-ron", feature = "serialize-bincode"))]
    #[rstest]
    #[case(Format::Ron)]
    #[case(Format::Bincode)]
    fn scene_snapshot_restores_everything(#[case] format: Format) {
        let mut scene = scene(format);
        let node = scene.create_node(scene.root(), "A").unwrap();
        let snapshot = SceneSnapshot::capture(&scene).unwrap();
        assert_eq!(snapshot.node_count(), 2);

        scene.rename_node(node, "B").unwrap();
        scene.create_node(scene.root(), "C").unwrap();
        snapshot.restore(&mut scene).unwrap();

        assert_eq!(scene.node_count(), 2);
        assert_eq!(
            scene.node_attribute(node, attribute::NAME),
            Some(&Value::from("A"))
        );
    }

    #[test]
    fn component_snapshot_reports_owner() {
        let mut scene = scene(Format::default());
        let node = scene.create_node(scene.root(), "A").unwrap();
        let light = scene.create_component(node, "Light").unwrap();
        let snapshot = EntitySnapshot::capture_component(&scene, light).unwrap();
        assert_eq!(snapshot.target(), EntityId::Component(light));
        assert_eq!(snapshot.node(), node);

        scene.remove_component(light).unwrap();
        snapshot.restore(&mut scene).unwrap();
        assert_eq!(scene.components(node), &[light]);
    }

    #[test]
    fn capture_of_dead_node_fails() {
        let mut scene = scene(Format::default());
        let node = scene.create_node(scene.root(), "A").unwrap();
        scene.remove_node(node).unwrap();
        assert!(matches!(
            EntitySnapshot::capture_node(&scene, node),
            Err(SnapshotError::Scene(_))
        ));
    }
}
