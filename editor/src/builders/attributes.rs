use std::borrow::Borrow;
use std::ops::Range;
use std::sync::Arc;

use quill_scene::{AttributeInfo, ComponentId, EntityId, NodeId, Scene, ScopeHint, SharedScene, WeakScene};

use super::buffer::{ChangeAttributeBuffer, Staged};
use super::targets_from;
use crate::actions::{ChangeAttributesAction, ChangeEntitiesAction, ChangeSceneAction, EditorAction};
use crate::capture::{capture_attribute, capture_entity, capture_scene, owning_node, upgrade};
use crate::scope::resolve_scope;

/// How a batch records its change, fixed on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Values,
    Entities,
    Scene,
}

/// One attribute on an ordered set of entities, staged in a buffer segment.
///
/// `targets[i]`, `owners[i]` and buffer index `segment.start + i` describe
/// the same entity.
#[derive(Debug)]
struct AttributeBatch {
    scene: WeakScene,
    attribute: String,
    tier: Tier,
    targets: Vec<EntityId>,
    owners: Vec<NodeId>,
    segment: Range<usize>,
}

impl AttributeBatch {
    fn begin(
        buffer: &mut ChangeAttributeBuffer,
        scene: &SharedScene,
        targets: Vec<EntityId>,
        attribute: &AttributeInfo,
    ) -> Self {
        // Entity-local batches join a scene snapshot taken before them; one
        // taken later would already contain their edit.
        let tier = match resolve_scope(attribute) {
            ScopeHint::AttributeOnly => Tier::Values,
            ScopeHint::EntityLocal if buffer.has_scene_snapshot() => Tier::Scene,
            ScopeHint::EntityLocal => Tier::Entities,
            ScopeHint::SceneWide => Tier::Scene,
        };
        let mut batch = Self {
            scene: Arc::downgrade(scene),
            attribute: attribute.name().to_owned(),
            tier,
            targets: Vec::with_capacity(targets.len()),
            owners: Vec::with_capacity(targets.len()),
            segment: buffer.len()..buffer.len(),
        };
        if targets.is_empty() {
            return batch;
        }

        let guard = scene.read();
        let mut staged = Vec::with_capacity(targets.len());
        for target in targets {
            let Some(owner) = owning_node(&guard, target) else {
                log::debug!("{target} is dead, leaving it out of '{}'", batch.attribute);
                continue;
            };
            let Some(value) = capture_attribute(&guard, target, &batch.attribute) else {
                continue;
            };
            batch.targets.push(target);
            batch.owners.push(owner);
            staged.push((Staged::new(&guard, target, owner), value));
        }
        batch.segment = buffer.push_old_values(staged);
        if batch.targets.is_empty() {
            return batch;
        }

        match batch.tier {
            Tier::Values => {}
            Tier::Entities => {
                let snapshots = batch
                    .targets
                    .iter()
                    .map(|&target| capture_entity(&guard, target))
                    .collect();
                buffer.push_old_entities(batch.segment.clone(), snapshots);
            }
            Tier::Scene => {
                if !buffer.has_scene_snapshot()
                    && let Some(snapshot) = capture_scene(&guard)
                {
                    buffer.set_old_scene(snapshot);
                }
            }
        }
        batch
    }

    fn is_alive(&self, scene: &Scene, i: usize) -> bool {
        scene.is_alive(self.targets[i]) && scene.is_node_alive(self.owners[i])
    }

    fn description(&self, survivors: usize, noun: &str) -> String {
        if survivors == 1 {
            format!("Change '{}'", self.attribute)
        } else {
            format!("Change '{}' on {survivors} {noun}", self.attribute)
        }
    }

    fn build(self, buffer: &mut ChangeAttributeBuffer, noun: &str) -> Option<EditorAction> {
        if self.targets.is_empty() {
            log::debug!("No live targets for '{}', no action", self.attribute);
            return None;
        }
        let shared = upgrade(&self.scene)?;
        let scene = shared.read();
        let start = self.segment.start;

        buffer.fill_new_values(self.segment.clone(), |index| {
            scene.attribute(self.targets[index - start], &self.attribute).cloned()
        });

        let survivors: Vec<usize> = (0..self.targets.len())
            .filter(|&i| self.is_alive(&scene, i))
            .collect();
        if survivors.len() < self.targets.len() {
            log::debug!(
                "Dropping {} dead target(s) from '{}'",
                self.targets.len() - survivors.len(),
                self.attribute
            );
        }
        if !survivors.iter().any(|&i| buffer.changed(start + i)) {
            log::debug!("'{}' did not change, no action", self.attribute);
            return None;
        }
        let description = self.description(survivors.len(), noun);

        match self.tier {
            Tier::Scene => {
                let after = capture_scene(&scene)?;
                let removed = buffer.removed_targets(&scene);
                let Some((before, after)) = buffer.set_new_scene(after) else {
                    log::error!("No scene snapshot was taken before '{}' changed", self.attribute);
                    return None;
                };
                let action = ChangeSceneAction::new(description, before, after).with_removed(removed);
                Some(Box::new(action))
            }
            Tier::Entities => {
                buffer.fill_new_entities(self.segment.clone(), |index| {
                    capture_entity(&scene, self.targets[index - start])
                });
                let mut before = Vec::with_capacity(survivors.len());
                let mut after = Vec::with_capacity(survivors.len());
                for &i in &survivors {
                    let Some((old, new)) = buffer.entity_pair(start + i) else {
                        log::error!("Missing snapshot of {} for '{}'", self.targets[i], self.attribute);
                        return None;
                    };
                    before.push(old);
                    after.push(new);
                }
                Some(Box::new(ChangeEntitiesAction::new(description, before, after)))
            }
            Tier::Values => {
                let mut action = ChangeAttributesAction::new(description, self.attribute.as_str());
                for &i in &survivors {
                    if let Some((old, new)) = buffer.value_pair(start + i) {
                        action = action.with_change(self.targets[i], old, new);
                    }
                }
                Some(Box::new(action))
            }
        }
    }
}

/// Records a change of one node attribute on many nodes as one undo step.
///
/// Construct right before the change, with the buffer shared by the whole
/// gesture; build right after. Nodes that are dead on construction are left
/// out, nodes that die before build are dropped from the action. Returns
/// `None` when no surviving node changed value.
///
/// # Example
///
/// ```
/// use quill_editor::{ChangeAttributeBuffer, ChangeNodeAttributesActionBuilder, EditAction};
/// use quill_scene::serialize::Value;
/// use quill_scene::{Scene, attribute};
///
/// let scene = Scene::new("Level").into_shared();
/// let root = scene.read().root();
/// let a = scene.write().create_node(root, "A").unwrap();
/// let b = scene.write().create_node(root, "B").unwrap();
/// let info = scene.read().registry().node_attribute(attribute::ENABLED).cloned().unwrap();
///
/// let mut buffer = ChangeAttributeBuffer::new();
/// let builder = ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, [a, b], &info);
/// for node in [a, b] {
///     scene.write().set_node_attribute(node, attribute::ENABLED, Value::Bool(false)).unwrap();
/// }
/// let mut action = builder.build(&mut buffer).unwrap();
///
/// action.undo(&mut scene.write()).unwrap();
/// assert_eq!(scene.read().node_attribute(a, attribute::ENABLED), Some(&Value::Bool(true)));
/// ```
#[derive(Debug)]
pub struct ChangeNodeAttributesActionBuilder {
    batch: AttributeBatch,
}

impl ChangeNodeAttributesActionBuilder {
    pub fn new(
        buffer: &mut ChangeAttributeBuffer,
        scene: &SharedScene,
        nodes: impl IntoIterator<Item = impl Borrow<NodeId>>,
        attribute: &AttributeInfo,
    ) -> Self {
        let nodes: Vec<NodeId> = targets_from(nodes);
        let targets = nodes.into_iter().map(EntityId::from).collect();
        Self {
            batch: AttributeBatch::begin(buffer, scene, targets, attribute),
        }
    }

    /// Nodes participating in the batch, in buffer order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.batch.owners
    }

    /// This builder's index range in the buffer.
    pub fn segment(&self) -> Range<usize> {
        self.batch.segment.clone()
    }

    pub fn build(self, buffer: &mut ChangeAttributeBuffer) -> Option<EditorAction> {
        self.batch.build(buffer, "nodes")
    }
}

/// Records a change of one component attribute on many components as one
/// undo step.
///
/// Same protocol as [`ChangeNodeAttributesActionBuilder`]. The owning nodes
/// are tracked next to the components; a component counts as dead once its
/// owner is gone.
#[derive(Debug)]
pub struct ChangeComponentAttributesActionBuilder {
    batch: AttributeBatch,
    components: Vec<ComponentId>,
}

impl ChangeComponentAttributesActionBuilder {
    pub fn new(
        buffer: &mut ChangeAttributeBuffer,
        scene: &SharedScene,
        components: impl IntoIterator<Item = impl Borrow<ComponentId>>,
        attribute: &AttributeInfo,
    ) -> Self {
        let components: Vec<ComponentId> = targets_from(components);
        let targets = components.iter().copied().map(EntityId::from).collect();
        let batch = AttributeBatch::begin(buffer, scene, targets, attribute);
        let components = batch
            .targets
            .iter()
            .filter_map(|target| match target {
                EntityId::Component(component) => Some(*component),
                EntityId::Node(_) => None,
            })
            .collect();
        Self { batch, components }
    }

    /// Components participating in the batch, in buffer order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Owning node of each participating component.
    pub fn nodes(&self) -> &[NodeId] {
        &self.batch.owners
    }

    pub fn segment(&self) -> Range<usize> {
        self.batch.segment.clone()
    }

    pub fn build(self, buffer: &mut ChangeAttributeBuffer) -> Option<EditorAction> {
        self.batch.build(buffer, "components")
    }
}

#[cfg(test)]
mod tests {
    use quill_core::abstract_editor::AsAny;
    use quill_scene::serialize::Value;
    use quill_scene::{ComponentRegistry, ComponentTypeInfo, attribute};

    use super::*;

    fn shared_scene() -> SharedScene {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentTypeInfo::new("Light").with_attribute(AttributeInfo::new("Range", 10.0_f32)),
        );
        Scene::with_registry("Level", registry).into_shared()
    }

    fn node_info(scene: &SharedScene, name: &str) -> AttributeInfo {
        scene.read().registry().node_attribute(name).cloned().unwrap()
    }

    #[test]
    fn empty_target_set_does_no_work() {
        let scene = shared_scene();
        let mut buffer = ChangeAttributeBuffer::new();
        let info = node_info(&scene, attribute::NAME);
        let builder =
            ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, Vec::<NodeId>::new(), &info);
        assert!(buffer.is_empty());
        assert!(buffer.old_entities().is_empty());
        assert!(!buffer.has_scene_snapshot());
        assert!(builder.build(&mut buffer).is_none());
    }

    #[test]
    fn dead_targets_are_skipped_on_construction() {
        let scene = shared_scene();
        let root = scene.read().root();
        let a = scene.write().create_node(root, "A").unwrap();
        let b = scene.write().create_node(root, "B").unwrap();
        scene.write().remove_node(b).unwrap();

        let mut buffer = ChangeAttributeBuffer::new();
        let info = node_info(&scene, attribute::ENABLED);
        let builder = ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, [a, b], &info);
        assert_eq!(builder.nodes(), &[a]);
        assert_eq!(builder.segment(), 0..1);
    }

    #[test]
    fn scene_wide_attributes_capture_the_scene_once() {
        let scene = shared_scene();
        let root = scene.read().root();
        let a = scene.write().create_node(root, "A").unwrap();
        let b = scene.write().create_node(root, "B").unwrap();
        let info = node_info(&scene, attribute::NAME);

        let mut buffer = ChangeAttributeBuffer::new();
        let first = ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, [a], &info);
        let second = ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, [b], &info);
        assert_eq!(second.segment(), 1..2);
        assert!(buffer.has_scene_snapshot());

        scene.write().rename_node(a, "A2").unwrap();
        scene.write().rename_node(b, "B2").unwrap();
        let first = first.build(&mut buffer).unwrap();
        let second = second.build(&mut buffer).unwrap();
        for action in [&first, &second] {
            assert!(
                action
                    .as_ref()
                    .as_any()
                    .downcast_ref::<ChangeSceneAction>()
                    .is_some()
            );
        }
    }

    #[test]
    fn entity_local_component_attribute_uses_component_snapshots() {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentTypeInfo::new("Mesh")
                .with_attribute(AttributeInfo::new("Source", "").with_scope(ScopeHint::EntityLocal)),
        );
        let scene = Scene::with_registry("Level", registry).into_shared();
        let root = scene.read().root();
        let node = scene.write().create_node(root, "A").unwrap();
        let mesh = scene.write().create_component(node, "Mesh").unwrap();
        let info = scene
            .read()
            .registry()
            .component("Mesh")
            .and_then(|c| c.attribute("Source"))
            .cloned()
            .unwrap();

        let mut buffer = ChangeAttributeBuffer::new();
        let builder = ChangeComponentAttributesActionBuilder::new(&mut buffer, &scene, [mesh], &info);
        assert_eq!(builder.components(), &[mesh]);
        assert_eq!(builder.nodes(), &[node]);
        assert_eq!(buffer.old_entities().len(), 1);
        assert!(!buffer.has_scene_snapshot());

        scene
            .write()
            .set_component_attribute(mesh, "Source", Value::from("box.mdl"))
            .unwrap();
        let action = builder.build(&mut buffer).unwrap();
        assert!(
            action
                .as_ref()
                .as_any()
                .downcast_ref::<ChangeEntitiesAction>()
                .is_some()
        );
    }

    #[test]
    fn caller_written_new_values_are_used() {
        let scene = shared_scene();
        let root = scene.read().root();
        let a = scene.write().create_node(root, "A").unwrap();
        let info = node_info(&scene, attribute::ENABLED);

        let mut buffer = ChangeAttributeBuffer::new();
        let builder = ChangeNodeAttributesActionBuilder::new(&mut buffer, &scene, [a], &info);
        // The caller reports the same value it started with: nothing to undo.
        assert!(buffer.set_new_value(0, Value::Bool(true)));
        scene
            .write()
            .set_node_attribute(a, attribute::ENABLED, Value::Bool(false))
            .unwrap();
        assert!(builder.build(&mut buffer).is_none());
    }
}
