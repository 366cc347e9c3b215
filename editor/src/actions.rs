//! Concrete reversible actions produced by the builders.
//!
//! Every action owns the snapshots it needs and never refers back to the
//! builder or buffer that produced it.

use quill_core::abstract_editor::{EditAction, EditActionError, EditActionResult};
use quill_scene::serialize::{EntitySnapshot, SceneSnapshot, SnapshotError, Value};
use quill_scene::{ComponentId, EntityId, NodeId, Scene, SceneError};

/// A reversible unit handed to the undo-stack manager.
pub type EditorAction = Box<dyn EditAction<Scene>>;

fn scene_error(error: SceneError) -> EditActionError {
    match error {
        SceneError::DeadNode(node) => EditActionError::TargetNotFound(node.to_string()),
        SceneError::DeadComponent(component) => {
            EditActionError::TargetNotFound(component.to_string())
        }
        other => EditActionError::InvalidState(other.to_string()),
    }
}

fn snapshot_error(error: SnapshotError) -> EditActionError {
    match error {
        SnapshotError::Scene(e) => scene_error(e),
        other => EditActionError::Custom(other.to_string()),
    }
}

/// Restores one entity snapshot. A target whose parent or owner died in
/// the meantime is skipped with a warning.
fn restore_entity(snapshot: &EntitySnapshot, scene: &mut Scene) -> EditActionResult {
    match snapshot.restore(scene) {
        Ok(_) => Ok(()),
        Err(SnapshotError::Scene(SceneError::DeadNode(node))) => {
            log::warn!("Cannot restore {}: {node} is gone", snapshot.target());
            Ok(())
        }
        Err(e) => Err(snapshot_error(e)),
    }
}

// ---------------------------------------------------------------------------
// Whole scene
// ---------------------------------------------------------------------------

/// Swaps the entire scene between two snapshots.
///
/// Entities listed as removed were destroyed while the edit was in
/// progress; they are removed again after either snapshot is restored.
#[derive(Debug)]
pub struct ChangeSceneAction {
    description: String,
    before: SceneSnapshot,
    after: SceneSnapshot,
    removed: Vec<EntityId>,
}

impl ChangeSceneAction {
    pub fn new(description: impl Into<String>, before: SceneSnapshot, after: SceneSnapshot) -> Self {
        Self {
            description: description.into(),
            before,
            after,
            removed: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_removed(mut self, removed: Vec<EntityId>) -> Self {
        self.removed = removed;
        self
    }

    pub fn removed(&self) -> &[EntityId] {
        &self.removed
    }

    fn restore(snapshot: &SceneSnapshot, removed: &[EntityId], scene: &mut Scene) -> EditActionResult {
        snapshot.restore(scene).map_err(snapshot_error)?;
        for &entity in removed {
            if !scene.is_alive(entity) {
                continue;
            }
            let result = match entity {
                EntityId::Node(node) => scene.remove_node(node),
                EntityId::Component(component) => scene.remove_component(component),
            };
            result.map_err(scene_error)?;
        }
        Ok(())
    }
}

impl EditAction<Scene> for ChangeSceneAction {
    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        Self::restore(&self.before, &self.removed, target)
    }

    fn redo(&mut self, target: &mut Scene) -> EditActionResult {
        Self::restore(&self.after, &self.removed, target)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Node and component lifecycle
// ---------------------------------------------------------------------------

/// Whether the recorded edit brought an entity into existence or removed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Removed,
}

/// Creation or removal of a node subtree.
///
/// The snapshot holds the subtree as it exists while alive, together with
/// its parent and sibling index.
#[derive(Debug)]
pub struct CreateRemoveNodeAction {
    description: String,
    lifecycle: Lifecycle,
    node: NodeId,
    snapshot: EntitySnapshot,
}

impl CreateRemoveNodeAction {
    pub fn new(lifecycle: Lifecycle, node: NodeId, snapshot: EntitySnapshot) -> Self {
        let description = match lifecycle {
            Lifecycle::Created => "Create node",
            Lifecycle::Removed => "Remove node",
        };
        Self {
            description: description.to_owned(),
            lifecycle,
            node,
            snapshot,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    fn spawn(&self, scene: &mut Scene) -> EditActionResult {
        self.snapshot
            .restore(scene)
            .map(|_| ())
            .map_err(snapshot_error)
    }

    fn despawn(&self, scene: &mut Scene) -> EditActionResult {
        scene.remove_node(self.node).map_err(scene_error)
    }
}

impl EditAction<Scene> for CreateRemoveNodeAction {
    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        match self.lifecycle {
            Lifecycle::Created => self.despawn(target),
            Lifecycle::Removed => self.spawn(target),
        }
    }

    fn redo(&mut self, target: &mut Scene) -> EditActionResult {
        match self.lifecycle {
            Lifecycle::Created => self.spawn(target),
            Lifecycle::Removed => self.despawn(target),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Creation or removal of a single component.
///
/// Re-creating the component attaches it to the node it was captured on,
/// at its original index.
#[derive(Debug)]
pub struct CreateRemoveComponentAction {
    description: String,
    lifecycle: Lifecycle,
    component: ComponentId,
    snapshot: EntitySnapshot,
}

impl CreateRemoveComponentAction {
    pub fn new(
        lifecycle: Lifecycle,
        component: ComponentId,
        type_name: &str,
        snapshot: EntitySnapshot,
    ) -> Self {
        let verb = match lifecycle {
            Lifecycle::Created => "Create",
            Lifecycle::Removed => "Remove",
        };
        Self {
            description: format!("{verb} component '{type_name}'"),
            lifecycle,
            component,
            snapshot,
        }
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// The node the component lives on.
    pub fn node(&self) -> NodeId {
        self.snapshot.node()
    }

    fn spawn(&self, scene: &mut Scene) -> EditActionResult {
        self.snapshot
            .restore(scene)
            .map(|_| ())
            .map_err(snapshot_error)
    }

    fn despawn(&self, scene: &mut Scene) -> EditActionResult {
        scene.remove_component(self.component).map_err(scene_error)
    }
}

impl EditAction<Scene> for CreateRemoveComponentAction {
    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        match self.lifecycle {
            Lifecycle::Created => self.despawn(target),
            Lifecycle::Removed => self.spawn(target),
        }
    }

    fn redo(&mut self, target: &mut Scene) -> EditActionResult {
        match self.lifecycle {
            Lifecycle::Created => self.spawn(target),
            Lifecycle::Removed => self.despawn(target),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Entity state
// ---------------------------------------------------------------------------

/// Restores a set of entities (node subtrees or single components) from
/// before/after snapshots.
///
/// Snapshots within one side were captured at the same moment, so the order
/// in which they are restored does not matter.
#[derive(Debug)]
pub struct ChangeEntitiesAction {
    description: String,
    before: Vec<EntitySnapshot>,
    after: Vec<EntitySnapshot>,
}

impl ChangeEntitiesAction {
    pub fn new(
        description: impl Into<String>,
        before: Vec<EntitySnapshot>,
        after: Vec<EntitySnapshot>,
    ) -> Self {
        Self {
            description: description.into(),
            before,
            after,
        }
    }

    /// Entities covered by the action.
    pub fn targets(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.after.iter().map(EntitySnapshot::target)
    }
}

impl EditAction<Scene> for ChangeEntitiesAction {
    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        self.before
            .iter()
            .try_for_each(|snapshot| restore_entity(snapshot, target))
    }

    fn redo(&mut self, target: &mut Scene) -> EditActionResult {
        self.after
            .iter()
            .try_for_each(|snapshot| restore_entity(snapshot, target))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct AttributeChange {
    entity: EntityId,
    old: Value,
    new: Value,
}

/// Writes one attribute on many entities as a single undo step.
///
/// Values are written back verbatim (no attribute hooks). Entities that no
/// longer exist are skipped with a warning.
#[derive(Debug)]
pub struct ChangeAttributesAction {
    description: String,
    attribute: String,
    changes: Vec<AttributeChange>,
}

impl ChangeAttributesAction {
    pub fn new(description: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attribute: attribute.into(),
            changes: Vec::new(),
        }
    }

    /// Adds one entity's old and new value.
    #[must_use]
    pub fn with_change(mut self, entity: EntityId, old: Value, new: Value) -> Self {
        self.changes.push(AttributeChange { entity, old, new });
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn targets(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.changes.iter().map(|c| c.entity)
    }

    fn write(&self, scene: &mut Scene, pick: impl Fn(&AttributeChange) -> &Value) -> EditActionResult {
        for change in &self.changes {
            if !scene.is_alive(change.entity) {
                log::warn!(
                    "Skipping '{}' on {}: entity is gone",
                    self.attribute,
                    change.entity
                );
                continue;
            }
            scene
                .restore_attribute(change.entity, &self.attribute, pick(change).clone())
                .map_err(scene_error)?;
        }
        Ok(())
    }
}

impl EditAction<Scene> for ChangeAttributesAction {
    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        self.write(target, |c| &c.old)
    }

    fn redo(&mut self, target: &mut Scene) -> EditActionResult {
        self.write(target, |c| &c.new)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
