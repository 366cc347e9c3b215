use std::ops::Range;

use quill_scene::serialize::{EntitySnapshot, SceneSnapshot};
use quill_scene::{EntityId, NodeId, Scene};

use crate::capture::AttributeSnapshot;

/// An entity staged in the buffer, with its owning node followed by that
/// node's ancestors at the time it was staged.
#[derive(Debug, Clone)]
pub(crate) struct Staged {
    entity: EntityId,
    lineage: Vec<NodeId>,
}

impl Staged {
    pub(crate) fn new(scene: &Scene, entity: EntityId, owner: NodeId) -> Self {
        let lineage = std::iter::once(owner)
            .chain(scene.ancestors(owner))
            .collect();
        Self { entity, lineage }
    }

    /// The outermost entity whose removal took this one down, or `None`
    /// while it is alive.
    fn removed_root(&self, scene: &Scene) -> Option<EntityId> {
        let owner_alive = self
            .lineage
            .first()
            .is_some_and(|&owner| scene.is_node_alive(owner));
        if owner_alive {
            return (!scene.is_alive(self.entity)).then_some(self.entity);
        }
        self.lineage
            .iter()
            .take_while(|&&node| !scene.is_node_alive(node))
            .last()
            .map(|&node| EntityId::from(node))
    }
}

/// Staging area shared by the attribute builders of one editing gesture.
///
/// Each builder appends its targets' old values on construction and reads
/// its own segment back on build. Index `i` refers to the same entity in
/// every sequence. The buffer is owned by the caller and lent to each
/// builder by exclusive borrow.
///
/// Entity snapshots are kept per index, `None` where the index belongs to
/// a builder that did not capture one. The scene snapshot is taken at most
/// once: the first scene-wide builder captures the "before" side, and every
/// scene-level build refreshes the "after" side. Builders that captured
/// entity snapshots keep using them after the scene snapshot arrives.
///
/// Post-edit values may be written by the caller with
/// [`set_new_value`](Self::set_new_value); any value left unwritten is read
/// from the scene when the owning builder is built.
#[derive(Debug, Clone, Default)]
pub struct ChangeAttributeBuffer {
    old_values: Vec<AttributeSnapshot>,
    new_values: Vec<Option<AttributeSnapshot>>,
    staged: Vec<Staged>,
    old_entities: Vec<Option<EntitySnapshot>>,
    new_entities: Vec<Option<EntitySnapshot>>,
    old_scene: Option<SceneSnapshot>,
    new_scene: Option<SceneSnapshot>,
}

impl ChangeAttributeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged entities.
    pub fn len(&self) -> usize {
        self.old_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old_values.is_empty()
    }

    pub fn old_values(&self) -> &[AttributeSnapshot] {
        &self.old_values
    }

    /// Post-edit values; `None` where not yet written.
    pub fn new_values(&self) -> &[Option<AttributeSnapshot>] {
        &self.new_values
    }

    /// Records the post-edit value of the staged entity at `index`.
    ///
    /// Returns `false`, leaving the buffer untouched, when nothing is staged
    /// at `index`.
    pub fn set_new_value(&mut self, index: usize, value: AttributeSnapshot) -> bool {
        if index >= self.len() {
            log::warn!(
                "Ignoring new value for index {index}, only {} entities are staged",
                self.len()
            );
            return false;
        }
        if self.new_values.len() <= index {
            self.new_values.resize(index + 1, None);
        }
        self.new_values[index] = Some(value);
        true
    }

    pub fn old_entities(&self) -> &[Option<EntitySnapshot>] {
        &self.old_entities
    }

    pub fn new_entities(&self) -> &[Option<EntitySnapshot>] {
        &self.new_entities
    }

    pub fn old_scene(&self) -> Option<&SceneSnapshot> {
        self.old_scene.as_ref()
    }

    pub fn new_scene(&self) -> Option<&SceneSnapshot> {
        self.new_scene.as_ref()
    }

    pub fn has_scene_snapshot(&self) -> bool {
        self.old_scene.is_some()
    }

    /// Drops everything, keeping allocations for the next gesture.
    pub fn clear(&mut self) {
        self.old_values.clear();
        self.new_values.clear();
        self.staged.clear();
        self.old_entities.clear();
        self.new_entities.clear();
        self.old_scene = None;
        self.new_scene = None;
    }

    // ---- Builder side ----

    /// Appends a segment of staged entities with their old values and
    /// returns its index range.
    pub(crate) fn push_old_values(
        &mut self,
        entries: impl IntoIterator<Item = (Staged, AttributeSnapshot)>,
    ) -> Range<usize> {
        let start = self.old_values.len();
        for (staged, value) in entries {
            self.staged.push(staged);
            self.old_values.push(value);
        }
        start..self.old_values.len()
    }

    /// Stores the entity snapshots of `segment`.
    pub(crate) fn push_old_entities(
        &mut self,
        segment: Range<usize>,
        snapshots: Vec<Option<EntitySnapshot>>,
    ) {
        self.old_entities.resize(segment.start, None);
        self.old_entities.extend(snapshots);
    }

    /// Stores the batch's "before" scene snapshot unless one is already held.
    pub(crate) fn set_old_scene(&mut self, snapshot: SceneSnapshot) {
        if self.has_scene_snapshot() {
            return;
        }
        if self.old_entities.iter().any(Option::is_some) {
            log::debug!("Escalating attribute batch to a scene snapshot");
        }
        self.old_scene = Some(snapshot);
    }

    /// Fills unwritten new values of `segment` with `read(index)`.
    pub(crate) fn fill_new_values(
        &mut self,
        segment: Range<usize>,
        mut read: impl FnMut(usize) -> Option<AttributeSnapshot>,
    ) {
        if self.new_values.len() < segment.end {
            self.new_values.resize(segment.end, None);
        }
        for index in segment {
            if self.new_values[index].is_none() {
                self.new_values[index] = read(index);
            }
        }
    }

    /// Whether the entity at `index` ends up with a different value.
    pub(crate) fn changed(&self, index: usize) -> bool {
        self.new_values
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|new| self.old_values.get(index) != Some(new))
    }

    pub(crate) fn value_pair(&self, index: usize) -> Option<(AttributeSnapshot, AttributeSnapshot)> {
        let old = self.old_values.get(index)?.clone();
        let new = self.new_values.get(index)?.clone()?;
        Some((old, new))
    }

    /// Fills unwritten new entity snapshots of `segment` with `capture(index)`.
    pub(crate) fn fill_new_entities(
        &mut self,
        segment: Range<usize>,
        mut capture: impl FnMut(usize) -> Option<EntitySnapshot>,
    ) {
        if self.new_entities.len() < segment.end {
            self.new_entities.resize(segment.end, None);
        }
        for index in segment {
            if self.new_entities[index].is_none() {
                self.new_entities[index] = capture(index);
            }
        }
    }

    pub(crate) fn entity_pair(&self, index: usize) -> Option<(EntitySnapshot, EntitySnapshot)> {
        let old = self.old_entities.get(index)?.clone()?;
        let new = self.new_entities.get(index)?.clone()?;
        Some((old, new))
    }

    /// Stores the batch's "after" scene snapshot and returns both sides.
    pub(crate) fn set_new_scene(
        &mut self,
        snapshot: SceneSnapshot,
    ) -> Option<(SceneSnapshot, SceneSnapshot)> {
        let old = self.old_scene.clone()?;
        self.new_scene = Some(snapshot.clone());
        Some((old, snapshot))
    }

    /// Staged entities that are gone from `scene`, each reported as the
    /// outermost removed entity that took it down.
    pub(crate) fn removed_targets(&self, scene: &Scene) -> Vec<EntityId> {
        let mut removed = Vec::new();
        for root in self.staged.iter().filter_map(|s| s.removed_root(scene)) {
            if !removed.contains(&root) {
                removed.push(root);
            }
        }
        removed
    }
}
