use std::sync::Arc;

use quill_scene::serialize::SceneSnapshot;
use quill_scene::{NodeId, ScopeHint, SharedScene, WeakScene};

use super::Before;
use crate::actions::{ChangeSceneAction, CreateRemoveNodeAction, EditorAction, Lifecycle};
use crate::capture::{capture_node, capture_scene, upgrade};
use crate::config::ActionConfig;
use crate::scope::subtree_scope;

/// Records the creation of a node.
///
/// With a [`SceneWide`](ScopeHint::SceneWide) hint the whole scene is
/// captured up front and the action swaps scene snapshots. Otherwise the
/// action removes the new subtree on undo and re-creates it from a snapshot
/// taken at build time on redo. `None` declares that creating the node
/// cannot disturb anything that already exists.
#[derive(Debug)]
pub struct CreateNodeActionBuilder {
    scene: WeakScene,
    scope_hint: Option<ScopeHint>,
    old_scene: Option<SceneSnapshot>,
}

impl CreateNodeActionBuilder {
    pub fn new(scene: &SharedScene, scope_hint: Option<ScopeHint>) -> Self {
        let old_scene = match scope_hint {
            Some(ScopeHint::SceneWide) => capture_scene(&scene.read()),
            _ => None,
        };
        Self {
            scene: Arc::downgrade(scene),
            scope_hint,
            old_scene,
        }
    }

    /// Uses the scope hint configured under `[create_node]`.
    pub fn with_config(scene: &SharedScene, config: &ActionConfig) -> Self {
        Self::new(scene, config.create_node.scope.hint())
    }

    /// Call after `node` was created.
    pub fn build(self, node: NodeId) -> Option<EditorAction> {
        let shared = upgrade(&self.scene)?;
        let scene = shared.read();
        if !scene.is_node_alive(node) {
            log::debug!("Created {node} is already gone, no action");
            return None;
        }

        if self.scope_hint == Some(ScopeHint::SceneWide) {
            // Capture failed on construction and was logged there.
            let before = self.old_scene?;
            let after = capture_scene(&scene)?;
            return Some(Box::new(ChangeSceneAction::new("Create node", before, after)));
        }

        let snapshot = capture_node(&scene, node)?;
        Some(Box::new(CreateRemoveNodeAction::new(
            Lifecycle::Created,
            node,
            snapshot,
        )))
    }
}

/// Records the removal of a node and its subtree.
///
/// Everything is captured on construction since nothing of the subtree is
/// left afterwards. Subtrees holding components with scene-wide attributes
/// are recorded as whole-scene snapshots.
#[derive(Debug)]
pub struct RemoveNodeActionBuilder {
    scene: WeakScene,
    node: NodeId,
    before: Option<Before>,
}

impl RemoveNodeActionBuilder {
    pub fn new(scene: &SharedScene, node: NodeId) -> Self {
        let guard = scene.read();
        let before = if !guard.is_node_alive(node) {
            log::debug!("{node} is already dead, removal will not be recorded");
            None
        } else if node == guard.root() {
            log::debug!("The scene root cannot be removed, removal will not be recorded");
            None
        } else if subtree_scope(&guard, node) == ScopeHint::SceneWide {
            capture_scene(&guard).map(Before::Scene)
        } else {
            capture_node(&guard, node).map(Before::Node)
        };
        Self {
            scene: Arc::downgrade(scene),
            node,
            before,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Call after the node was removed.
    pub fn build(self) -> Option<EditorAction> {
        let shared = upgrade(&self.scene)?;
        match self.before? {
            Before::Node(snapshot) => Some(Box::new(CreateRemoveNodeAction::new(
                Lifecycle::Removed,
                self.node,
                snapshot,
            ))),
            Before::Scene(before) => {
                let after = capture_scene(&shared.read())?;
                Some(Box::new(ChangeSceneAction::new("Remove node", before, after)))
            }
            Before::Component(_) | Before::Nothing => None,
        }
    }
}
