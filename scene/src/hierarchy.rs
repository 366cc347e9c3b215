//! Parent-child hierarchy operations.
//!
//! All operations keep the `parent` link of a node and the `children` list
//! of its parent consistent. Children are ordered; a node's position in its
//! parent's list is its sibling index.

use crate::attribute::{self, Attributes};
use crate::handle::NodeId;
use crate::scene::{NodeData, Scene, SceneError};
use crate::serialize::Value;

impl Scene {
    /// Creates a node as the last child of `parent`.
    pub fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        let index = self.children(parent).len();
        self.create_node_at(parent, index, name)
    }

    /// Creates a node at sibling position `index` under `parent`.
    ///
    /// `index` is clamped to the number of existing children.
    pub fn create_node_at(
        &mut self,
        parent: NodeId,
        index: usize,
        name: &str,
    ) -> Result<NodeId, SceneError> {
        if !self.is_node_alive(parent) {
            return Err(SceneError::DeadNode(parent));
        }
        let mut attributes = Attributes::from_defaults(self.registry().node_attributes());
        attributes.set(attribute::NAME, Value::from(name));
        let tick = self.next_tick();
        let node = self.nodes.insert(tick, NodeData::new(Some(parent), attributes));
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            let index = index.min(parent_data.children.len());
            parent_data.children.insert(index, node);
        }
        Ok(node)
    }

    /// Removes a node, its components and all its descendants.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), SceneError> {
        if node == self.root() {
            return Err(SceneError::RootNode);
        }
        let parent = self
            .nodes
            .get(node)
            .ok_or(SceneError::DeadNode(node))?
            .parent;
        if let Some(parent_data) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_data.children.retain(|&c| c != node);
        }
        self.despawn_subtree(node);
        Ok(())
    }

    /// Despawns a node and everything below it, depth-first (internal).
    ///
    /// Does not touch the parent's children list.
    pub(crate) fn despawn_subtree(&mut self, node: NodeId) {
        let Some(data) = self.nodes.remove(node) else {
            return;
        };
        for component in data.components {
            self.components.remove(component);
        }
        for child in data.children {
            self.despawn_subtree(child);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    /// Children of `node` in sibling order. Empty for dead nodes.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Position of `node` among its parent's children.
    pub fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// Returns `true` if `ancestor` is `node` itself or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Parent chain of `node`, nearest first, ending at the root. Empty for
    /// the root and for dead nodes.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        std::iter::successors(self.parent(node), |&n| self.parent(n)).collect()
    }

    /// Moves `node` under `parent` at sibling position `index` (clamped;
    /// `None` appends).
    pub fn set_parent(
        &mut self,
        node: NodeId,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        if node == self.root() {
            return Err(SceneError::RootNode);
        }
        if !self.is_node_alive(node) {
            return Err(SceneError::DeadNode(node));
        }
        if !self.is_node_alive(parent) {
            return Err(SceneError::DeadNode(parent));
        }
        // Walk up from the new parent. Hitting `node` would create a cycle.
        if self.is_ancestor(node, parent) {
            return Err(SceneError::CyclicParent { node, parent });
        }

        self.detach(node);
        if let Some(data) = self.nodes.get_mut(node) {
            data.parent = Some(parent);
        }
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            let len = parent_data.children.len();
            parent_data.children.insert(index.unwrap_or(len).min(len), node);
        }
        Ok(())
    }

    /// Unlinks `node` from its parent's children list (internal).
    pub(crate) fn detach(&mut self, node: NodeId) {
        if let Some(parent_data) = self.parent(node).and_then(|p| self.nodes.get_mut(p)) {
            parent_data.children.retain(|&c| c != node);
        }
    }

    /// Finds the first node named `name`, depth-first from the root.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root()).into_iter().find(|&n| {
            self.node_attribute(n, attribute::NAME)
                .and_then(Value::as_str)
                == Some(name)
        })
    }

    /// `node` followed by all its descendants in depth-first pre-order.
    /// Empty for dead nodes.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_node_alive(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }
}
