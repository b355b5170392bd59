//! Stable handles for editing a node in place.

use crate::tree::{DocumentTree, NodeId};

/// A `(parent, node)` pair that supports structural edits.
///
/// The remembered index is only a hint; it is re-validated on every use and
/// recomputed by scanning the parent when siblings have moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    /// The parent at the time the reference was taken.
    pub parent: NodeId,
    /// The referenced node.
    pub node: NodeId,
    hint: usize,
}

impl NodeRef {
    /// Create a reference to `node` inside `parent`.
    pub fn new(tree: &DocumentTree, parent: NodeId, node: NodeId) -> Self {
        let hint = tree
            .children(parent)
            .iter()
            .position(|&c| c == node)
            .unwrap_or(usize::MAX);
        Self { parent, node, hint }
    }

    /// Current position of the node in its parent, or `None` once it has left.
    pub fn position(&self, tree: &DocumentTree) -> Option<usize> {
        let children = tree.children(self.parent);
        if children.get(self.hint) == Some(&self.node) {
            return Some(self.hint);
        }
        children.iter().position(|&c| c == self.node)
    }

    /// Check whether the node is still a child of the parent.
    pub fn is_valid(&self, tree: &DocumentTree) -> bool {
        self.position(tree).is_some()
    }

    /// Remove the node from the parent.
    pub fn remove(&self, tree: &mut DocumentTree) -> bool {
        if self.position(tree).is_none() {
            return false;
        }
        tree.detach(self.node);
        true
    }

    /// Put `replacement` where the node was and detach the node.
    pub fn replace(&mut self, tree: &mut DocumentTree, replacement: NodeId) -> bool {
        let Some(index) = self.position(tree) else {
            return false;
        };
        tree.detach(self.node);
        tree.insert(self.parent, index, replacement);
        self.node = replacement;
        self.hint = index;
        true
    }

    /// Insert `node` immediately before the referenced node.
    pub fn insert_before(&mut self, tree: &mut DocumentTree, node: NodeId) -> bool {
        let Some(index) = self.position(tree) else {
            return false;
        };
        tree.insert(self.parent, index, node);
        self.hint = index + 1;
        true
    }

    /// Insert `node` immediately after the referenced node.
    pub fn insert_after(&mut self, tree: &mut DocumentTree, node: NodeId) -> bool {
        let Some(index) = self.position(tree) else {
            return false;
        };
        tree.insert(self.parent, index + 1, node);
        self.hint = index;
        true
    }
}
