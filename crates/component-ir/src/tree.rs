//! Arena-backed document tree.
//!
//! Nodes are stored in a flat vector and addressed by [`NodeId`]. Removing a
//! node only detaches it from its parent, so ids held by passes stay valid for
//! the lifetime of the tree.

use crate::node::{NodeKind, Token, TokenKind};
use crate::options::DocumentOptions;
use component_diagnostics::Diagnostic;
use source_map::SourceSpan;

/// Index of a node inside a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node and its links.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What the node is.
    pub kind: NodeKind,
    /// Where the node came from in the template.
    pub source: Option<SourceSpan>,
    /// Diagnostics attached by passes.
    pub diagnostics: Vec<Diagnostic>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The document being lowered.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    options: DocumentOptions,
    diagnostics: Vec<Diagnostic>,
}

impl DocumentTree {
    /// Create a tree holding only the document root.
    pub fn new(options: DocumentOptions) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            options,
            diagnostics: Vec::new(),
        };
        tree.root = tree.create(NodeKind::Document, None);
        tree
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Options for this document.
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Mutable options for this document.
    pub fn options_mut(&mut self) -> &mut DocumentOptions {
        &mut self.options
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind, source: Option<SourceSpan>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            source,
            diagnostics: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a node and append it to `parent`.
    pub fn append_new(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        source: Option<SourceSpan>,
    ) -> NodeId {
        let id = self.create(kind, source);
        self.append(parent, id);
        id
    }

    /// Allocate a token and append it to `parent`.
    pub fn append_token(
        &mut self,
        parent: NodeId,
        token: Token,
        source: Option<SourceSpan>,
    ) -> NodeId {
        self.append_new(parent, NodeKind::Token(token), source)
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Insert `child` at `index` in `parent`, detaching it from any previous parent.
    ///
    /// An index past the end appends.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Remove a node from its parent. The node and its subtree stay allocated.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
    }

    /// Detach every child of `id` and return them in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for &child in &children {
            self.nodes[child.index()].parent = None;
        }
        children
    }

    /// Replace the children of `id` with `children`.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.take_children(id);
        for child in children {
            self.append(id, child);
        }
    }

    /// The node data.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Mutable node data.
    pub fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// The node kind.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Mutable node kind.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    /// Replace the kind of a node in place, keeping its links.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) -> NodeKind {
        std::mem::replace(&mut self.nodes[id.index()].kind, kind)
    }

    /// Where the node came from.
    pub fn source(&self, id: NodeId) -> Option<&SourceSpan> {
        self.nodes[id.index()].source.as_ref()
    }

    /// Set where the node came from.
    pub fn set_source(&mut self, id: NodeId, source: Option<SourceSpan>) {
        self.nodes[id.index()].source = source;
    }

    /// Children in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The parent, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Iterate over the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Check whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Attach a diagnostic to a node.
    pub fn add_diagnostic(&mut self, id: NodeId, diagnostic: Diagnostic) {
        self.nodes[id.index()].diagnostics.push(diagnostic);
    }

    /// Diagnostics attached to a node.
    pub fn diagnostics(&self, id: NodeId) -> &[Diagnostic] {
        &self.nodes[id.index()].diagnostics
    }

    /// Check whether a node carries any diagnostic.
    pub fn has_diagnostics(&self, id: NodeId) -> bool {
        !self.nodes[id.index()].diagnostics.is_empty()
    }

    /// Attach a diagnostic to the document itself.
    pub fn add_document_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Document diagnostics followed by those of every attached node in pre-order.
    pub fn collect_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        all.extend(self.diagnostics(self.root).iter().cloned());
        for id in self.descendants(self.root) {
            all.extend(self.diagnostics(id).iter().cloned());
        }
        all
    }

    /// Descendants of `id` in pre-order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// The token payload of a node, if it is a token.
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        self.kind(id).as_token()
    }

    /// Token descendants of `id`, optionally restricted to one kind.
    pub fn tokens(&self, id: NodeId, kind: Option<TokenKind>) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&d| {
                self.token(d)
                    .is_some_and(|t| kind.map_or(true, |k| t.kind == k))
            })
            .collect()
    }

    /// Concatenated text of every token below `id`.
    pub fn token_content(&self, id: NodeId) -> String {
        if let Some(token) = self.token(id) {
            return token.content.clone();
        }
        self.tokens(id, None)
            .into_iter()
            .filter_map(|t| self.token(t))
            .map(|t| t.content.as_str())
            .collect()
    }

    /// The namespace holding the component class.
    pub fn primary_namespace(&self) -> Option<NodeId> {
        self.find_child(self.root, |k| {
            matches!(k, NodeKind::Namespace(ns) if ns.is_primary)
        })
    }

    /// The component class.
    pub fn primary_class(&self) -> Option<NodeId> {
        let namespace = self.primary_namespace()?;
        self.find_child(namespace, |k| matches!(k, NodeKind::Class(c) if c.is_primary))
    }

    /// The render method.
    pub fn primary_method(&self) -> Option<NodeId> {
        let class = self.primary_class()?;
        self.find_child(class, |k| matches!(k, NodeKind::Method(m) if m.is_primary))
    }

    /// First child of `parent` whose kind satisfies `predicate`.
    pub fn find_child(
        &self,
        parent: NodeId,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| predicate(self.kind(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MarkupElement;
    use component_diagnostics::factory;
    use pretty_assertions::assert_eq;

    fn element(tree: &mut DocumentTree, parent: NodeId, tag: &str) -> NodeId {
        tree.append_new(
            parent,
            NodeKind::MarkupElement(MarkupElement {
                tag_name: tag.into(),
            }),
            None,
        )
    }

    #[test]
    fn test_append_and_detach() {
        let mut tree = DocumentTree::new(DocumentOptions::default());
        let root = tree.root();
        let a = element(&mut tree, root, "a");
        let b = element(&mut tree, root, "b");
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));

        tree.detach(a);
        assert_eq!(tree.children(root), &[b]);
        assert!(!tree.is_attached(a));
        assert_eq!(tree.kind(a).name(), "markup-element");
    }

    #[test]
    fn test_append_moves_between_parents() {
        let mut tree = DocumentTree::new(DocumentOptions::default());
        let root = tree.root();
        let a = element(&mut tree, root, "a");
        let b = element(&mut tree, root, "b");
        tree.append(b, a);
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.children(b), &[a]);
        assert_eq!(tree.ancestors(a).collect::<Vec<_>>(), vec![b, root]);
    }

    #[test]
    fn test_token_content() {
        let mut tree = DocumentTree::new(DocumentOptions::default());
        let root = tree.root();
        let expr = tree.append_new(root, NodeKind::HostExpression, None);
        tree.append_token(expr, Token::host("a"), None);
        tree.append_token(expr, Token::host(" + b"), None);
        assert_eq!(tree.token_content(expr), "a + b");
        assert_eq!(tree.tokens(expr, Some(TokenKind::Markup)).len(), 0);
    }

    #[test]
    fn test_collect_diagnostics_skips_detached() {
        let mut tree = DocumentTree::new(DocumentOptions::default());
        let root = tree.root();
        let a = element(&mut tree, root, "a");
        let b = element(&mut tree, root, "b");
        tree.add_diagnostic(a, factory::template_invalid_location(None));
        tree.add_diagnostic(b, factory::disallowed_script_tag(None));
        tree.detach(b);
        let diagnostics = tree.collect_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "template-invalid-location");
    }
}
