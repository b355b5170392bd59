//! Depth-first traversal with per-kind dispatch.

use crate::node::NodeKind;
use crate::reference::NodeRef;
use crate::tree::{DocumentTree, NodeId};

macro_rules! visit_methods {
    ($($method:ident),* $(,)?) => {
        $(
            #[allow(missing_docs)]
            fn $method(&mut self, tree: &DocumentTree, id: NodeId) {
                self.visit_default(tree, id);
            }
        )*
    };
}

/// Callbacks invoked by [`walk`], one per node kind.
///
/// Every callback defaults to [`Visitor::visit_default`], which recurses into
/// the children. Override a callback and skip the recursion to prune a subtree.
pub trait Visitor {
    /// Fallback for every kind without an override.
    fn visit_default(&mut self, tree: &DocumentTree, id: NodeId) {
        walk_children(self, tree, id);
    }

    visit_methods!(
        visit_document,
        visit_namespace,
        visit_class,
        visit_method,
        visit_field,
        visit_property,
        visit_using,
        visit_directive,
        visit_token,
        visit_host_code,
        visit_host_expression,
        visit_host_expression_attribute_value,
        visit_markup_content,
        visit_markup_attribute,
        visit_markup_attribute_value,
        visit_markup_element,
        visit_markup_block,
        visit_tag_candidate,
        visit_tag_body,
        visit_bound_attribute,
        visit_unbound_attribute,
        visit_directive_attribute,
        visit_component,
        visit_component_attribute,
        visit_child_content,
        visit_type_argument,
        visit_type_inference_method,
        visit_reference_capture,
        visit_set_key,
        visit_splat,
        visit_template,
        visit_extension,
    );
}

/// Dispatch `id` to the matching callback of `visitor`.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, tree: &DocumentTree, id: NodeId) {
    match tree.kind(id) {
        NodeKind::Document => visitor.visit_document(tree, id),
        NodeKind::Namespace(_) => visitor.visit_namespace(tree, id),
        NodeKind::Class(_) => visitor.visit_class(tree, id),
        NodeKind::Method(_) => visitor.visit_method(tree, id),
        NodeKind::Field(_) => visitor.visit_field(tree, id),
        NodeKind::Property(_) => visitor.visit_property(tree, id),
        NodeKind::Using(_) => visitor.visit_using(tree, id),
        NodeKind::Directive(_) => visitor.visit_directive(tree, id),
        NodeKind::Token(_) => visitor.visit_token(tree, id),
        NodeKind::HostCode(_) => visitor.visit_host_code(tree, id),
        NodeKind::HostExpression => visitor.visit_host_expression(tree, id),
        NodeKind::HostExpressionAttributeValue => {
            visitor.visit_host_expression_attribute_value(tree, id)
        }
        NodeKind::MarkupContent(_) => visitor.visit_markup_content(tree, id),
        NodeKind::MarkupAttribute(_) => visitor.visit_markup_attribute(tree, id),
        NodeKind::MarkupAttributeValue => visitor.visit_markup_attribute_value(tree, id),
        NodeKind::MarkupElement(_) => visitor.visit_markup_element(tree, id),
        NodeKind::MarkupBlock(_) => visitor.visit_markup_block(tree, id),
        NodeKind::TagCandidate(_) => visitor.visit_tag_candidate(tree, id),
        NodeKind::TagBody => visitor.visit_tag_body(tree, id),
        NodeKind::BoundAttribute(_) => visitor.visit_bound_attribute(tree, id),
        NodeKind::UnboundAttribute(_) => visitor.visit_unbound_attribute(tree, id),
        NodeKind::DirectiveAttribute(_) => visitor.visit_directive_attribute(tree, id),
        NodeKind::Component(_) => visitor.visit_component(tree, id),
        NodeKind::ComponentAttribute(_) => visitor.visit_component_attribute(tree, id),
        NodeKind::ComponentChildContent(_) => visitor.visit_child_content(tree, id),
        NodeKind::ComponentTypeArgument(_) => visitor.visit_type_argument(tree, id),
        NodeKind::TypeInferenceMethod(_) => visitor.visit_type_inference_method(tree, id),
        NodeKind::ReferenceCapture(_) => visitor.visit_reference_capture(tree, id),
        NodeKind::SetKey(_) => visitor.visit_set_key(tree, id),
        NodeKind::Splat => visitor.visit_splat(tree, id),
        NodeKind::Template => visitor.visit_template(tree, id),
        NodeKind::Extension(_) => visitor.visit_extension(tree, id),
    }
}

/// Walk every child of `id` in order.
pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, tree: &DocumentTree, id: NodeId) {
    for &child in tree.children(id) {
        walk(visitor, tree, child);
    }
}

/// References to every descendant of `root` whose kind satisfies `predicate`, in pre-order.
///
/// Passes collect references first and edit afterwards, so the traversal
/// never observes its own mutations.
pub fn collect_refs(
    tree: &DocumentTree,
    root: NodeId,
    predicate: impl Fn(&NodeKind) -> bool,
) -> Vec<NodeRef> {
    let mut out = Vec::new();
    collect_into(tree, root, &predicate, &mut out);
    out
}

fn collect_into(
    tree: &DocumentTree,
    parent: NodeId,
    predicate: &impl Fn(&NodeKind) -> bool,
    out: &mut Vec<NodeRef>,
) {
    for &child in tree.children(parent) {
        if predicate(tree.kind(child)) {
            out.push(NodeRef::new(tree, parent, child));
        }
        collect_into(tree, child, predicate, out);
    }
}
