//! Classification of tag candidates.
//!
//! A candidate matched by a component descriptor becomes a component call: its
//! bound attributes become parameters or type arguments and its body becomes
//! child content. Every other candidate becomes a plain element that keeps its
//! macro attributes for the later passes.

use crate::content::{
    attribute_values_to_content, content_to_attribute_values, is_identifier,
    is_whitespace_content, literal_text, markup_attribute,
};
use crate::names::{CHILD_CONTENT, DEFAULT_CONTEXT_NAME, RENDER_FRAGMENT};
use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{
    collect_refs, AttributeStructure, BoundAttribute, ChildContent, ComponentAttribute,
    ComponentCall, DocumentTree, MarkupElement, NodeId, NodeKind, TagDescriptor, Token,
    TypeArgument,
};
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::trace;

/// Turns tag candidates into components and elements.
pub struct ComponentLoweringPass;

impl DocumentPass for ComponentLoweringPass {
    fn name(&self) -> &'static str {
        "component-lowering"
    }

    fn order(&self) -> i32 {
        100
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let candidates = collect_refs(tree, root, |k| matches!(k, NodeKind::TagCandidate(_)));

        // Innermost first: a component body is final before it becomes child content.
        for reference in candidates.iter().rev() {
            if !reference.is_valid(tree) {
                continue;
            }
            let NodeKind::TagCandidate(candidate) = tree.kind(reference.node) else {
                continue;
            };
            if is_slot(tree.kind(reference.node)) {
                continue;
            }
            let components: Vec<Arc<TagDescriptor>> = candidate
                .descriptors
                .iter()
                .filter(|d| d.is_component())
                .cloned()
                .collect();
            if components.is_empty() {
                rewrite_element(tree, reference.node);
            } else {
                rewrite_component(tree, reference.node, &components);
            }
        }

        // Child content elements outside any component.
        for reference in collect_refs(tree, root, |k| matches!(k, NodeKind::TagCandidate(_))) {
            trace!(node = ?reference.node, "demoting unclaimed candidate");
            rewrite_element(tree, reference.node);
        }
    }
}

/// A candidate matched only by child content descriptors.
fn is_slot(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::TagCandidate(c) if c.has_child_content() && !c.has_component())
}

fn same_descriptor(a: &Arc<TagDescriptor>, b: &Arc<TagDescriptor>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn rewrite_element(tree: &mut DocumentTree, id: NodeId) {
    let NodeKind::TagCandidate(candidate) = tree.kind(id) else {
        return;
    };
    let tag_name = candidate.tag_name.clone();
    tree.set_kind(id, NodeKind::MarkupElement(MarkupElement { tag_name }));

    let mut attributes = Vec::new();
    let mut body = Vec::new();
    for child in tree.take_children(id) {
        let written = match tree.kind(child) {
            NodeKind::TagBody => {
                body.extend(tree.take_children(child));
                continue;
            }
            NodeKind::UnboundAttribute(a) => Some((a.attribute_name.clone(), a.structure)),
            NodeKind::BoundAttribute(a) => Some((a.attribute_name.clone(), a.structure)),
            _ => None,
        };
        if let Some((name, structure)) = written {
            tree.set_kind(
                child,
                NodeKind::MarkupAttribute(markup_attribute(&name, structure)),
            );
            content_to_attribute_values(tree, child);
        }
        attributes.push(child);
    }
    tree.set_children(id, attributes.into_iter().chain(body).collect());
}

enum AttributeAction {
    Keep,
    Drop,
    TypeArgument(SmolStr),
    Context(SmolStr),
    Parameter(ComponentAttribute),
    Unbound(SmolStr, AttributeStructure),
}

fn rewrite_component(tree: &mut DocumentTree, id: NodeId, components: &[Arc<TagDescriptor>]) {
    let NodeKind::TagCandidate(candidate) = tree.kind(id) else {
        return;
    };
    let tag_name = candidate.tag_name.clone();
    let span = tree.source(id).cloned();
    let descriptor = Arc::clone(&components[0]);

    if components.len() > 1 {
        let names: Vec<&str> = components.iter().map(|d| d.name.as_str()).collect();
        let diagnostic = factory::multiple_components(span.clone(), &tag_name, &names);
        tree.add_diagnostic(id, diagnostic);
    }

    tree.set_kind(
        id,
        NodeKind::Component(ComponentCall {
            tag_name: tag_name.clone(),
            type_name: descriptor.type_name.clone(),
            descriptor: Arc::clone(&descriptor),
            child_content_parameter_name: None,
            type_inference: None,
        }),
    );

    let mut context_name = None;
    let mut attributes = Vec::new();
    let mut body = Vec::new();
    for child in tree.take_children(id) {
        let action = match tree.kind(child) {
            NodeKind::TagBody => {
                body.extend(tree.take_children(child));
                continue;
            }
            NodeKind::BoundAttribute(bound) if same_descriptor(&bound.descriptor, &descriptor) => {
                if bound.attribute.is_type_parameter {
                    AttributeAction::TypeArgument(bound.attribute.name.clone())
                } else if bound.attribute.is_child_content_parameter_name {
                    AttributeAction::Context(bound.attribute_name.clone())
                } else {
                    AttributeAction::Parameter(ComponentAttribute::from_bound(bound))
                }
            }
            NodeKind::BoundAttribute(_) => AttributeAction::Drop,
            NodeKind::UnboundAttribute(a) => {
                AttributeAction::Unbound(a.attribute_name.clone(), a.structure)
            }
            _ => AttributeAction::Keep,
        };

        match action {
            AttributeAction::Keep => attributes.push(child),
            AttributeAction::Drop => {}
            AttributeAction::TypeArgument(type_parameter_name) => {
                let text = tree.token_content(child);
                tree.take_children(child);
                tree.set_kind(
                    child,
                    NodeKind::ComponentTypeArgument(TypeArgument {
                        type_parameter_name,
                    }),
                );
                tree.append_token(child, Token::host(text.trim()), None);
                attributes.push(child);
            }
            AttributeAction::Context(attribute_name) => match literal_text(tree, child) {
                Some(name) if is_identifier(name.trim()) => {
                    context_name = Some(SmolStr::from(name.trim()));
                }
                _ => {
                    let diagnostic = factory::child_content_invalid_parameter_on_component(
                        tree.source(child).cloned(),
                        &attribute_name,
                        &tag_name,
                    );
                    tree.add_diagnostic(id, diagnostic);
                }
            },
            AttributeAction::Parameter(parameter) => {
                tree.set_kind(child, NodeKind::ComponentAttribute(parameter));
                attributes.push(child);
            }
            AttributeAction::Unbound(attribute_name, structure) => {
                tree.set_kind(
                    child,
                    NodeKind::ComponentAttribute(ComponentAttribute {
                        attribute_name,
                        bound: None,
                        type_name: None,
                        globally_qualified_type_name: None,
                        structure,
                    }),
                );
                attribute_values_to_content(tree, child);
                attributes.push(child);
            }
        }
    }

    let slots = lower_body(tree, id, &descriptor, &tag_name, body);
    for &slot in &slots {
        if let NodeKind::ComponentChildContent(content) = tree.kind_mut(slot) {
            if content.parameter_name.is_none() {
                content.parameter_name = Some(
                    context_name
                        .clone()
                        .unwrap_or_else(|| SmolStr::from(DEFAULT_CONTEXT_NAME)),
                );
            }
        }
    }
    if let NodeKind::Component(component) = tree.kind_mut(id) {
        component.child_content_parameter_name = context_name;
    }
    tree.set_children(id, attributes.into_iter().chain(slots).collect());
}

fn slot_attribute<'d>(descriptor: &'d TagDescriptor, name: &str) -> Option<&'d BoundAttribute> {
    descriptor
        .bound_attributes
        .iter()
        .find(|a| a.is_child_content && a.name == name)
}

fn slot_content(descriptor: &TagDescriptor, name: &str) -> ChildContent {
    let bound = slot_attribute(descriptor, name).cloned();
    ChildContent {
        attribute_name: name.into(),
        type_name: bound
            .as_ref()
            .map_or_else(|| RENDER_FRAGMENT.into(), |b| b.type_name.clone()),
        bound,
        globally_qualified_type_name: None,
        parameter_name: None,
    }
}

/// Turn the body of a component into child content nodes.
fn lower_body(
    tree: &mut DocumentTree,
    component: NodeId,
    descriptor: &TagDescriptor,
    tag_name: &str,
    body: Vec<NodeId>,
) -> Vec<NodeId> {
    if body.iter().all(|&c| is_whitespace_content(tree, c)) {
        return Vec::new();
    }

    if !body.iter().any(|&c| is_slot(tree.kind(c))) {
        let slot = tree.create(
            NodeKind::ComponentChildContent(slot_content(descriptor, CHILD_CONTENT)),
            None,
        );
        tree.set_children(slot, body);
        return vec![slot];
    }

    let mut slots = Vec::new();
    let mut mixed = false;
    for child in body {
        if is_slot(tree.kind(child)) {
            lower_slot(tree, child, descriptor);
            slots.push(child);
        } else if !is_whitespace_content(tree, child) {
            mixed = true;
        }
    }
    if mixed {
        let names: Vec<&str> = descriptor
            .bound_attributes
            .iter()
            .filter(|a| a.is_child_content)
            .map(|a| a.name.as_str())
            .collect();
        let diagnostic =
            factory::child_content_mixed_with_explicit(tree.source(component).cloned(), tag_name, &names);
        tree.add_diagnostic(component, diagnostic);
    }
    slots
}

fn lower_slot(tree: &mut DocumentTree, slot: NodeId, descriptor: &TagDescriptor) {
    let NodeKind::TagCandidate(candidate) = tree.kind(slot) else {
        return;
    };
    let name = candidate.tag_name.clone();
    let mut content = slot_content(descriptor, &name);

    let mut children = Vec::new();
    for child in tree.take_children(slot) {
        let attribute = match tree.kind(child) {
            NodeKind::TagBody => {
                children.extend(tree.take_children(child));
                continue;
            }
            NodeKind::BoundAttribute(a) if a.attribute.is_child_content_parameter_name => {
                (a.attribute_name.clone(), true)
            }
            NodeKind::BoundAttribute(a) | NodeKind::DirectiveAttribute(a) => {
                (a.attribute_name.clone(), false)
            }
            NodeKind::UnboundAttribute(a) => (a.attribute_name.clone(), false),
            _ => {
                children.push(child);
                continue;
            }
        };
        let span = tree.source(child).cloned();
        match attribute {
            (attribute_name, true) => match literal_text(tree, child) {
                Some(text) if is_identifier(text.trim()) => {
                    content.parameter_name = Some(text.trim().into());
                }
                _ => {
                    let diagnostic =
                        factory::child_content_invalid_parameter(span, &attribute_name, &name);
                    tree.add_diagnostic(slot, diagnostic);
                }
            },
            (attribute_name, false) => {
                let diagnostic = factory::child_content_invalid_attribute(span, &attribute_name, &name);
                tree.add_diagnostic(slot, diagnostic);
            }
        }
    }

    tree.set_kind(slot, NodeKind::ComponentChildContent(content));
    tree.set_children(slot, children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use component_ir::{AttributeInput, TagMode};
    use pretty_assertions::assert_eq;

    fn card() -> TagDescriptor {
        component("Card")
            .with_attribute(string_attribute("Title"))
            .with_attribute(child_content_attribute("ChildContent"))
            .with_attribute(child_content_attribute("Header"))
            .with_attribute(context_attribute())
    }

    #[test]
    fn test_component_with_attributes_and_implicit_body() {
        let mut builder = builder(vec![card()]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::literal("Title", "Hi"),
                AttributeInput::literal("class", "big"),
            ],
            TagMode::StartTagAndEndTag,
        );
        builder.text(card.body, "Hello");
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert_eq!(tree.kind(card.node).name(), "component");
        assert_eq!(
            kinds(&tree, card.node),
            vec!["component-attribute", "component-attribute", "component-child-content"]
        );
        let class = tree.children(card.node)[1];
        let NodeKind::ComponentAttribute(attribute) = tree.kind(class) else {
            panic!("expected attribute");
        };
        assert!(attribute.bound.is_none());
        assert_eq!(tree.kind(tree.children(class)[0]).name(), "markup-content");

        let slot = tree.children(card.node)[2];
        let NodeKind::ComponentChildContent(content) = tree.kind(slot) else {
            panic!("expected child content");
        };
        assert_eq!(content.attribute_name, "ChildContent");
        assert_eq!(content.parameter_name.as_deref(), Some("context"));
        assert!(codes(&tree).is_empty());
    }

    #[test]
    fn test_element_keeps_macro_attributes() {
        let mut builder = builder(vec![ref_descriptor()]);
        let body = builder.body();
        let div = builder.tag(
            body,
            "div",
            vec![
                AttributeInput::expression("ref", "_div"),
                AttributeInput::literal("id", "x"),
            ],
            TagMode::StartTagAndEndTag,
        );
        builder.text(div.body, "text");
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert_eq!(tree.kind(div.node).name(), "markup-element");
        assert_eq!(
            kinds(&tree, div.node),
            vec!["directive-attribute", "markup-attribute", "markup-content"]
        );
        let id = tree.children(div.node)[1];
        assert_eq!(tree.kind(tree.children(id)[0]).name(), "markup-attribute-value");
    }

    #[test]
    fn test_explicit_child_content() {
        let mut builder = builder(vec![card(), child_content("Card", "Header")]);
        let body = builder.body();
        let card = builder.tag(body, "Card", vec![], TagMode::StartTagAndEndTag);
        builder.text(card.body, "\n  ");
        let header = builder.tag(
            card.body,
            "Header",
            vec![AttributeInput::literal("Context", "item")],
            TagMode::StartTagAndEndTag,
        );
        builder.expression(header.body, "item.Name");
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert_eq!(kinds(&tree, card.node), vec!["component-child-content"]);
        let NodeKind::ComponentChildContent(content) = tree.kind(header.node) else {
            panic!("expected child content");
        };
        assert_eq!(content.attribute_name, "Header");
        assert_eq!(content.parameter_name.as_deref(), Some("item"));
        assert_eq!(kinds(&tree, header.node), vec!["host-expression"]);
    }

    #[test]
    fn test_mixed_child_content_is_reported() {
        let mut builder = builder(vec![card(), child_content("Card", "Header")]);
        let body = builder.body();
        let card = builder.tag(body, "Card", vec![], TagMode::StartTagAndEndTag);
        builder.text(card.body, "stray");
        builder.tag(card.body, "Header", vec![], TagMode::StartTagAndEndTag);
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert_eq!(kinds(&tree, card.node), vec!["component-child-content"]);
        assert_eq!(codes(&tree), vec!["child-content-mixed-with-explicit"]);
    }

    #[test]
    fn test_invalid_context_on_component() {
        let mut builder = builder(vec![card()]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![AttributeInput::expression("Context", "name")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert!(tree.children(card.node).is_empty());
        assert_eq!(codes(&tree), vec!["child-content-invalid-parameter-on-component"]);
    }

    #[test]
    fn test_multiple_components_use_first() {
        let mut builder = builder(vec![component("Card"), component("Card")]);
        let body = builder.body();
        let card = builder.tag(body, "Card", vec![], TagMode::SelfClosing);
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        assert_eq!(tree.kind(card.node).name(), "component");
        assert_eq!(codes(&tree), vec!["multiple-components"]);
    }

    #[test]
    fn test_type_argument() {
        let grid = component("Grid").with_attribute(type_parameter("TItem"));
        let mut builder = builder(vec![grid]);
        let body = builder.body();
        let handle = builder.tag(
            body,
            "Grid",
            vec![AttributeInput::literal("TItem", "string")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        let argument = tree.children(handle.node)[0];
        assert_eq!(tree.kind(argument).name(), "component-type-argument");
        assert_eq!(tree.token_content(argument), "string");
    }

    #[test]
    fn test_nested_components() {
        let mut builder = builder(vec![card()]);
        let body = builder.body();
        let outer = builder.tag(body, "Card", vec![], TagMode::StartTagAndEndTag);
        let inner = builder.tag(outer.body, "Card", vec![], TagMode::StartTagAndEndTag);
        builder.text(inner.body, "x");
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);

        let slot = tree.children(outer.node)[0];
        assert_eq!(tree.children(slot), &[inner.node]);
        assert_eq!(tree.kind(inner.node).name(), "component");
    }
}
