//! Lowering of `ref`, `key` and `attributes` macro attributes.

use crate::DocumentPass;
use component_ir::{
    collect_refs, DescriptorKind, DocumentTree, NodeId, NodeKind, ReferenceCapture, SetKey, Token,
};
use smol_str::SmolStr;
use source_map::SourceSpan;

/// Rewrites reference captures, keys and attribute splats.
pub struct DirectiveAttributeLoweringPass;

impl DocumentPass for DirectiveAttributeLoweringPass {
    fn name(&self) -> &'static str {
        "directive-attribute-lowering"
    }

    fn order(&self) -> i32 {
        210
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let attributes = collect_refs(tree, root, |k| {
            matches!(
                k,
                NodeKind::DirectiveAttribute(a)
                    if matches!(a.descriptor.kind, DescriptorKind::Ref | DescriptorKind::Key | DescriptorKind::Splat)
            )
        });
        for reference in attributes {
            let NodeKind::DirectiveAttribute(attribute) = tree.kind(reference.node) else {
                continue;
            };
            let kind = attribute.descriptor.kind.clone();
            match kind {
                DescriptorKind::Ref => lower_ref(tree, reference.parent, reference.node),
                DescriptorKind::Key => lower_key(tree, reference.node),
                DescriptorKind::Splat => lower_splat(tree, reference.node),
                _ => {}
            }
        }
    }
}

/// The single host token an attribute holds, directly or inside one expression.
fn single_token(tree: &DocumentTree, id: NodeId) -> Option<(String, Option<SourceSpan>)> {
    let token = match tree.children(id) {
        [only] => match tree.kind(*only) {
            NodeKind::HostExpression | NodeKind::MarkupContent(_) => match tree.children(*only) {
                [token] => *token,
                _ => return None,
            },
            NodeKind::Token(_) => *only,
            _ => return None,
        },
        _ => return None,
    };
    let content = tree.token(token)?.content.trim().to_string();
    (!content.is_empty()).then(|| (content, tree.source(token).cloned()))
}

fn lower_ref(tree: &mut DocumentTree, parent: NodeId, id: NodeId) {
    let Some((identifier, identifier_source)) = single_token(tree, id) else {
        return;
    };
    let component_capture_type_name = capture_type(tree, parent);
    tree.take_children(id);
    tree.set_kind(
        id,
        NodeKind::ReferenceCapture(ReferenceCapture {
            identifier,
            identifier_source,
            component_capture_type_name,
        }),
    );
}

fn lower_key(tree: &mut DocumentTree, id: NodeId) {
    let key = tree.token_content(id).trim().to_string();
    if key.is_empty() {
        return;
    }
    let key_source = tree.source(id).cloned();
    tree.take_children(id);
    tree.set_kind(id, NodeKind::SetKey(SetKey { key, key_source }));
}

fn lower_splat(tree: &mut DocumentTree, id: NodeId) {
    let expression = tree.token_content(id);
    if expression.trim().is_empty() {
        return;
    }
    tree.take_children(id);
    tree.set_kind(id, NodeKind::Splat);
    tree.append_token(id, Token::host(expression.trim()), None);
}

/// Component type a capture on `parent` is typed as.
fn capture_type(tree: &DocumentTree, parent: NodeId) -> Option<SmolStr> {
    match tree.kind(parent) {
        NodeKind::Component(component) => Some(component.type_name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::ComponentLoweringPass;
    use component_ir::{AttributeInput, TagMode};
    use pretty_assertions::assert_eq;

    fn lower(tree: &mut DocumentTree) {
        ComponentLoweringPass.execute(tree);
        DirectiveAttributeLoweringPass.execute(tree);
    }

    #[test]
    fn test_element_capture() {
        let mut builder = builder(vec![ref_descriptor()]);
        let body = builder.body();
        let div = builder.tag(
            body,
            "div",
            vec![AttributeInput::expression("ref", "_div")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        lower(&mut tree);

        let capture = tree.children(div.node)[0];
        let NodeKind::ReferenceCapture(capture) = tree.kind(capture) else {
            panic!("expected capture");
        };
        assert_eq!(capture.identifier, "_div");
        assert!(!capture.is_component_capture());
    }

    #[test]
    fn test_component_capture() {
        let mut builder = builder(vec![component("Card"), ref_descriptor()]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![AttributeInput::expression("ref", "_card")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        lower(&mut tree);

        let capture = tree.children(card.node)[0];
        let NodeKind::ReferenceCapture(capture) = tree.kind(capture) else {
            panic!("expected capture");
        };
        assert_eq!(capture.component_capture_type_name.as_deref(), Some("Test.Card"));
        assert_eq!(capture_type(&tree, card.node).as_deref(), Some("Test.Card"));
    }

    #[test]
    fn test_blank_capture_is_ignored() {
        let mut builder = builder(vec![ref_descriptor()]);
        let body = builder.body();
        let div = builder.tag(
            body,
            "div",
            vec![AttributeInput::expression("ref", "   ")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        lower(&mut tree);

        assert_eq!(kinds(&tree, div.node), vec!["directive-attribute"]);
    }

    #[test]
    fn test_key_and_splat() {
        let mut builder = builder(vec![key_descriptor(), splat_descriptor()]);
        let body = builder.body();
        let li = builder.tag(
            body,
            "li",
            vec![
                AttributeInput::expression("key", "item.Id"),
                AttributeInput::expression("attributes", "Extra"),
            ],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        lower(&mut tree);

        assert_eq!(kinds(&tree, li.node), vec!["set-key", "splat"]);
        let NodeKind::SetKey(key) = tree.kind(tree.children(li.node)[0]) else {
            panic!("expected key");
        };
        assert_eq!(key.key, "item.Id");
        assert_eq!(tree.token_content(tree.children(li.node)[1]), "Extra");
    }
}
