use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{collect_refs, DocumentTree, NodeId, NodeKind, Token};

/// Rejects bound attribute values that mix markup and code.
///
/// Component parameters and macro attributes take exactly one value. A
/// parenthesized expression written as several tokens is unwrapped first.
pub struct ComplexAttributeContentPass;

impl DocumentPass for ComplexAttributeContentPass {
    fn name(&self) -> &'static str {
        "complex-attribute-content"
    }

    fn order(&self) -> i32 {
        90
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let candidates = collect_refs(tree, root, |k| matches!(k, NodeKind::TagCandidate(_)));
        for reference in candidates.into_iter().rev() {
            let candidate = reference.node;
            let NodeKind::TagCandidate(tag) = tree.kind(candidate) else {
                continue;
            };
            let check_parameters = tag.has_component();
            let attributes: Vec<NodeId> = tree
                .children(candidate)
                .iter()
                .copied()
                .filter(|&c| match tree.kind(c) {
                    NodeKind::BoundAttribute(_) | NodeKind::UnboundAttribute(_) => check_parameters,
                    NodeKind::DirectiveAttribute(_) => true,
                    _ => false,
                })
                .collect();
            for attribute in attributes {
                if is_complex(tree, attribute) {
                    let name = attribute_name(tree, attribute);
                    let span = tree.source(attribute).cloned();
                    tree.add_diagnostic(candidate, factory::unsupported_complex_content(span, &name));
                    tree.detach(attribute);
                }
            }
        }
    }
}

fn attribute_name(tree: &DocumentTree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::BoundAttribute(a) | NodeKind::DirectiveAttribute(a) => a.attribute_name.to_string(),
        NodeKind::UnboundAttribute(a) => a.attribute_name.to_string(),
        _ => String::new(),
    }
}

fn is_complex(tree: &mut DocumentTree, attribute: NodeId) -> bool {
    let children = tree.children(attribute).to_vec();
    if children.len() > 1 {
        return true;
    }
    let Some(&value) = children.first() else {
        return false;
    };
    match tree.kind(value) {
        NodeKind::HostCode(_) => return true,
        NodeKind::HostExpression => {}
        _ => return false,
    }
    tree.children(value).len() > 1 && !unwrap_parenthesized(tree, value)
}

/// Collapse `(` expr `)` into a single host token. Returns false when the
/// expression is not of that shape.
fn unwrap_parenthesized(tree: &mut DocumentTree, expression: NodeId) -> bool {
    let tokens = tree.children(expression).to_vec();
    let text = |id: NodeId| tree.token(id).map(|t| t.content.trim().to_string());
    let (Some(&first), Some(&last)) = (tokens.first(), tokens.last()) else {
        return false;
    };
    if tokens.len() < 3 || text(first).as_deref() != Some("(") || text(last).as_deref() != Some(")") {
        return false;
    }
    let inner: String = tokens[1..tokens.len() - 1]
        .iter()
        .filter_map(|&t| tree.token(t))
        .map(|t| t.content.as_str())
        .collect();
    let source = tree.source(tokens[1]).cloned();
    tree.take_children(expression);
    tree.append_token(expression, Token::host(inner), source);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use component_ir::{AttributeInput, TagMode, ValuePart};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixed_component_parameter_is_removed() {
        let mut builder = builder(vec![component("Card").with_attribute(string_attribute("Title"))]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::mixed(
                    "Title",
                    vec![ValuePart::literal("Hello "), ValuePart::expression("name")],
                ),
                AttributeInput::literal("class", "plain"),
            ],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        ComplexAttributeContentPass.execute(&mut tree);

        assert_eq!(codes(&tree), vec!["unsupported-complex-content"]);
        assert_eq!(kinds(&tree, card.node), vec!["unbound-attribute", "tag-body"]);
    }

    #[test]
    fn test_element_attributes_may_mix() {
        let mut builder = builder(vec![ref_descriptor()]);
        let body = builder.body();
        let div = builder.tag(
            body,
            "div",
            vec![
                AttributeInput::mixed(
                    "class",
                    vec![ValuePart::literal("a "), ValuePart::expression("b")],
                ),
                AttributeInput::expression("ref", "_div"),
            ],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        ComplexAttributeContentPass.execute(&mut tree);

        assert!(codes(&tree).is_empty());
        assert_eq!(
            kinds(&tree, div.node),
            vec!["unbound-attribute", "directive-attribute", "tag-body"]
        );
    }

    #[test]
    fn test_parenthesized_expression_is_unwrapped() {
        let mut builder = builder(vec![component("Card").with_attribute(string_attribute("Title"))]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![AttributeInput::expression("Title", "(")],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        let attribute = tree.children(card.node)[0];
        let expression = tree.children(attribute)[0];
        tree.append_token(expression, Token::host("a + b"), None);
        tree.append_token(expression, Token::host(")"), None);
        ComplexAttributeContentPass.execute(&mut tree);

        assert!(codes(&tree).is_empty());
        assert_eq!(tree.children(expression).len(), 1);
        assert_eq!(tree.token_content(expression), "a + b");
    }

    #[test]
    fn test_code_block_in_macro_attribute() {
        let mut builder = builder(vec![ref_descriptor()]);
        let body = builder.body();
        let div = builder.tag(body, "div", vec![AttributeInput::minimized("ref")], TagMode::SelfClosing);
        let mut tree = builder.finish();
        let attribute = tree.children(div.node)[0];
        let block = tree.append_new(attribute, NodeKind::HostCode(Default::default()), None);
        tree.append_token(block, Token::host("x++;"), None);
        ComplexAttributeContentPass.execute(&mut tree);

        assert_eq!(codes(&tree), vec!["unsupported-complex-content"]);
        assert_eq!(kinds(&tree, div.node), vec!["tag-body"]);
    }
}
