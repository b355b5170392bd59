use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{collect_refs, DocumentTree, NodeId, NodeKind};
use rustc_hash::FxHashSet;
use source_map::SourceSpan;

/// Reports attributes given more than once on an element or component.
///
/// Markup attribute names compare ASCII case-insensitively, component
/// parameters ordinally. Each repeated name is reported once.
pub struct DuplicateAttributePass;

impl DocumentPass for DuplicateAttributePass {
    fn name(&self) -> &'static str {
        "duplicate-attribute"
    }

    fn order(&self) -> i32 {
        460
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let owners = collect_refs(tree, root, |k| {
            matches!(k, NodeKind::MarkupElement(_) | NodeKind::Component(_))
        });
        for reference in owners {
            let owner = reference.node;
            let is_component = matches!(tree.kind(owner), NodeKind::Component(_));
            for (name, span) in repeated_names(tree, owner) {
                let diagnostic = if is_component {
                    factory::duplicate_component_parameter(span, &name)
                } else {
                    factory::duplicate_markup_attribute(span, &name)
                };
                tree.add_diagnostic(owner, diagnostic);
            }
        }
    }
}

/// Repeated attribute names of `owner`, with the span of the second occurrence.
fn repeated_names(tree: &DocumentTree, owner: NodeId) -> Vec<(String, Option<SourceSpan>)> {
    let mut seen = FxHashSet::default();
    let mut reported = FxHashSet::default();
    let mut out = Vec::new();
    for &child in tree.children(owner) {
        let key = match tree.kind(child) {
            NodeKind::MarkupAttribute(a) => a.name.to_ascii_lowercase(),
            NodeKind::ComponentAttribute(a) => a.attribute_name.to_string(),
            _ => continue,
        };
        if !seen.insert(key.clone()) && reported.insert(key.clone()) {
            out.push((key, tree.source(child).cloned()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::ComponentLoweringPass;
    use component_ir::{AttributeInput, TagMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markup_attributes_ignore_case() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        let div = builder.element(
            body,
            "div",
            vec![
                AttributeInput::literal("class", "a"),
                AttributeInput::literal("CLASS", "b"),
                AttributeInput::literal("Class", "c"),
                AttributeInput::literal("id", "d"),
            ],
        );
        let mut tree = builder.finish();
        DuplicateAttributePass.execute(&mut tree);

        assert_eq!(codes(&tree), vec!["duplicate-markup-attribute"]);
        assert!(tree.has_diagnostics(div));
    }

    #[test]
    fn test_component_parameters_are_ordinal() {
        let mut builder = builder(vec![component("Card")
            .with_attribute(string_attribute("Title"))
            .with_attribute(string_attribute("title"))]);
        let body = builder.body();
        builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::literal("Title", "a"),
                AttributeInput::literal("title", "b"),
            ],
            TagMode::SelfClosing,
        );
        let repeated = builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::literal("Title", "a"),
                AttributeInput::literal("Title", "b"),
            ],
            TagMode::SelfClosing,
        );
        let mut tree = builder.finish();
        ComponentLoweringPass.execute(&mut tree);
        DuplicateAttributePass.execute(&mut tree);

        assert_eq!(codes(&tree), vec!["duplicate-component-parameter"]);
        assert!(tree.has_diagnostics(repeated.node));
    }
}
