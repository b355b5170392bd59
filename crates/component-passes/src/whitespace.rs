//! Trimming of insignificant whitespace at the edges of content.

use crate::content::is_attribute_position;
use crate::DocumentPass;
use component_ir::{collect_refs, DocumentOptions, DocumentTree, NodeId, NodeKind};

/// Removes leading and trailing whitespace from bodies.
///
/// The render method, element bodies other than `<pre>`, child content and
/// templates are trimmed. Whitespace between nodes is left alone.
pub struct WhitespacePass;

impl DocumentPass for WhitespacePass {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn order(&self) -> i32 {
        900
    }

    fn is_enabled(&self, options: &DocumentOptions) -> bool {
        !options.preserve_whitespace
    }

    fn execute(&self, tree: &mut DocumentTree) {
        if let Some(method) = tree.primary_method() {
            trim_edges(tree, method, 0);
        }
        let root = tree.root();
        let bodies = collect_refs(tree, root, |k| match k {
            NodeKind::MarkupElement(e) => !e.tag_name.eq_ignore_ascii_case("pre"),
            NodeKind::ComponentChildContent(_) | NodeKind::Template => true,
            _ => false,
        });
        for reference in bodies {
            let start = tree
                .children(reference.node)
                .iter()
                .take_while(|&&c| is_attribute_position(tree.kind(c)))
                .count();
            trim_edges(tree, reference.node, start);
        }
    }
}

enum Edge {
    /// Whitespace only; removed.
    Blank,
    /// Text with content; trimmed on the scanned side.
    Text,
    /// Passed over without ending the scan.
    Skip,
    /// Ends the scan.
    Stop,
}

fn edge(tree: &DocumentTree, id: NodeId) -> Edge {
    match tree.kind(id) {
        NodeKind::MarkupContent(_) | NodeKind::HostCode(_)
            if tree.token_content(id).trim().is_empty() =>
        {
            Edge::Blank
        }
        NodeKind::Token(token) if token.is_markup() && token.content.trim().is_empty() => Edge::Blank,
        NodeKind::MarkupContent(_) => Edge::Text,
        NodeKind::HostCode(code) if code.is_base_call => Edge::Skip,
        _ => Edge::Stop,
    }
}

#[derive(Clone, Copy)]
enum Side {
    Start,
    End,
}

fn trim_text(tree: &mut DocumentTree, content: NodeId, side: Side) {
    let text = tree.token_content(content);
    let trimmed = match side {
        Side::Start => text.trim_start(),
        Side::End => text.trim_end(),
    };
    if trimmed.len() == text.len() {
        return;
    }
    let trimmed = trimmed.to_string();
    let tokens = tree.children(content).to_vec();
    let Some((&first, rest)) = tokens.split_first() else {
        return;
    };
    for &token in rest {
        tree.detach(token);
    }
    if let NodeKind::Token(token) = tree.kind_mut(first) {
        token.content = trimmed;
    }
}

fn trim_edges(tree: &mut DocumentTree, parent: NodeId, start: usize) {
    let mut index = start;
    while let Some(&child) = tree.children(parent).get(index) {
        match edge(tree, child) {
            Edge::Blank => tree.detach(child),
            Edge::Skip => index += 1,
            Edge::Text => {
                trim_text(tree, child, Side::Start);
                break;
            }
            Edge::Stop => break,
        }
    }

    let mut end = tree.children(parent).len();
    while end > start {
        let child = tree.children(parent)[end - 1];
        match edge(tree, child) {
            Edge::Blank => {
                tree.detach(child);
                end -= 1;
            }
            Edge::Skip => end -= 1,
            Edge::Text => {
                trim_text(tree, child, Side::End);
                break;
            }
            Edge::Stop => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use component_ir::{AttributeInput, DescriptorSet, DocumentBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trims_method_edges() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        builder.text(body, "\n  ");
        builder.text(body, "  Hello ");
        builder.expression(body, "Name");
        builder.text(body, " \n");
        builder.base_call(body);
        let mut tree = builder.finish();
        WhitespacePass.execute(&mut tree);

        assert_eq!(kinds(&tree, body), vec!["markup-content", "host-expression", "host-code"]);
        assert_eq!(tree.token_content(tree.children(body)[0]), "Hello ");
    }

    #[test]
    fn test_element_attributes_are_kept() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        let div = builder.element(body, "div", vec![AttributeInput::literal("class", " a ")]);
        builder.text(div, "  x  ");
        let pre = builder.element(body, "pre", vec![]);
        builder.text(pre, "  y  ");
        let mut tree = builder.finish();
        WhitespacePass.execute(&mut tree);

        assert_eq!(tree.token_content(tree.children(div)[0]), " a ");
        assert_eq!(tree.token_content(tree.children(div)[1]), "x");
        assert_eq!(tree.token_content(pre), "  y  ");
    }

    #[test]
    fn test_preserve_whitespace_disables_pass() {
        let options = DocumentOptions {
            preserve_whitespace: true,
            ..DocumentOptions::default()
        };
        let builder = DocumentBuilder::new(DescriptorSet::default(), options);
        assert!(!WhitespacePass.is_enabled(builder.tree().options()));
    }

    #[test]
    fn test_code_blocks_stop_trimming() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        builder.code(body, "if (x) {");
        builder.text(body, "  ");
        builder.code(body, "}");
        let mut tree = builder.finish();
        WhitespacePass.execute(&mut tree);

        assert_eq!(kinds(&tree, body), vec!["host-code", "markup-content", "host-code"]);
    }
}
