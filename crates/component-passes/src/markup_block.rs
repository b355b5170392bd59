//! Folding of static markup into literal blocks.
//!
//! Runs of sibling elements and text with no dynamic parts are serialized
//! once at compile time and emitted as a single markup frame.

use crate::names::SCRIPT_TAG;
use crate::DocumentPass;
use component_ir::{collect_refs, DocumentOptions, DocumentTree, MarkupBlock, NodeId, NodeKind};
use tracing::trace;

/// Elements whose content the renderer must see as separate frames.
const UNFOLDABLE_TAGS: &[&str] = &[SCRIPT_TAG, "select", "textarea"];

/// Elements written without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Encode text content for markup.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Encode an attribute value for a double-quoted attribute.
pub fn encode_attribute(value: &str) -> String {
    encode_text(value).replace('"', "&quot;")
}

/// Replaces static markup with [`MarkupBlock`] nodes.
pub struct MarkupBlockPass;

impl DocumentPass for MarkupBlockPass {
    fn name(&self) -> &'static str {
        "markup-block"
    }

    fn order(&self) -> i32 {
        1000
    }

    fn is_enabled(&self, options: &DocumentOptions) -> bool {
        !options.design_time
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let parents = collect_refs(tree, root, |k| {
            matches!(
                k,
                NodeKind::Method(_)
                    | NodeKind::MarkupElement(_)
                    | NodeKind::ComponentChildContent(_)
                    | NodeKind::Template
            )
        });
        // Outer parents come first; anything folded into them is no longer attached.
        for reference in parents {
            if tree.is_attached(reference.node) {
                fold_children(tree, reference.node);
            }
        }
    }
}

fn is_foldable(tree: &DocumentTree, id: NodeId) -> bool {
    if tree.has_diagnostics(id) {
        return false;
    }
    match tree.kind(id) {
        NodeKind::MarkupContent(_) => true,
        NodeKind::MarkupElement(element) => {
            !UNFOLDABLE_TAGS
                .iter()
                .any(|t| element.tag_name.eq_ignore_ascii_case(t))
                && tree.children(id).iter().all(|&c| match tree.kind(c) {
                    NodeKind::MarkupAttribute(_) => {
                        !tree.has_diagnostics(c)
                            && tree
                                .children(c)
                                .iter()
                                .all(|&v| matches!(tree.kind(v), NodeKind::MarkupAttributeValue))
                    }
                    _ => is_foldable(tree, c),
                })
        }
        _ => false,
    }
}

/// Runs of consecutive foldable children, as `start..end` index ranges.
fn foldable_runs(tree: &DocumentTree, parent: NodeId) -> Vec<std::ops::Range<usize>> {
    let children = tree.children(parent);
    let mut runs = Vec::new();
    let mut start = None;
    for (index, &child) in children.iter().enumerate() {
        match (is_foldable(tree, child), start) {
            (true, None) => start = Some(index),
            (false, Some(begin)) => {
                runs.push(begin..index);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        runs.push(begin..children.len());
    }
    // A lone text node gains nothing from folding.
    runs.retain(|run| {
        run.len() > 1 || !matches!(tree.kind(children[run.start]), NodeKind::MarkupContent(_))
    });
    runs
}

fn fold_children(tree: &mut DocumentTree, parent: NodeId) {
    for run in foldable_runs(tree, parent).into_iter().rev() {
        let members: Vec<NodeId> = tree.children(parent)[run.clone()].to_vec();
        let mut content = String::new();
        for &member in &members {
            render(tree, member, &mut content);
        }
        trace!(nodes = members.len(), bytes = content.len(), "folding static markup");
        let source = tree.source(members[0]).cloned();
        let block = tree.create(NodeKind::MarkupBlock(MarkupBlock { content }), source);
        for &member in &members {
            tree.detach(member);
        }
        tree.insert(parent, run.start, block);
    }
}

/// Serialize a foldable node.
fn render(tree: &DocumentTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::MarkupContent(content) => {
            let text = tree.token_content(id);
            if content.is_encoded {
                out.push_str(&text);
            } else {
                out.push_str(&encode_text(&text));
            }
        }
        NodeKind::MarkupElement(element) => {
            out.push('<');
            out.push_str(&element.tag_name);
            let mut body = Vec::new();
            for &child in tree.children(id) {
                match tree.kind(child) {
                    NodeKind::MarkupAttribute(attribute) => {
                        out.push(' ');
                        out.push_str(&attribute.name);
                        let minimized =
                            attribute.prefix.is_empty() && tree.children(child).is_empty();
                        if !minimized {
                            out.push_str("=\"");
                            out.push_str(&encode_attribute(&tree.token_content(child)));
                            out.push('"');
                        }
                    }
                    _ => body.push(child),
                }
            }
            out.push('>');
            let is_void = VOID_ELEMENTS
                .iter()
                .any(|t| element.tag_name.eq_ignore_ascii_case(t));
            if is_void && body.is_empty() {
                return;
            }
            for child in body {
                render(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
        _ => {}
    }
}
