use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{collect_refs, DocumentTree, NodeKind};
use tracing::debug;

/// Removes inline templates written inside attribute values.
pub struct TemplateDiagnosticPass;

impl DocumentPass for TemplateDiagnosticPass {
    fn name(&self) -> &'static str {
        "template-diagnostic"
    }

    fn order(&self) -> i32 {
        300
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let templates = collect_refs(tree, root, |k| matches!(k, NodeKind::Template));
        for reference in templates {
            if !tree.is_attached(reference.node) {
                continue;
            }
            let misplaced = tree
                .ancestors(reference.node)
                .any(|a| tree.kind(a).is_attribute_like());
            if !misplaced {
                continue;
            }
            debug!(parent = tree.kind(reference.parent).name(), "template inside attribute");
            let span = tree.source(reference.node).cloned();
            tree.add_diagnostic(reference.parent, factory::template_invalid_location(span));
            reference.remove(tree);
        }
    }
}
