use crate::names::{SCRIPT_TAG, SUPPRESS_ERROR_ATTRIBUTE};
use crate::DocumentPass;
use component_diagnostics::factory::{self, SUPPRESS_SCRIPT_TAG_VALUE};
use component_ir::{collect_refs, DocumentTree, NodeKind};

/// Reports script elements unless the author opted out.
///
/// `suppress-error="disallowed-script-tag"` silences the diagnostic and is
/// itself removed from the output.
pub struct ScriptTagPass;

impl DocumentPass for ScriptTagPass {
    fn name(&self) -> &'static str {
        "script-tag"
    }

    fn order(&self) -> i32 {
        450
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let scripts = collect_refs(tree, root, |k| {
            matches!(k, NodeKind::MarkupElement(e) if e.tag_name.eq_ignore_ascii_case(SCRIPT_TAG))
        });
        for reference in scripts {
            let suppression = tree.children(reference.node).iter().copied().find(|&c| {
                matches!(tree.kind(c), NodeKind::MarkupAttribute(a) if a.name.eq_ignore_ascii_case(SUPPRESS_ERROR_ATTRIBUTE))
                    && tree.token_content(c).trim() == SUPPRESS_SCRIPT_TAG_VALUE
            });
            match suppression {
                Some(attribute) => tree.detach(attribute),
                None => {
                    let span = tree.source(reference.node).cloned();
                    tree.add_diagnostic(reference.node, factory::disallowed_script_tag(span));
                }
            }
        }
    }
}
