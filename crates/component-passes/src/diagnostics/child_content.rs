use crate::DocumentPass;
use component_diagnostics::{factory, Diagnostic};
use component_ir::{walk, walk_children, DocumentTree, NodeId, NodeKind, Visitor};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// Checks child content against the component that receives it.
pub struct ChildContentDiagnosticPass;

impl DocumentPass for ChildContentDiagnosticPass {
    fn name(&self) -> &'static str {
        "child-content-diagnostic"
    }

    fn order(&self) -> i32 {
        310
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let mut checker = ChildContentChecker::default();
        walk(&mut checker, tree, tree.root());
        for (node, diagnostic) in checker.found {
            tree.add_diagnostic(node, diagnostic);
        }
    }
}

/// An enclosing parameterized child content.
struct Scope {
    slot: SmolStr,
    component: SmolStr,
    parameter: SmolStr,
}

#[derive(Default)]
struct ChildContentChecker {
    scopes: Vec<Scope>,
    found: Vec<(NodeId, Diagnostic)>,
}

impl Visitor for ChildContentChecker {
    fn visit_component(&mut self, tree: &DocumentTree, id: NodeId) {
        let slots: FxHashSet<&str> = tree
            .children(id)
            .iter()
            .filter_map(|&c| match tree.kind(c) {
                NodeKind::ComponentChildContent(slot) => Some(slot.attribute_name.as_str()),
                _ => None,
            })
            .collect();
        let mut reported = FxHashSet::default();
        for &child in tree.children(id) {
            let NodeKind::ComponentAttribute(attribute) = tree.kind(child) else {
                continue;
            };
            let name = attribute.attribute_name.as_str();
            if slots.contains(name) && reported.insert(name) {
                self.found.push((
                    id,
                    factory::child_content_set_by_attribute_and_body(tree.source(child).cloned(), name),
                ));
            }
        }
        walk_children(self, tree, id);
    }

    fn visit_child_content(&mut self, tree: &DocumentTree, id: NodeId) {
        let NodeKind::ComponentChildContent(slot) = tree.kind(id) else {
            return;
        };
        let parameter = match &slot.parameter_name {
            Some(parameter) if slot.is_parameterized() => parameter.clone(),
            _ => {
                walk_children(self, tree, id);
                return;
            }
        };
        let component = tree
            .parent(id)
            .and_then(|p| match tree.kind(p) {
                NodeKind::Component(component) => Some(component.tag_name.clone()),
                _ => None,
            })
            .unwrap_or_default();

        if let Some(outer) = self.scopes.iter().rev().find(|s| s.parameter == parameter) {
            self.found.push((
                id,
                factory::child_content_repeated_parameter_name(
                    tree.source(id).cloned(),
                    &slot.attribute_name,
                    &component,
                    &outer.slot,
                    &outer.component,
                    &parameter,
                ),
            ));
        }

        self.scopes.push(Scope {
            slot: slot.attribute_name.clone(),
            component,
            parameter,
        });
        walk_children(self, tree, id);
        self.scopes.pop();
    }
}
