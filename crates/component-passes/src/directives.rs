//! Passes that turn template directives into class members.
//!
//! Each directive node is consumed by exactly one pass. A directive without
//! the arguments it needs is dropped with a warning on the class.

use crate::names::{INJECT_ATTRIBUTE, LAYOUT_ATTRIBUTE, ROUTE_ATTRIBUTE};
use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{
    DocumentTree, EmitExtension, EmitMode, ExtensionNode, HostCodeBlock, NodeId, NodeKind, Token,
};
use indexmap::IndexMap;
use source_map::CodeWriter;
use std::sync::Arc;
use tracing::debug;

/// Directive nodes of the component class named `name`, with their argument tokens.
fn take_directives(tree: &mut DocumentTree, name: &str) -> Vec<(NodeId, Vec<String>)> {
    let Some(class) = tree.primary_class() else {
        return Vec::new();
    };
    let matching: Vec<NodeId> = tree
        .children(class)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.kind(c), NodeKind::Directive(d) if d.name == name))
        .collect();
    matching
        .into_iter()
        .map(|id| {
            let arguments: Vec<String> = tree
                .children(id)
                .iter()
                .filter_map(|&t| tree.token(t))
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            tree.detach(id);
            (id, arguments)
        })
        .collect()
}

fn report_malformed(tree: &mut DocumentTree, directive: NodeId, name: &str, expected: &str) {
    let Some(class) = tree.primary_class() else {
        return;
    };
    let diagnostic = factory::malformed_directive(tree.source(directive).cloned(), name, expected);
    tree.add_diagnostic(class, diagnostic);
}

/// Insert a class-level attribute line in front of the component class.
fn insert_before_class(tree: &mut DocumentTree, code: String) {
    let (Some(namespace), Some(class)) = (tree.primary_namespace(), tree.primary_class()) else {
        return;
    };
    let index = tree
        .children(namespace)
        .iter()
        .position(|&c| c == class)
        .unwrap_or(0);
    let block = tree.create(NodeKind::HostCode(HostCodeBlock::default()), None);
    tree.append_token(block, Token::host(code), None);
    tree.insert(namespace, index, block);
}

/// An injected service property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedProperty {
    /// Service type.
    pub type_name: String,
    /// Property name.
    pub member_name: String,
}

impl EmitExtension for InjectedProperty {
    fn emit(&self, writer: &mut CodeWriter, _mode: EmitMode) {
        writer
            .ensure_new_line()
            .write("[")
            .write(INJECT_ATTRIBUTE)
            .write("] private ")
            .write(&self.type_name)
            .write(" ")
            .write(&self.member_name)
            .write_line(" { get; set; }");
    }
}

/// `inject Type Member`: adds an injected property.
pub struct InjectDirectivePass;

impl DocumentPass for InjectDirectivePass {
    fn name(&self) -> &'static str {
        "inject-directive"
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let mut properties: IndexMap<String, InjectedProperty> = IndexMap::new();
        for (directive, arguments) in take_directives(tree, "inject") {
            match arguments.as_slice() {
                [type_name, member_name] => {
                    // Later declarations of the same member win.
                    properties.insert(
                        member_name.clone(),
                        InjectedProperty {
                            type_name: type_name.clone(),
                            member_name: member_name.clone(),
                        },
                    );
                }
                _ => report_malformed(tree, directive, "inject", "a type name and a member name"),
            }
        }
        let Some(class) = tree.primary_class() else {
            return;
        };
        for (member, property) in properties {
            debug!(%member, "injecting property");
            tree.append_new(
                class,
                NodeKind::Extension(ExtensionNode {
                    name: "inject".into(),
                    emitter: Arc::new(property),
                }),
                None,
            );
        }
    }
}

/// `implements I`: adds an interface to the component class.
pub struct ImplementsDirectivePass;

impl DocumentPass for ImplementsDirectivePass {
    fn name(&self) -> &'static str {
        "implements-directive"
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let Some(class) = tree.primary_class() else {
            return;
        };
        for (directive, arguments) in take_directives(tree, "implements") {
            match arguments.as_slice() {
                [interface] => {
                    if let NodeKind::Class(declaration) = tree.kind_mut(class) {
                        if !declaration.interfaces.iter().any(|i| i == interface) {
                            declaration.interfaces.push(interface.as_str().into());
                        }
                    }
                }
                _ => report_malformed(tree, directive, "implements", "an interface name"),
            }
        }
    }
}

/// `layout T`: declares the layout component.
pub struct LayoutDirectivePass;

impl DocumentPass for LayoutDirectivePass {
    fn name(&self) -> &'static str {
        "layout-directive"
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let directives = take_directives(tree, "layout");
        // Only the last layout applies.
        let mut layout = None;
        for (directive, arguments) in directives {
            match arguments.as_slice() {
                [type_name] => layout = Some(type_name.clone()),
                _ => report_malformed(tree, directive, "layout", "a type name"),
            }
        }
        if let Some(type_name) = layout {
            insert_before_class(tree, format!("[{}(typeof({}))]", LAYOUT_ATTRIBUTE, type_name));
        }
    }
}

/// `page "/route"`: adds a route template.
pub struct PageDirectivePass;

impl DocumentPass for PageDirectivePass {
    fn name(&self) -> &'static str {
        "page-directive"
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, tree: &mut DocumentTree) {
        for (directive, arguments) in take_directives(tree, "page") {
            match arguments.as_slice() {
                [route] => {
                    let route = if route.starts_with('"') && route.ends_with('"') && route.len() > 1
                    {
                        route.clone()
                    } else {
                        format!("\"{}\"", route)
                    };
                    insert_before_class(tree, format!("[{}({})]", ROUTE_ATTRIBUTE, route));
                }
                _ => report_malformed(tree, directive, "page", "a route template"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inject_deduplicates_by_member() {
        let mut builder = builder(vec![]);
        builder.directive("inject", &["ILogger", "Log"], None);
        builder.directive("inject", &["IClock", "Clock"], None);
        builder.directive("inject", &["ILogger<Index>", "Log"], None);
        let class = builder.class();
        let mut tree = builder.finish();
        InjectDirectivePass.execute(&mut tree);

        assert_eq!(kinds(&tree, class), vec!["method", "extension", "extension"]);
        let mut writer = CodeWriter::new();
        for &child in &tree.children(class)[1..] {
            if let NodeKind::Extension(extension) = tree.kind(child) {
                extension.emitter.emit(&mut writer, EmitMode::Runtime);
            }
        }
        assert_eq!(
            writer.code(),
            "[global::Microsoft.AspNetCore.Components.InjectAttribute] private ILogger<Index> Log { get; set; }\n\
             [global::Microsoft.AspNetCore.Components.InjectAttribute] private IClock Clock { get; set; }\n"
        );
    }

    #[test]
    fn test_malformed_inject_warns() {
        let mut builder = builder(vec![]);
        builder.directive("inject", &["ILogger"], None);
        let mut tree = builder.finish();
        InjectDirectivePass.execute(&mut tree);

        let diagnostics = tree.collect_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "malformed-directive");
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_implements() {
        let mut builder = builder(vec![]);
        builder.directive("implements", &["IDisposable"], None);
        builder.directive("implements", &["IDisposable"], None);
        let class = builder.class();
        let mut tree = builder.finish();
        ImplementsDirectivePass.execute(&mut tree);

        let NodeKind::Class(declaration) = tree.kind(class) else {
            panic!("expected class");
        };
        assert_eq!(declaration.interfaces, vec!["IDisposable"]);
        assert_eq!(kinds(&tree, class), vec!["method"]);
    }

    #[test]
    fn test_layout_and_page() {
        let mut builder = builder(vec![]);
        builder.directive("layout", &["MainLayout"], None);
        builder.directive("page", &["\"/\""], None);
        builder.directive("page", &["/counter"], None);
        let namespace = builder.namespace();
        let mut tree = builder.finish();
        LayoutDirectivePass.execute(&mut tree);
        PageDirectivePass.execute(&mut tree);

        let code: Vec<String> = tree
            .children(namespace)
            .iter()
            .filter(|&&c| tree.kind(c).name() == "host-code")
            .map(|&c| tree.token_content(c))
            .collect();
        assert_eq!(
            code,
            vec![
                "[global::Microsoft.AspNetCore.Components.LayoutAttribute(typeof(MainLayout))]",
                "[global::Microsoft.AspNetCore.Components.RouteAttribute(\"/\")]",
                "[global::Microsoft.AspNetCore.Components.RouteAttribute(\"/counter\")]",
            ]
        );
        assert_eq!(tree.children(namespace).last().map(|&c| tree.kind(c).name()), Some("class"));
    }
}
