//! Generic component instantiation.
//!
//! When every type parameter of a generic component has an explicit
//! argument, declared types are rewritten with the arguments substituted.
//! Otherwise a dispatch routine is synthesized in a separate namespace so the
//! host compiler can infer the arguments from the values passed to it.

use crate::names::{
    ACTION_TYPE, OBJECT_TYPE, SPLAT_TYPE, TYPE_INFERENCE_CLASS, TYPE_INFERENCE_NAMESPACE,
};
use crate::DocumentPass;
use component_ir::type_name::{GenericTypeNameRewriter, GlobalQualifiedTypeNameRewriter};
use component_ir::{
    collect_refs, ClassDecl, DispatchParameter, DispatchParameterKind, DocumentTree,
    NamespaceDecl, NodeId, NodeKind, TypeInferenceMethod,
};
use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

/// Binds or infers the type arguments of generic components.
pub struct GenericComponentPass;

impl DocumentPass for GenericComponentPass {
    fn name(&self) -> &'static str {
        "generic-component"
    }

    fn order(&self) -> i32 {
        400
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let components = collect_refs(tree, root, |k| {
            matches!(k, NodeKind::Component(c) if c.descriptor.is_generic())
        });
        for reference in components {
            let bindings = type_bindings(tree, reference.node);
            if bindings.values().all(Option::is_some) {
                bind_arguments(tree, reference.node, &bindings);
            } else {
                infer_arguments(tree, reference.node, &bindings);
            }
        }
    }
}

/// Type parameters of a component with the arguments written for them.
fn type_bindings(tree: &DocumentTree, component: NodeId) -> IndexMap<SmolStr, Option<String>> {
    let NodeKind::Component(call) = tree.kind(component) else {
        return IndexMap::new();
    };
    let mut bindings: IndexMap<SmolStr, Option<String>> = call
        .descriptor
        .type_parameters()
        .map(|p| (p.name.clone(), None))
        .collect();
    for &child in tree.children(component) {
        if let NodeKind::ComponentTypeArgument(argument) = tree.kind(child) {
            let text = tree.token_content(child).trim().to_string();
            if let Some(slot) = bindings.get_mut(&argument.type_parameter_name) {
                if !text.is_empty() {
                    *slot = Some(text);
                }
            }
        }
    }
    bindings
}

fn bind_arguments(
    tree: &mut DocumentTree,
    component: NodeId,
    bindings: &IndexMap<SmolStr, Option<String>>,
) {
    let rewriter = GenericTypeNameRewriter::new(
        bindings.iter().map(|(name, argument)| (name.clone(), argument.clone())),
    );
    for child in tree.children(component).to_vec() {
        match tree.kind_mut(child) {
            NodeKind::ComponentAttribute(attribute) => {
                if let Some(type_name) = &attribute.type_name {
                    attribute.type_name = Some(rewriter.rewrite(type_name).into());
                }
            }
            NodeKind::ComponentChildContent(content) => {
                content.type_name = rewriter.rewrite(&content.type_name).into();
            }
            _ => {}
        }
    }

    let arguments: Vec<&str> = bindings
        .values()
        .filter_map(|a| a.as_deref())
        .collect();
    let closed = match tree.kind(component) {
        NodeKind::Component(call) => format!("{}<{}>", call.descriptor.type_name, arguments.join(", ")),
        _ => return,
    };
    debug!(component = %closed, "bound type arguments");
    for child in tree.children(component).to_vec() {
        if let NodeKind::ReferenceCapture(capture) = tree.kind_mut(child) {
            capture.component_capture_type_name = Some(closed.as_str().into());
        }
    }
    if let NodeKind::Component(call) = tree.kind_mut(component) {
        call.type_name = closed.into();
    }
}

/// The class holding dispatch routines, created on first use.
fn type_inference_class(tree: &mut DocumentTree) -> Option<NodeId> {
    let root = tree.root();
    let existing = tree.find_child(root, |k| {
        matches!(k, NodeKind::Namespace(ns) if ns.is_type_inference)
    });
    if let Some(namespace) = existing {
        return tree.find_child(namespace, |k| matches!(k, NodeKind::Class(_)));
    }

    let namespace_name = match tree.primary_namespace().map(|id| tree.kind(id)) {
        Some(NodeKind::Namespace(ns)) => ns.content.clone(),
        _ => return None,
    };
    let class_name = match tree.primary_class().map(|id| tree.kind(id)) {
        Some(NodeKind::Class(class)) => class.class_name.clone(),
        _ => return None,
    };
    let namespace = tree.append_new(
        root,
        NodeKind::Namespace(NamespaceDecl {
            content: format!("{}.{}.{}", TYPE_INFERENCE_NAMESPACE, namespace_name, class_name).into(),
            is_primary: false,
            is_type_inference: true,
        }),
        None,
    );
    let class = tree.append_new(
        namespace,
        NodeKind::Class(ClassDecl {
            class_name: TYPE_INFERENCE_CLASS.into(),
            base_type: None,
            interfaces: Vec::new(),
            modifiers: vec!["internal".into(), "static".into()],
            is_primary: false,
        }),
        None,
    );
    Some(class)
}

fn method_suffix(tag_name: &str) -> String {
    tag_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn infer_arguments(
    tree: &mut DocumentTree,
    component: NodeId,
    bindings: &IndexMap<SmolStr, Option<String>>,
) {
    let Some(class) = type_inference_class(tree) else {
        return;
    };
    let Some(NodeKind::Namespace(namespace)) = tree.parent(class).map(|ns| tree.kind(ns)) else {
        return;
    };
    let full_type_name: SmolStr = format!("{}.{}", namespace.content, TYPE_INFERENCE_CLASS).into();
    let NodeKind::Component(call) = tree.kind(component) else {
        return;
    };
    let type_parameters: Vec<SmolStr> = bindings.keys().cloned().collect();
    let qualifier = GlobalQualifiedTypeNameRewriter::new(type_parameters.iter().cloned());
    let component_type_name = format!(
        "{}<{}>",
        qualifier.rewrite(&call.descriptor.type_name),
        type_parameters.join(", ")
    );
    let index = tree
        .children(class)
        .iter()
        .filter(|&&c| matches!(tree.kind(c), NodeKind::TypeInferenceMethod(_)))
        .count();
    let method_name: SmolStr = format!("Create{}_{}", method_suffix(&call.tag_name), index).into();

    // Attributes and splats keep their relative order.
    let mut attributes = Vec::new();
    let mut child_contents = Vec::new();
    let mut keys = Vec::new();
    let mut captures = Vec::new();
    for child in tree.children(component).to_vec() {
        match tree.kind_mut(child) {
            NodeKind::ComponentAttribute(attribute) => {
                let qualified: SmolStr = attribute
                    .type_name
                    .as_deref()
                    .map_or_else(|| OBJECT_TYPE.into(), |t| qualifier.rewrite(t).into());
                attribute.globally_qualified_type_name = Some(qualified.clone());
                attributes.push((DispatchParameterKind::Attribute, child, qualified.to_string()));
            }
            NodeKind::Splat => {
                attributes.push((DispatchParameterKind::Splat, child, SPLAT_TYPE.to_string()));
            }
            NodeKind::ComponentChildContent(content) => {
                let qualified: SmolStr = qualifier.rewrite(&content.type_name).into();
                content.globally_qualified_type_name = Some(qualified.clone());
                child_contents.push((DispatchParameterKind::ChildContent, child, qualified.to_string()));
            }
            NodeKind::SetKey(_) => {
                keys.push((DispatchParameterKind::Key, child, OBJECT_TYPE.to_string()));
            }
            NodeKind::ReferenceCapture(_) => captures.push(child),
            _ => {}
        }
    }

    let capture_type = format!("{}<{}>", ACTION_TYPE, component_type_name);
    let parameters: Vec<DispatchParameter> = attributes
        .into_iter()
        .chain(child_contents)
        .chain(keys)
        .chain(
            captures
                .into_iter()
                .map(|node| (DispatchParameterKind::Capture, node, capture_type.clone())),
        )
        .enumerate()
        .map(|(i, (kind, node, type_name))| DispatchParameter {
            kind,
            name: format!("__arg{}", i).into(),
            seq_name: (kind != DispatchParameterKind::Key).then(|| format!("__seq{}", i).into()),
            type_name,
            node,
        })
        .collect();

    debug!(method = %method_name, parameters = parameters.len(), "synthesized type inference method");
    let method = tree.append_new(
        class,
        NodeKind::TypeInferenceMethod(TypeInferenceMethod {
            method_name,
            full_type_name,
            component,
            component_type_name,
            type_parameters,
            parameters,
        }),
        None,
    );
    if let NodeKind::Component(call) = tree.kind_mut(component) {
        call.type_inference = Some(method);
    }
}
