//! Expansion of two-way bind attributes.
//!
//! `bind`, `bind-value` and `bind-value-onchange` attributes expand into a
//! value attribute reading the bound expression and a change attribute
//! assigning it. Element targets wrap the setter into an event handler;
//! component targets receive a plain assignment lambda.

use crate::names::{
    BIND_GET_VALUE, BIND_PREFIX, BIND_SET_VALUE_HANDLER, CHANGED_SUFFIX, FORMAT_PREFIX,
    VALUE_PARAMETER,
};
use crate::DocumentPass;
use component_diagnostics::factory;
use component_ir::{
    collect_refs, AttributeStructure, BoundAttribute, BoundAttributeNode, ComponentAttribute,
    DocumentTree, MarkupAttribute, NodeId, NodeKind, NodeRef, TagDescriptor, Token,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use source_map::SourceSpan;
use std::sync::Arc;
use tracing::debug;

/// Expands bind attributes into value and change attribute pairs.
pub struct BindLoweringPass;

impl DocumentPass for BindLoweringPass {
    fn name(&self) -> &'static str {
        "bind-lowering"
    }

    fn order(&self) -> i32 {
        200
    }

    fn execute(&self, tree: &mut DocumentTree) {
        let root = tree.root();

        let mut parents: Vec<NodeId> = Vec::new();
        for reference in collect_refs(tree, root, is_bind) {
            if !parents.contains(&reference.parent) {
                parents.push(reference.parent);
            }
        }
        for parent in parents {
            resolve_duplicates(tree, parent);
        }

        for mut reference in collect_refs(tree, root, is_bind) {
            if !reference.is_valid(tree) || is_format(tree.kind(reference.node)) {
                continue;
            }
            expand(tree, &mut reference);
        }

        // Format companions whose bind was dropped or failed.
        for reference in collect_refs(tree, root, |k| is_bind(k) && is_format(k)) {
            reference.remove(tree);
        }
    }
}

fn is_bind(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::DirectiveAttribute(a) if a.descriptor.bind_info().is_some())
}

fn is_format(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::DirectiveAttribute(a) if a.attribute_name.starts_with(FORMAT_PREFIX))
}

fn bind_node(tree: &DocumentTree, id: NodeId) -> Option<&BoundAttributeNode> {
    match tree.kind(id) {
        NodeKind::DirectiveAttribute(a) => Some(a),
        _ => None,
    }
}

/// What a bind attribute is attached to.
enum Target {
    Element,
    Component(Arc<TagDescriptor>),
}

fn target(tree: &DocumentTree, parent: NodeId) -> Option<Target> {
    match tree.kind(parent) {
        NodeKind::MarkupElement(_) => Some(Target::Element),
        NodeKind::Component(component) => Some(Target::Component(Arc::clone(&component.descriptor))),
        _ => None,
    }
}

/// Split a bind attribute name into its value and change segments.
///
/// `bind` yields neither, `bind-x` the value only and `bind-x-y` both.
fn parse_bind_name(name: &str) -> Option<(Option<&str>, Option<&str>)> {
    if name == BIND_PREFIX {
        return Some((None, None));
    }
    let rest = name.strip_prefix(BIND_PREFIX)?.strip_prefix('-')?;
    let segments: Vec<&str> = rest.split('-').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    match segments.as_slice() {
        [value] => Some((Some(*value), None)),
        [value, change] => Some((Some(*value), Some(*change))),
        _ => None,
    }
}

/// Resolved names of the two attributes a bind expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BindNames {
    value: SmolStr,
    change: SmolStr,
    value_attribute: Option<BoundAttribute>,
    change_attribute: Option<BoundAttribute>,
}

fn resolve_names(bind: &BoundAttributeNode, target: &Target) -> Option<BindNames> {
    let (parsed_value, parsed_change) = parse_bind_name(&bind.attribute_name)?;
    let info = bind.descriptor.bind_info()?;
    let value = info
        .value_attribute
        .clone()
        .or_else(|| parsed_value.map(SmolStr::from));
    let change = info
        .change_attribute
        .clone()
        .or_else(|| parsed_change.map(SmolStr::from));

    match target {
        Target::Element => Some(BindNames {
            value: value?,
            change: change?,
            value_attribute: None,
            change_attribute: None,
        }),
        Target::Component(descriptor) => {
            let value = value?;
            let change = change.unwrap_or_else(|| format!("{}{}", value, CHANGED_SUFFIX).into());
            let value_attribute = find_ignore_case(descriptor, &value);
            let change_attribute = find_ignore_case(descriptor, &change);
            Some(BindNames {
                value: value_attribute.map_or(value, |a| a.name.clone()),
                change: change_attribute.map_or(change, |a| a.name.clone()),
                value_attribute: value_attribute.cloned(),
                change_attribute: change_attribute.cloned(),
            })
        }
    }
}

fn find_ignore_case<'d>(descriptor: &'d TagDescriptor, name: &str) -> Option<&'d BoundAttribute> {
    descriptor
        .bound_attributes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Name a bind expands its value attribute to, used to group duplicates.
fn grouping_name(tree: &DocumentTree, parent: NodeId, id: NodeId) -> Option<SmolStr> {
    let bind = bind_node(tree, id)?;
    let parsed = parse_bind_name(&bind.attribute_name).and_then(|(value, _)| value);
    let value = bind
        .descriptor
        .bind_info()
        .and_then(|info| info.value_attribute.clone())
        .or_else(|| parsed.map(SmolStr::from));
    let Some(value) = value else {
        return Some(bind.attribute_name.clone());
    };
    match target(tree, parent) {
        Some(Target::Component(descriptor)) => Some(
            find_ignore_case(&descriptor, &value).map_or(value, |a| a.name.clone()),
        ),
        _ => Some(value),
    }
}

/// Drop fallback binds shadowed by specific ones and reject remaining duplicates.
fn resolve_duplicates(tree: &mut DocumentTree, parent: NodeId) {
    let binds: Vec<(NodeId, SmolStr)> = tree
        .children(parent)
        .iter()
        .copied()
        .filter(|&c| is_bind(tree.kind(c)) && !is_format(tree.kind(c)))
        .filter_map(|c| grouping_name(tree, parent, c).map(|name| (c, name)))
        .collect();
    if binds.len() < 2 {
        return;
    }

    let mut removed: FxHashSet<NodeId> = FxHashSet::default();
    for (id, name) in binds.iter().rev() {
        let Some(bind) = bind_node(tree, *id) else {
            continue;
        };
        let descriptor = &bind.descriptor;
        let shadowed = binds.iter().any(|(other, other_name)| {
            if other == id || removed.contains(other) {
                return false;
            }
            let Some(other) = bind_node(tree, *other) else {
                return false;
            };
            let same_target = other_name == name || other.attribute_name == bind.attribute_name;
            let distinct = !Arc::ptr_eq(&other.descriptor, descriptor);
            same_target
                && descriptor.is_fallback_bind()
                && distinct
                && !other.descriptor.is_fallback_bind()
        });
        // `<input bind>` yields to the variant for the element's declared type.
        let shadowed = shadowed
            || (descriptor.is_input_element_fallback_bind()
                && binds.iter().any(|(other, _)| {
                    other != id
                        && !removed.contains(other)
                        && bind_node(tree, *other).is_some_and(|o| {
                            o.attribute_name == bind.attribute_name
                                && o.descriptor.is_input_element_bind()
                        })
                }));
        if shadowed {
            debug!(attribute = %bind.attribute_name, "removing shadowed fallback bind");
            removed.insert(*id);
        }
    }
    for id in &removed {
        tree.detach(*id);
    }

    let mut groups: IndexMap<SmolStr, Vec<NodeId>> = IndexMap::new();
    for (id, name) in binds {
        if !removed.contains(&id) {
            groups.entry(name).or_default().push(id);
        }
    }
    for (name, members) in groups {
        if members.len() < 2 {
            continue;
        }
        let sources: Vec<String> = members
            .iter()
            .filter_map(|&m| bind_node(tree, m))
            .map(|b| b.attribute_name.to_string())
            .collect();
        let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
        let diagnostic =
            factory::duplicate_bind_attribute(tree.source(parent).cloned(), &name, &sources);
        tree.add_diagnostic(parent, diagnostic);
        for member in members {
            tree.detach(member);
        }
    }
}

/// Why the bound expression could not be read.
enum ExpressionError {
    Missing,
    Template,
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// The bound expression as host code; literal text is quoted.
fn bound_expression(tree: &DocumentTree, id: NodeId) -> Result<String, ExpressionError> {
    let mut expression = String::new();
    for &child in tree.children(id) {
        match tree.kind(child) {
            NodeKind::Template => return Err(ExpressionError::Template),
            NodeKind::MarkupContent(_) | NodeKind::MarkupAttributeValue => {
                expression.push_str(&quote(&tree.token_content(child)));
            }
            _ => expression.push_str(&tree.token_content(child)),
        }
    }
    let expression = expression.trim();
    if expression.is_empty() || expression == "\"\"" {
        return Err(ExpressionError::Missing);
    }
    Ok(expression.to_string())
}

/// Take the `format-{value}` companion of a bind, falling back to the descriptor default.
fn take_format(
    tree: &mut DocumentTree,
    parent: NodeId,
    bind: &BoundAttributeNode,
    value: &str,
) -> Option<String> {
    let companion = format!("{}{}", FORMAT_PREFIX, value);
    let found = tree.children(parent).iter().copied().find(|&c| {
        is_format(tree.kind(c))
            && bind_node(tree, c).is_some_and(|b| b.attribute_name.eq_ignore_ascii_case(&companion))
    });
    if let Some(format) = found {
        let text = bound_expression(tree, format).ok();
        tree.detach(format);
        if text.is_some() {
            return text;
        }
    }
    bind.descriptor
        .bind_info()
        .and_then(|info| info.format.as_deref())
        .map(quote)
}

fn expand(tree: &mut DocumentTree, reference: &mut NodeRef) {
    let node = reference.node;
    let parent = reference.parent;
    let Some(bind) = bind_node(tree, node).cloned() else {
        return;
    };
    let span = tree.source(node).cloned();
    let Some(target) = target(tree, parent) else {
        tree.add_diagnostic(node, factory::invalid_bind_syntax(span, &bind.attribute_name));
        return;
    };
    let Some(names) = resolve_names(&bind, &target) else {
        tree.add_diagnostic(node, factory::invalid_bind_syntax(span, &bind.attribute_name));
        return;
    };
    let expression = match bound_expression(tree, node) {
        Ok(expression) => expression,
        Err(ExpressionError::Missing) => {
            tree.add_diagnostic(node, factory::bind_value_missing(span, &bind.attribute_name));
            return;
        }
        // Reported by the template placement check.
        Err(ExpressionError::Template) => return,
    };
    let format = take_format(tree, parent, &bind, &names.value);
    let format_argument = format.map(|f| format!(", {}", f)).unwrap_or_default();
    let get_value = format!("{}({}{})", BIND_GET_VALUE, expression, format_argument);
    let setter = format!("{} => {} = {}", VALUE_PARAMETER, expression, VALUE_PARAMETER);

    let (value, change) = match target {
        Target::Element => {
            let handler = format!(
                "{}({}, {}{})",
                BIND_SET_VALUE_HANDLER, setter, expression, format_argument
            );
            (
                element_attribute(tree, &names.value, get_value, span.clone()),
                element_attribute(tree, &names.change, handler, span),
            )
        }
        Target::Component(_) => (
            component_attribute(
                tree,
                &names.value,
                names.value_attribute.as_ref(),
                get_value,
                span.clone(),
            ),
            component_attribute(
                tree,
                &names.change,
                names.change_attribute.as_ref(),
                setter,
                span,
            ),
        ),
    };

    debug!(attribute = %bind.attribute_name, value = %names.value, change = %names.change, "expanded bind");
    reference.replace(tree, value);
    reference.insert_after(tree, change);
}

fn element_attribute(
    tree: &mut DocumentTree,
    name: &str,
    code: String,
    span: Option<SourceSpan>,
) -> NodeId {
    let attribute = tree.create(NodeKind::MarkupAttribute(MarkupAttribute::quoted(name)), span);
    let value = tree.append_new(attribute, NodeKind::HostExpressionAttributeValue, None);
    tree.append_token(value, Token::host(code), None);
    attribute
}

fn component_attribute(
    tree: &mut DocumentTree,
    name: &str,
    bound: Option<&BoundAttribute>,
    code: String,
    span: Option<SourceSpan>,
) -> NodeId {
    let attribute = tree.create(
        NodeKind::ComponentAttribute(ComponentAttribute {
            attribute_name: name.into(),
            bound: bound.cloned(),
            type_name: bound
                .filter(|b| !b.is_weakly_typed)
                .map(|b| b.type_name.clone()),
            globally_qualified_type_name: None,
            structure: AttributeStructure::DoubleQuotes,
        }),
        span,
    );
    let expression = tree.append_new(attribute, NodeKind::HostExpression, None);
    tree.append_token(expression, Token::host(code), None);
    attribute
}
