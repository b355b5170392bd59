//! Helpers shared by the passes for reading and reshaping attribute content.

use component_ir::{AttributeStructure, DocumentTree, MarkupAttribute, NodeId, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^@?[\p{L}_][\p{L}\p{Nd}_]*$").ok());

/// Check whether text is a valid host-language identifier.
pub(crate) fn is_identifier(text: &str) -> bool {
    IDENTIFIER.as_ref().is_some_and(|re| re.is_match(text))
}

/// Check whether a node is text consisting only of whitespace.
pub(crate) fn is_whitespace_content(tree: &DocumentTree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::MarkupContent(_) => tree.token_content(id).trim().is_empty(),
        NodeKind::Token(token) => token.is_markup() && token.content.trim().is_empty(),
        _ => false,
    }
}

/// The value of an attribute when it is a single piece of literal text.
pub(crate) fn literal_text(tree: &DocumentTree, attribute: NodeId) -> Option<String> {
    match tree.children(attribute) {
        [only] => match tree.kind(*only) {
            NodeKind::MarkupContent(_) | NodeKind::MarkupAttributeValue => {
                Some(tree.token_content(*only))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Turn bound content children into markup attribute values.
pub(crate) fn content_to_attribute_values(tree: &mut DocumentTree, attribute: NodeId) {
    for child in tree.children(attribute).to_vec() {
        let replacement = match tree.kind(child) {
            NodeKind::MarkupContent(_) => NodeKind::MarkupAttributeValue,
            NodeKind::HostExpression => NodeKind::HostExpressionAttributeValue,
            _ => continue,
        };
        tree.set_kind(child, replacement);
    }
}

/// Turn markup attribute values into bound content children.
pub(crate) fn attribute_values_to_content(tree: &mut DocumentTree, attribute: NodeId) {
    for child in tree.children(attribute).to_vec() {
        let replacement = match tree.kind(child) {
            NodeKind::MarkupAttributeValue => {
                NodeKind::MarkupContent(component_ir::MarkupContent::default())
            }
            NodeKind::HostExpressionAttributeValue => NodeKind::HostExpression,
            _ => continue,
        };
        tree.set_kind(child, replacement);
    }
}

/// A markup attribute written with the given quoting.
pub(crate) fn markup_attribute(name: &str, structure: AttributeStructure) -> MarkupAttribute {
    match structure {
        AttributeStructure::Minimized => MarkupAttribute::minimized(name),
        AttributeStructure::DoubleQuotes => MarkupAttribute::quoted(name),
        AttributeStructure::SingleQuotes => MarkupAttribute {
            name: name.into(),
            prefix: format!("{}='", name),
            suffix: "'".to_string(),
        },
        AttributeStructure::NoQuotes => MarkupAttribute {
            name: name.into(),
            prefix: format!("{}=", name),
            suffix: String::new(),
        },
    }
}

/// Node kinds that occupy the attribute list of an element or component.
pub(crate) fn is_attribute_position(kind: &NodeKind) -> bool {
    kind.is_attribute_like()
        || matches!(
            kind,
            NodeKind::ReferenceCapture(_)
                | NodeKind::SetKey(_)
                | NodeKind::Splat
                | NodeKind::ComponentTypeArgument(_)
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("item"));
        assert!(is_identifier("_x1"));
        assert!(is_identifier("@class"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
