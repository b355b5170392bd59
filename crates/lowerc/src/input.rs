//! Serialized input documents.
//!
//! A `*.component.json` file describes one parsed template: the component
//! class, its directives and the content tree. Tags are bound against the
//! configured descriptors while the document is built.

use component_ir::{
    AttributeInput, DescriptorLookup, DocumentBuilder, DocumentOptions, DocumentTree, NodeId,
    TagMode, ValuePart,
};
use serde::{Deserialize, Serialize};
use source_map::SourceSpan;
use std::path::Path;
use thiserror::Error;

/// Input document errors.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid document.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One serialized template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDocument {
    /// Namespace of the generated class.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Name of the generated class; defaults to the file stem.
    #[serde(default)]
    pub class_name: Option<String>,
    /// Namespaces imported by the document.
    #[serde(default)]
    pub usings: Vec<String>,
    /// Directives such as `inject` or `page`.
    #[serde(default)]
    pub directives: Vec<InputDirective>,
    /// Top-level content of the render method.
    #[serde(default)]
    pub nodes: Vec<InputNode>,
}

fn default_namespace() -> String {
    "__GeneratedComponent".to_string()
}

/// A directive and its tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDirective {
    pub name: String,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub source: Option<SourceSpan>,
}

/// Content of the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputNode {
    /// Literal text.
    Text { text: String },
    /// Already-encoded markup.
    Markup { markup: String },
    /// `@expr`
    Expression {
        code: String,
        #[serde(default)]
        source: Option<SourceSpan>,
    },
    /// `@{ code }`
    Code {
        code: String,
        #[serde(default)]
        source: Option<SourceSpan>,
    },
    /// `@<tag>...</tag>` inside an expression.
    Template {
        #[serde(default)]
        children: Vec<InputNode>,
    },
    /// An element or component tag.
    Tag {
        name: String,
        #[serde(default)]
        attributes: Vec<InputAttribute>,
        #[serde(default)]
        self_closing: bool,
        #[serde(default)]
        children: Vec<InputNode>,
        #[serde(default)]
        source: Option<SourceSpan>,
    },
}

/// An attribute as written.
///
/// `parts` wins over `expression`, which wins over `value`; with none of
/// them the attribute is minimized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputAttribute {
    pub name: String,
    pub value: Option<String>,
    pub expression: Option<String>,
    pub parts: Option<Vec<InputValuePart>>,
    pub source: Option<SourceSpan>,
}

/// One segment of a mixed attribute value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputValuePart {
    Literal(String),
    Expression(String),
}

impl InputAttribute {
    fn to_attribute(&self) -> AttributeInput {
        let attribute = if let Some(parts) = &self.parts {
            let parts = parts
                .iter()
                .map(|part| match part {
                    InputValuePart::Literal(text) => ValuePart::literal(text.as_str()),
                    InputValuePart::Expression(code) => ValuePart::expression(code.as_str()),
                })
                .collect();
            AttributeInput::mixed(self.name.as_str(), parts)
        } else if let Some(code) = &self.expression {
            AttributeInput::expression(self.name.as_str(), code.as_str())
        } else if let Some(text) = &self.value {
            AttributeInput::literal(self.name.as_str(), text.as_str())
        } else {
            AttributeInput::minimized(self.name.as_str())
        };
        match &self.source {
            Some(source) => attribute.with_source(source.clone()),
            None => attribute,
        }
    }
}

impl InputDocument {
    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| InputError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Build the document tree, binding tags against `lookup`.
    pub fn build<L: DescriptorLookup>(
        &self,
        lookup: L,
        options: DocumentOptions,
        default_class_name: &str,
    ) -> DocumentTree {
        let class_name = self.class_name.as_deref().unwrap_or(default_class_name);
        let mut builder = DocumentBuilder::with_names(lookup, options, &self.namespace, class_name);
        for namespace in &self.usings {
            builder.using(namespace);
        }
        for directive in &self.directives {
            let tokens: Vec<&str> = directive.tokens.iter().map(String::as_str).collect();
            builder.directive(&directive.name, &tokens, directive.source.clone());
        }
        let body = builder.body();
        add_nodes(&mut builder, body, &self.nodes);
        builder.finish()
    }
}

fn add_nodes<L: DescriptorLookup>(
    builder: &mut DocumentBuilder<L>,
    parent: NodeId,
    nodes: &[InputNode],
) {
    for node in nodes {
        match node {
            InputNode::Text { text } => {
                builder.text(parent, text);
            }
            InputNode::Markup { markup } => {
                builder.encoded(parent, markup);
            }
            InputNode::Expression { code, source } => {
                builder.expression_at(parent, code, source.clone());
            }
            InputNode::Code { code, source } => {
                builder.code_at(parent, code, source.clone());
            }
            InputNode::Template { children } => {
                let template = builder.template(parent);
                add_nodes(builder, template, children);
            }
            InputNode::Tag {
                name,
                attributes,
                self_closing,
                children,
                source,
            } => {
                let mode = if *self_closing {
                    TagMode::SelfClosing
                } else {
                    TagMode::StartTagAndEndTag
                };
                let attributes = attributes.iter().map(InputAttribute::to_attribute).collect();
                let handle = builder.tag(parent, name, attributes, mode);
                if let Some(source) = source {
                    builder.set_source(handle.node, source.clone());
                }
                add_nodes(builder, handle.body, children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_ir::{
        BoundAttribute, DescriptorKind, DescriptorSet, NodeKind, TagDescriptor, TagMatchingRule,
    };
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{
        "namespace": "App.Pages",
        "usings": ["System.Linq"],
        "directives": [{ "name": "page", "tokens": ["\"/counter\""] }],
        "nodes": [
            { "type": "tag", "name": "h1", "children": [{ "type": "text", "text": "Counter" }] },
            {
                "type": "tag",
                "name": "Card",
                "attributes": [{ "name": "Title", "value": "Hello" }],
                "children": [{ "type": "expression", "code": "count" }]
            },
            {
                "type": "tag",
                "name": "button",
                "attributes": [
                    { "name": "class", "parts": [{ "literal": "btn " }, { "expression": "css" }] },
                    { "name": "disabled" }
                ]
            }
        ]
    }"#;

    fn card() -> TagDescriptor {
        TagDescriptor::new(DescriptorKind::Component, "App.Card", "App.Card")
            .with_rule(TagMatchingRule::tag("Card"))
            .with_attribute(BoundAttribute::new("Title", "System.String"))
    }

    #[test]
    fn test_parse_document() {
        let document: InputDocument = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(document.namespace, "App.Pages");
        assert_eq!(document.class_name, None);
        assert_eq!(document.nodes.len(), 3);

        let InputNode::Tag { attributes, .. } = &document.nodes[2] else {
            panic!("expected a tag");
        };
        let class = attributes[0].to_attribute();
        assert_eq!(
            class.value,
            Some(vec![ValuePart::literal("btn "), ValuePart::expression("css")])
        );
        assert_eq!(attributes[1].to_attribute().value, None);
    }

    #[test]
    fn test_build_binds_tags() {
        let document: InputDocument = serde_json::from_str(DOCUMENT).unwrap();
        let descriptors = DescriptorSet::new(vec![card()]);
        let tree = document.build(&descriptors, DocumentOptions::default(), "Counter");

        let kinds: Vec<&str> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::Class(class) => Some(class.class_name.as_str()),
                NodeKind::MarkupElement(element) => Some(element.tag_name.as_str()),
                NodeKind::TagCandidate(candidate) => Some(candidate.tag_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["Counter", "h1", "Card", "button"]);
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let result = serde_json::from_str::<InputDocument>(r#"{ "nodes": [{ "type": "comment" }] }"#);
        assert!(result.is_err());
    }
}
