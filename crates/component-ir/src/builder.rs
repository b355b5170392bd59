//! Construction of input documents.
//!
//! Front ends describe a parsed template through [`DocumentBuilder`]. Tags are
//! bound against descriptors as they are added: a tag no descriptor applies to
//! becomes a plain element, anything else a [`TagCandidate`] for the passes to
//! classify.

use crate::descriptor::{BoundAttribute, TagDescriptor};
use crate::lookup::{DescriptorLookup, MemoizedLookup};
use crate::node::{
    AttributeStructure, BoundAttributeNode, ClassDecl, DirectiveNode, FieldDecl, HostCodeBlock,
    MarkupAttribute, MarkupContent, MarkupElement, MethodDecl, MethodParameter, NamespaceDecl,
    NodeKind, PropertyDecl, TagCandidate, TagMode, Token, TokenKind, UnboundAttributeNode,
};
use crate::options::DocumentOptions;
use crate::tree::{DocumentTree, NodeId};
use smol_str::SmolStr;
use source_map::SourceSpan;
use std::sync::Arc;

/// Base class of generated components.
pub const COMPONENT_BASE_TYPE: &str = "global::Microsoft.AspNetCore.Components.ComponentBase";
/// Type of the render builder parameter.
pub const RENDER_TREE_BUILDER_TYPE: &str =
    "global::Microsoft.AspNetCore.Components.Rendering.RenderTreeBuilder";
/// Name of the render method.
pub const RENDER_METHOD_NAME: &str = "BuildRenderTree";
/// Name of the render builder parameter.
pub const BUILDER_PARAMETER: &str = "__builder";

/// One segment of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePart {
    /// Literal text or host expression.
    pub kind: TokenKind,
    /// The text.
    pub content: String,
    /// Where the segment was written.
    pub source: Option<SourceSpan>,
}

impl ValuePart {
    /// A literal segment.
    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Markup,
            content: content.into(),
            source: None,
        }
    }

    /// An expression segment.
    pub fn expression(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Host,
            content: content.into(),
            source: None,
        }
    }

    /// Attach a source span.
    pub fn with_source(mut self, source: SourceSpan) -> Self {
        self.source = Some(source);
        self
    }
}

/// An attribute as written on a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInput {
    /// Attribute name.
    pub name: SmolStr,
    /// Value segments; `None` for a minimized attribute.
    pub value: Option<Vec<ValuePart>>,
    /// Where the attribute was written.
    pub source: Option<SourceSpan>,
}

impl AttributeInput {
    /// `name="text"`.
    pub fn literal(name: impl Into<SmolStr>, text: impl Into<String>) -> Self {
        Self::mixed(name, vec![ValuePart::literal(text)])
    }

    /// `name="@expr"`.
    pub fn expression(name: impl Into<SmolStr>, code: impl Into<String>) -> Self {
        Self::mixed(name, vec![ValuePart::expression(code)])
    }

    /// `name` with no value.
    pub fn minimized(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: None,
            source: None,
        }
    }

    /// A value made of several segments.
    pub fn mixed(name: impl Into<SmolStr>, parts: Vec<ValuePart>) -> Self {
        Self {
            name: name.into(),
            value: Some(parts),
            source: None,
        }
    }

    /// Attach a source span.
    pub fn with_source(mut self, source: SourceSpan) -> Self {
        self.source = Some(source);
        self
    }

    fn structure(&self) -> AttributeStructure {
        if self.value.is_some() {
            AttributeStructure::DoubleQuotes
        } else {
            AttributeStructure::Minimized
        }
    }

    /// The value when it is entirely literal text.
    fn literal_value(&self) -> Option<String> {
        let parts = self.value.as_ref()?;
        parts
            .iter()
            .all(|p| p.kind == TokenKind::Markup)
            .then(|| parts.iter().map(|p| p.content.as_str()).collect())
    }
}

/// Nodes created for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHandle {
    /// The element or candidate.
    pub node: NodeId,
    /// Where body content goes: the element itself or the candidate's body.
    pub body: NodeId,
}

/// Builds a document with the conventional namespace, class and render method.
pub struct DocumentBuilder<L> {
    tree: DocumentTree,
    lookup: MemoizedLookup<L>,
    namespace: NodeId,
    class: NodeId,
    method: NodeId,
}

impl<L: DescriptorLookup> DocumentBuilder<L> {
    /// Create a builder for `Test.TestComponent`.
    pub fn new(lookup: L, options: DocumentOptions) -> Self {
        Self::with_names(lookup, options, "Test", "TestComponent")
    }

    /// Create a builder for a component class in a namespace.
    pub fn with_names(lookup: L, options: DocumentOptions, namespace: &str, class: &str) -> Self {
        let mut tree = DocumentTree::new(options);
        let root = tree.root();
        let namespace = tree.append_new(
            root,
            NodeKind::Namespace(NamespaceDecl {
                content: namespace.into(),
                is_primary: true,
                is_type_inference: false,
            }),
            None,
        );
        let class = tree.append_new(
            namespace,
            NodeKind::Class(ClassDecl {
                class_name: class.into(),
                base_type: Some(COMPONENT_BASE_TYPE.into()),
                interfaces: Vec::new(),
                modifiers: vec!["public".into()],
                is_primary: true,
            }),
            None,
        );
        let method = tree.append_new(
            class,
            NodeKind::Method(MethodDecl {
                method_name: RENDER_METHOD_NAME.into(),
                return_type: "void".into(),
                modifiers: vec!["protected".into(), "override".into()],
                parameters: vec![MethodParameter {
                    type_name: RENDER_TREE_BUILDER_TYPE.into(),
                    name: BUILDER_PARAMETER.into(),
                }],
                is_primary: true,
            }),
            None,
        );
        Self {
            tree,
            lookup: MemoizedLookup::new(lookup),
            namespace,
            class,
            method,
        }
    }

    /// The render method, where template content goes.
    pub fn body(&self) -> NodeId {
        self.method
    }

    /// The component class.
    pub fn class(&self) -> NodeId {
        self.class
    }

    /// The component namespace.
    pub fn namespace(&self) -> NodeId {
        self.namespace
    }

    /// The tree built so far.
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Mutable access for shapes the builder has no helper for.
    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    /// Add a `using` directive before the class.
    pub fn using(&mut self, namespace: &str) -> NodeId {
        let using = self.tree.create(NodeKind::Using(namespace.into()), None);
        let index = self
            .tree
            .children(self.namespace)
            .iter()
            .position(|&c| !matches!(self.tree.kind(c), NodeKind::Using(_)))
            .unwrap_or(0);
        self.tree.insert(self.namespace, index, using);
        using
    }

    /// Add a template directive with its argument tokens.
    pub fn directive(&mut self, name: &str, tokens: &[&str], source: Option<SourceSpan>) -> NodeId {
        let directive = self.tree.append_new(
            self.class,
            NodeKind::Directive(DirectiveNode { name: name.into() }),
            source,
        );
        for token in tokens {
            self.tree.append_token(directive, Token::host(*token), None);
        }
        directive
    }

    /// Add a field to the class.
    pub fn field(&mut self, field: FieldDecl) -> NodeId {
        self.tree.append_new(self.class, NodeKind::Field(field), None)
    }

    /// Add a property to the class.
    pub fn property(&mut self, property: PropertyDecl) -> NodeId {
        self.tree.append_new(self.class, NodeKind::Property(property), None)
    }

    /// Add literal text.
    pub fn text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.content(parent, text, false, None)
    }

    /// Add markup that is already entity-encoded.
    pub fn encoded(&mut self, parent: NodeId, markup: &str) -> NodeId {
        self.content(parent, markup, true, None)
    }

    /// Add literal text with a source span.
    pub fn content(
        &mut self,
        parent: NodeId,
        text: &str,
        is_encoded: bool,
        source: Option<SourceSpan>,
    ) -> NodeId {
        let content = self.tree.append_new(
            parent,
            NodeKind::MarkupContent(MarkupContent { is_encoded }),
            source.clone(),
        );
        self.tree.append_token(content, Token::markup(text), source);
        content
    }

    /// Add an expression rendered as content.
    pub fn expression(&mut self, parent: NodeId, code: &str) -> NodeId {
        self.expression_at(parent, code, None)
    }

    /// Add an expression with a source span.
    pub fn expression_at(&mut self, parent: NodeId, code: &str, source: Option<SourceSpan>) -> NodeId {
        let expression = self
            .tree
            .append_new(parent, NodeKind::HostExpression, source.clone());
        self.tree.append_token(expression, Token::host(code), source);
        expression
    }

    /// Add a statement block.
    pub fn code(&mut self, parent: NodeId, code: &str) -> NodeId {
        self.code_at(parent, code, None)
    }

    /// Add a statement block with a source span.
    pub fn code_at(&mut self, parent: NodeId, code: &str, source: Option<SourceSpan>) -> NodeId {
        let block = self.tree.append_new(
            parent,
            NodeKind::HostCode(HostCodeBlock::default()),
            source.clone(),
        );
        self.tree.append_token(block, Token::host(code), source);
        block
    }

    /// Add the call to the base render method.
    pub fn base_call(&mut self, parent: NodeId) -> NodeId {
        let block = self.tree.append_new(
            parent,
            NodeKind::HostCode(HostCodeBlock { is_base_call: true }),
            None,
        );
        self.tree.append_token(
            block,
            Token::host(format!("base.{}({});", RENDER_METHOD_NAME, BUILDER_PARAMETER)),
            None,
        );
        block
    }

    /// Add an inline template; its content goes inside the returned node.
    pub fn template(&mut self, parent: NodeId) -> NodeId {
        self.tree.append_new(parent, NodeKind::Template, None)
    }

    /// Add a plain element without consulting descriptors.
    pub fn element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attributes: Vec<AttributeInput>,
    ) -> NodeId {
        let element = self.tree.append_new(
            parent,
            NodeKind::MarkupElement(MarkupElement {
                tag_name: tag_name.into(),
            }),
            None,
        );
        for attribute in attributes {
            self.markup_attribute(element, attribute);
        }
        element
    }

    /// Add a tag, binding it against the descriptors that apply to it.
    pub fn tag(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attributes: Vec<AttributeInput>,
        mode: TagMode,
    ) -> TagHandle {
        let parent_tag = self.enclosing_tag(parent);
        let literal_values: Vec<Option<String>> =
            attributes.iter().map(AttributeInput::literal_value).collect();
        let written: Vec<(&str, Option<&str>)> = attributes
            .iter()
            .zip(&literal_values)
            .map(|(a, v)| (a.name.as_str(), v.as_deref().or(a.value.as_ref().map(|_| ""))))
            .collect();
        let descriptors: Vec<Arc<TagDescriptor>> = self
            .lookup
            .resolve(tag_name)
            .into_iter()
            .filter(|d| {
                d.rules
                    .iter()
                    .any(|r| r.matches(tag_name, parent_tag.as_deref(), &written))
            })
            .collect();

        if descriptors.is_empty() {
            let element = self.element(parent, tag_name, attributes);
            return TagHandle {
                node: element,
                body: element,
            };
        }

        let candidate = self.tree.append_new(
            parent,
            NodeKind::TagCandidate(TagCandidate {
                tag_name: tag_name.into(),
                mode,
                descriptors: descriptors.clone(),
            }),
            None,
        );
        for attribute in attributes {
            self.bind_attribute(candidate, &descriptors, attribute);
        }
        let body = self.tree.append_new(candidate, NodeKind::TagBody, None);
        TagHandle {
            node: candidate,
            body,
        }
    }

    /// Set the source span of a node.
    pub fn set_source(&mut self, node: NodeId, source: SourceSpan) {
        self.tree.set_source(node, Some(source));
    }

    /// Finish the document.
    pub fn finish(self) -> DocumentTree {
        self.tree
    }

    fn enclosing_tag(&self, parent: NodeId) -> Option<SmolStr> {
        std::iter::once(parent)
            .chain(self.tree.ancestors(parent))
            .find_map(|id| match self.tree.kind(id) {
                NodeKind::MarkupElement(element) => Some(element.tag_name.clone()),
                NodeKind::TagCandidate(candidate) => Some(candidate.tag_name.clone()),
                _ => None,
            })
    }

    fn markup_attribute(&mut self, element: NodeId, attribute: AttributeInput) {
        let Some(parts) = attribute.value else {
            self.tree.append_new(
                element,
                NodeKind::MarkupAttribute(MarkupAttribute::minimized(attribute.name)),
                attribute.source,
            );
            return;
        };
        let node = self.tree.append_new(
            element,
            NodeKind::MarkupAttribute(MarkupAttribute::quoted(attribute.name)),
            attribute.source,
        );
        self.append_attribute_values(node, parts);
    }

    fn append_attribute_values(&mut self, parent: NodeId, parts: Vec<ValuePart>) {
        for part in parts {
            let kind = match part.kind {
                TokenKind::Markup => NodeKind::MarkupAttributeValue,
                TokenKind::Host => NodeKind::HostExpressionAttributeValue,
            };
            let value = self.tree.append_new(parent, kind, part.source.clone());
            self.tree.append_token(
                value,
                Token {
                    kind: part.kind,
                    content: part.content,
                },
                part.source,
            );
        }
    }

    fn bind_attribute(
        &mut self,
        candidate: NodeId,
        descriptors: &[Arc<TagDescriptor>],
        attribute: AttributeInput,
    ) {
        let matches: Vec<(Arc<TagDescriptor>, BoundAttribute)> = descriptors
            .iter()
            .flat_map(|d| {
                self.lookup
                    .attributes_of(d)
                    .iter()
                    .filter(|a| a.matches(&attribute.name))
                    .map(move |a| (Arc::clone(d), a.clone()))
            })
            .collect();

        if matches.is_empty() {
            let node = self.tree.append_new(
                candidate,
                NodeKind::UnboundAttribute(UnboundAttributeNode {
                    attribute_name: attribute.name.clone(),
                    structure: attribute.structure(),
                }),
                attribute.source.clone(),
            );
            if let Some(parts) = attribute.value {
                self.append_attribute_values(node, parts);
            }
            return;
        }

        for (descriptor, bound) in matches {
            let payload = BoundAttributeNode {
                attribute_name: attribute.name.clone(),
                structure: attribute.structure(),
                attribute: bound,
                descriptor,
            };
            let kind = if payload.descriptor.is_macro() {
                NodeKind::DirectiveAttribute(payload.clone())
            } else {
                NodeKind::BoundAttribute(payload.clone())
            };
            let node = self
                .tree
                .append_new(candidate, kind, attribute.source.clone());
            if let Some(parts) = &attribute.value {
                self.append_bound_value(node, &payload.attribute, parts);
            }
        }
    }

    /// Bound values are content rather than attribute values: literal text for
    /// string attributes, host expressions for everything else.
    fn append_bound_value(&mut self, node: NodeId, bound: &BoundAttribute, parts: &[ValuePart]) {
        let single = parts.len() == 1;
        for part in parts {
            let as_text = part.kind == TokenKind::Markup && (!single || bound.is_string_property());
            if as_text {
                self.content(node, &part.content, false, part.source.clone());
            } else {
                self.expression_at(node, &part.content, part.source.clone());
            }
        }
    }
}
