//! Node kinds of the intermediate tree.

use crate::descriptor::{BoundAttribute, TagDescriptor};
use crate::options::EmitMode;
use crate::tree::NodeId;
use smol_str::SmolStr;
use source_map::CodeWriter;
use std::fmt;
use std::sync::Arc;

/// Whether a token holds template markup or host-language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal markup text.
    Markup,
    /// Host-language source.
    Host,
}

/// A leaf of literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Markup or host content.
    pub kind: TokenKind,
    /// The text.
    pub content: String,
}

impl Token {
    /// Create a markup token.
    pub fn markup(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Markup,
            content: content.into(),
        }
    }

    /// Create a host-language token.
    pub fn host(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Host,
            content: content.into(),
        }
    }

    /// Check if this token holds host-language code.
    pub fn is_host(&self) -> bool {
        self.kind == TokenKind::Host
    }

    /// Check if this token holds markup.
    pub fn is_markup(&self) -> bool {
        self.kind == TokenKind::Markup
    }
}

/// How an attribute was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeStructure {
    /// `name="value"`
    #[default]
    DoubleQuotes,
    /// `name='value'`
    SingleQuotes,
    /// `name=value`
    NoQuotes,
    /// `name`
    Minimized,
}

/// How a tag was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// `<tag></tag>`
    #[default]
    StartTagAndEndTag,
    /// `<tag />`
    SelfClosing,
    /// `<tag>` with no end tag.
    StartTagOnly,
}

/// A namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Dotted namespace name.
    pub content: SmolStr,
    /// Set on the namespace holding the generated component class.
    pub is_primary: bool,
    /// Set on the synthetic namespace holding type inference routines.
    pub is_type_inference: bool,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Class name.
    pub class_name: SmolStr,
    /// Optional base type.
    pub base_type: Option<SmolStr>,
    /// Implemented interfaces.
    pub interfaces: Vec<SmolStr>,
    /// Modifiers such as `public`, `partial`.
    pub modifiers: Vec<SmolStr>,
    /// Set on the generated component class.
    pub is_primary: bool,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// Parameter type.
    pub type_name: SmolStr,
    /// Parameter name.
    pub name: SmolStr,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub method_name: SmolStr,
    /// Return type.
    pub return_type: SmolStr,
    /// Modifiers such as `protected`, `override`.
    pub modifiers: Vec<SmolStr>,
    /// Parameters.
    pub parameters: Vec<MethodParameter>,
    /// Set on the render method.
    pub is_primary: bool,
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name.
    pub field_name: SmolStr,
    /// Field type.
    pub field_type: SmolStr,
    /// Modifiers such as `private`, `static`.
    pub modifiers: Vec<SmolStr>,
    /// Initializer expression.
    pub initializer: Option<String>,
}

/// An auto-property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Property name.
    pub property_name: SmolStr,
    /// Property type.
    pub property_type: SmolStr,
    /// Modifiers such as `public`.
    pub modifiers: Vec<SmolStr>,
    /// Attributes written above the property, without brackets.
    pub attributes: Vec<String>,
}

/// A host-language statement block. Its children are host tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCodeBlock {
    /// Marks the call to the base render method, which whitespace trimming skips over.
    pub is_base_call: bool,
}

/// A template directive such as `inject` or `layout`. Its children are tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveNode {
    /// Directive keyword.
    pub name: SmolStr,
}

/// Text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkupContent {
    /// Content is already entity-encoded markup rather than text.
    pub is_encoded: bool,
}

/// An attribute of a plain element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupAttribute {
    /// Attribute name.
    pub name: SmolStr,
    /// Text written before the value, usually `name="`.
    pub prefix: String,
    /// Text written after the value, usually `"`.
    pub suffix: String,
}

impl MarkupAttribute {
    /// Create an attribute with the usual quoted prefix and suffix.
    pub fn quoted(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self {
            prefix: format!("{}=\"", name),
            suffix: "\"".to_string(),
            name,
        }
    }

    /// Create an attribute with no value.
    pub fn minimized(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

/// A plain markup element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    /// Tag name.
    pub tag_name: SmolStr,
}

/// Static markup folded into one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupBlock {
    /// Encoded markup text.
    pub content: String,
}

/// A tag that matched at least one descriptor and is not yet classified.
#[derive(Debug, Clone)]
pub struct TagCandidate {
    /// Tag name as written.
    pub tag_name: SmolStr,
    /// How the tag was closed.
    pub mode: TagMode,
    /// Every descriptor that matched, in lookup order.
    pub descriptors: Vec<Arc<TagDescriptor>>,
}

impl TagCandidate {
    /// Check if any matched descriptor is a component.
    pub fn has_component(&self) -> bool {
        self.descriptors.iter().any(|d| d.is_component())
    }

    /// Check if any matched descriptor is a child content slot.
    pub fn has_child_content(&self) -> bool {
        self.descriptors.iter().any(|d| d.is_child_content())
    }
}

/// An attribute of a candidate tag matched to a descriptor attribute.
///
/// Used for both component parameters and macro attributes.
#[derive(Debug, Clone)]
pub struct BoundAttributeNode {
    /// Attribute name as written.
    pub attribute_name: SmolStr,
    /// Descriptor owning the matched attribute.
    pub descriptor: Arc<TagDescriptor>,
    /// The matched attribute.
    pub attribute: BoundAttribute,
    /// How the attribute was written.
    pub structure: AttributeStructure,
}

/// An attribute of a candidate tag no descriptor claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundAttributeNode {
    /// Attribute name as written.
    pub attribute_name: SmolStr,
    /// How the attribute was written.
    pub structure: AttributeStructure,
}

/// A classified component call.
#[derive(Debug, Clone)]
pub struct ComponentCall {
    /// Tag name as written.
    pub tag_name: SmolStr,
    /// The component descriptor.
    pub descriptor: Arc<TagDescriptor>,
    /// Type written in the open-component call.
    pub type_name: SmolStr,
    /// Lambda parameter name for parameterized child content.
    pub child_content_parameter_name: Option<SmolStr>,
    /// Dispatch routine used to construct the component, when type arguments are inferred.
    pub type_inference: Option<NodeId>,
}

/// A parameter passed to a component.
#[derive(Debug, Clone)]
pub struct ComponentAttribute {
    /// Parameter name.
    pub attribute_name: SmolStr,
    /// Matching declared parameter, if any.
    pub bound: Option<BoundAttribute>,
    /// Declared type used for type checks; `None` for weakly typed values.
    pub type_name: Option<SmolStr>,
    /// Type rewritten for use outside the component namespace.
    pub globally_qualified_type_name: Option<SmolStr>,
    /// How the attribute was written.
    pub structure: AttributeStructure,
}

impl ComponentAttribute {
    /// Build a component attribute from a bound attribute node.
    pub fn from_bound(node: &BoundAttributeNode) -> Self {
        Self {
            attribute_name: node.attribute_name.clone(),
            type_name: (!node.attribute.is_weakly_typed).then(|| node.attribute.type_name.clone()),
            bound: Some(node.attribute.clone()),
            globally_qualified_type_name: None,
            structure: node.structure,
        }
    }
}

/// A child content lambda passed to a component.
#[derive(Debug, Clone)]
pub struct ChildContent {
    /// Parameter the lambda is assigned to.
    pub attribute_name: SmolStr,
    /// Matching declared parameter, if any.
    pub bound: Option<BoundAttribute>,
    /// Delegate type of the lambda.
    pub type_name: SmolStr,
    /// Type rewritten for use outside the component namespace.
    pub globally_qualified_type_name: Option<SmolStr>,
    /// Name of the outer lambda parameter.
    pub parameter_name: Option<SmolStr>,
}

impl ChildContent {
    /// Check if the slot takes a context argument.
    pub fn is_parameterized(&self) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|b| b.is_parameterized_child_content)
    }
}

/// An explicit type argument of a generic component. Children are host tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeArgument {
    /// The type parameter it binds.
    pub type_parameter_name: SmolStr,
}

/// What a dispatch routine parameter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchParameterKind {
    /// A component attribute value.
    Attribute,
    /// A child content lambda.
    ChildContent,
    /// An attribute splat, forwarded in attribute order.
    Splat,
    /// The key expression. It carries no sequence number.
    Key,
    /// A reference capture callback.
    Capture,
}

/// One value passed positionally to a dispatch routine.
///
/// Every parameter except the key is preceded by its own sequence number argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchParameter {
    /// What the parameter carries.
    pub kind: DispatchParameterKind,
    /// Parameter name, `__arg{n}`.
    pub name: SmolStr,
    /// Name of the preceding sequence parameter, `__seq{n}`.
    pub seq_name: Option<SmolStr>,
    /// Parameter type.
    pub type_name: String,
    /// The node supplying the value.
    pub node: NodeId,
}

/// A synthesized routine that constructs a generic component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInferenceMethod {
    /// Method name, unique per call site.
    pub method_name: SmolStr,
    /// Fully qualified name of the class holding the method.
    pub full_type_name: SmolStr,
    /// The component call it constructs.
    pub component: NodeId,
    /// Globally qualified component type, open over the type parameters.
    pub component_type_name: String,
    /// Type parameters of the routine.
    pub type_parameters: Vec<SmolStr>,
    /// Value parameters after the builder and sequence number.
    pub parameters: Vec<DispatchParameter>,
}

/// A captured element or component reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCapture {
    /// The field or variable receiving the reference.
    pub identifier: String,
    /// Where the identifier was written.
    pub identifier_source: Option<source_map::SourceSpan>,
    /// Component type for component captures; `None` for element captures.
    pub component_capture_type_name: Option<SmolStr>,
}

impl ReferenceCapture {
    /// Check if this captures a component rather than an element.
    pub fn is_component_capture(&self) -> bool {
        self.component_capture_type_name.is_some()
    }
}

/// A key assigned to an element or component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetKey {
    /// Key expression.
    pub key: String,
    /// Where the expression was written.
    pub key_source: Option<source_map::SourceSpan>,
}

/// Renders an extension node.
pub trait EmitExtension: Send + Sync {
    /// Write the node for the given mode.
    fn emit(&self, writer: &mut CodeWriter, mode: EmitMode);
}

/// A node kind defined outside the closed set, rendered by a callback.
#[derive(Clone)]
pub struct ExtensionNode {
    /// Name used in logs and debug output.
    pub name: SmolStr,
    /// The renderer.
    pub emitter: Arc<dyn EmitExtension>,
}

impl fmt::Debug for ExtensionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Every kind of node in the intermediate tree.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The root.
    Document,
    /// Namespace declaration.
    Namespace(NamespaceDecl),
    /// Class declaration.
    Class(ClassDecl),
    /// Method declaration.
    Method(MethodDecl),
    /// Field declaration.
    Field(FieldDecl),
    /// Property declaration.
    Property(PropertyDecl),
    /// `using` directive.
    Using(SmolStr),
    /// Template directive.
    Directive(DirectiveNode),
    /// Literal text leaf.
    Token(Token),
    /// Host-language statement block.
    HostCode(HostCodeBlock),
    /// Host-language expression rendered as content.
    HostExpression,
    /// Host-language expression inside an attribute value. Children are host tokens.
    HostExpressionAttributeValue,
    /// Text content.
    MarkupContent(MarkupContent),
    /// Attribute of a plain element.
    MarkupAttribute(MarkupAttribute),
    /// Literal segment of a markup attribute value. Children are markup tokens.
    MarkupAttributeValue,
    /// Plain element.
    MarkupElement(MarkupElement),
    /// Folded static markup.
    MarkupBlock(MarkupBlock),
    /// Unclassified tag with matched descriptors.
    TagCandidate(TagCandidate),
    /// Body of an unclassified tag.
    TagBody,
    /// Candidate attribute bound to a component parameter.
    BoundAttribute(BoundAttributeNode),
    /// Candidate attribute nothing claimed.
    UnboundAttribute(UnboundAttributeNode),
    /// Candidate attribute bound to a macro such as bind or ref.
    DirectiveAttribute(BoundAttributeNode),
    /// Component call.
    Component(ComponentCall),
    /// Component parameter value.
    ComponentAttribute(ComponentAttribute),
    /// Component child content lambda.
    ComponentChildContent(ChildContent),
    /// Explicit generic type argument.
    ComponentTypeArgument(TypeArgument),
    /// Synthesized generic dispatch routine.
    TypeInferenceMethod(TypeInferenceMethod),
    /// Reference capture.
    ReferenceCapture(ReferenceCapture),
    /// Key assignment.
    SetKey(SetKey),
    /// Attribute splat. Children hold the expression.
    Splat,
    /// Inline template lambda.
    Template,
    /// Emission-only extension.
    Extension(ExtensionNode),
}

impl NodeKind {
    /// Short name of the kind, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Namespace(_) => "namespace",
            Self::Class(_) => "class",
            Self::Method(_) => "method",
            Self::Field(_) => "field",
            Self::Property(_) => "property",
            Self::Using(_) => "using",
            Self::Directive(_) => "directive",
            Self::Token(_) => "token",
            Self::HostCode(_) => "host-code",
            Self::HostExpression => "host-expression",
            Self::HostExpressionAttributeValue => "host-expression-attribute-value",
            Self::MarkupContent(_) => "markup-content",
            Self::MarkupAttribute(_) => "markup-attribute",
            Self::MarkupAttributeValue => "markup-attribute-value",
            Self::MarkupElement(_) => "markup-element",
            Self::MarkupBlock(_) => "markup-block",
            Self::TagCandidate(_) => "tag-candidate",
            Self::TagBody => "tag-body",
            Self::BoundAttribute(_) => "bound-attribute",
            Self::UnboundAttribute(_) => "unbound-attribute",
            Self::DirectiveAttribute(_) => "directive-attribute",
            Self::Component(_) => "component",
            Self::ComponentAttribute(_) => "component-attribute",
            Self::ComponentChildContent(_) => "component-child-content",
            Self::ComponentTypeArgument(_) => "component-type-argument",
            Self::TypeInferenceMethod(_) => "type-inference-method",
            Self::ReferenceCapture(_) => "reference-capture",
            Self::SetKey(_) => "set-key",
            Self::Splat => "splat",
            Self::Template => "template",
            Self::Extension(_) => "extension",
        }
    }

    /// The token payload, if this is a token.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Check if this kind is one of the attribute shapes of an unclassified tag.
    pub fn is_candidate_attribute(&self) -> bool {
        matches!(
            self,
            Self::BoundAttribute(_) | Self::UnboundAttribute(_) | Self::DirectiveAttribute(_)
        )
    }

    /// Check if this kind sits in the attribute position of an element or component.
    pub fn is_attribute_like(&self) -> bool {
        matches!(
            self,
            Self::MarkupAttribute(_)
                | Self::ComponentAttribute(_)
                | Self::BoundAttribute(_)
                | Self::UnboundAttribute(_)
                | Self::DirectiveAttribute(_)
        )
    }
}
