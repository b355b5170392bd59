//! Constructors for every diagnostic the pipeline reports.

use crate::{Diagnostic, DiagnosticCode};
use source_map::SourceSpan;

/// Attribute value that silences [`disallowed_script_tag`].
pub const SUPPRESS_SCRIPT_TAG_VALUE: &str = "disallowed-script-tag";

/// A tag matched by more than one component.
pub fn multiple_components(
    span: Option<SourceSpan>,
    tag_name: &str,
    components: &[&str],
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::MultipleComponents,
        format!(
            "Multiple components use the tag '{}'. Components: {}",
            tag_name,
            components.join(", ")
        ),
        span,
    )
}

/// Significant content outside the child content elements of a component.
pub fn child_content_mixed_with_explicit(
    span: Option<SourceSpan>,
    component: &str,
    slots: &[&str],
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentMixedWithExplicit,
        format!(
            "Unrecognized child content inside component '{}'. The component accepts child content through these elements: {}",
            component,
            slots.join(", ")
        ),
        span,
    )
}

/// An attribute on a child content element.
pub fn child_content_invalid_attribute(
    span: Option<SourceSpan>,
    attribute: &str,
    slot: &str,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentInvalidAttribute,
        format!(
            "Unrecognized attribute '{}' on child content element '{}'.",
            attribute, slot
        ),
        span,
    )
}

/// A parameter name on a child content element that is not literal text.
pub fn child_content_invalid_parameter(
    span: Option<SourceSpan>,
    attribute: &str,
    slot: &str,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentInvalidParameter,
        format!(
            "Invalid parameter name. The parameter name attribute '{}' on child content element '{}' can only include literal text.",
            attribute, slot
        ),
        span,
    )
}

/// A parameter name on a component that is not literal text.
pub fn child_content_invalid_parameter_on_component(
    span: Option<SourceSpan>,
    attribute: &str,
    component: &str,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentInvalidParameterOnComponent,
        format!(
            "Invalid parameter name. The parameter name attribute '{}' on component '{}' can only include literal text.",
            attribute, component
        ),
        span,
    )
}

/// A child content parameter given both as an attribute and as the body.
pub fn child_content_set_by_attribute_and_body(
    span: Option<SourceSpan>,
    attribute: &str,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentSetByAttributeAndBody,
        format!(
            "The child content property '{}' is set by both the attribute and the element contents.",
            attribute
        ),
        span,
    )
}

/// Nested child content reusing the parameter name of an enclosing one.
pub fn child_content_repeated_parameter_name(
    span: Option<SourceSpan>,
    slot: &str,
    component: &str,
    outer_slot: &str,
    outer_component: &str,
    parameter: &str,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ChildContentRepeatedParameterName,
        format!(
            "The child content element '{}' of component '{}' uses the same parameter name ('{}') as enclosing child content element '{}' of component '{}'. Specify the parameter name like: '<{} Context=\"another_name\">' to resolve the ambiguity",
            slot, component, parameter, outer_slot, outer_component, slot
        ),
        span,
    )
}

/// A bind attribute whose name does not follow the bind grammar.
pub fn invalid_bind_syntax(span: Option<SourceSpan>, attribute: &str) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::InvalidBindSyntax,
        format!(
            "The attribute '{}' was matched by a bind attribute but does not have a valid name. Use 'bind', 'bind-value' or 'bind-value-onevent'.",
            attribute
        ),
        span,
    )
}

/// A bind attribute with nothing to bind.
pub fn bind_value_missing(span: Option<SourceSpan>, attribute: &str) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::InvalidBindSyntax,
        format!("The bind attribute '{}' must have a non-empty value.", attribute),
        span,
    )
}

/// Several bind attributes that expand to the same attribute.
pub fn duplicate_bind_attribute(
    span: Option<SourceSpan>,
    attribute: &str,
    sources: &[&str],
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DuplicateBindAttribute,
        format!(
            "The attribute '{}' was matched by multiple bind attributes. Duplicates: {}",
            attribute,
            sources.join(", ")
        ),
        span,
    )
}

/// A script tag inside a component.
pub fn disallowed_script_tag(span: Option<SourceSpan>) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DisallowedScriptTag,
        format!(
            "Script tags should not be placed inside components because they cannot be updated dynamically. Move the script tag to the host page, or add suppress-error=\"{}\" to keep it.",
            SUPPRESS_SCRIPT_TAG_VALUE
        ),
        span,
    )
}

/// Markup and code mixed inside an attribute that only accepts one kind.
pub fn unsupported_complex_content(span: Option<SourceSpan>, attribute: &str) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::UnsupportedComplexContent,
        format!(
            "Component attributes do not support complex content (mixed C# and markup). Attribute: '{}'",
            attribute
        ),
        span,
    )
}

/// A template used where it cannot be rendered.
pub fn template_invalid_location(span: Option<SourceSpan>) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::TemplateInvalidLocation,
        "Templates cannot be used inside attribute values. The template was removed.",
        span,
    )
}

/// A markup attribute repeated on one element.
pub fn duplicate_markup_attribute(span: Option<SourceSpan>, attribute: &str) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DuplicateMarkupAttribute,
        format!(
            "The attribute '{}' is used two or more times for this element. Attributes must be unique (case-insensitive).",
            attribute
        ),
        span,
    )
}

/// A component parameter repeated on one component.
pub fn duplicate_component_parameter(span: Option<SourceSpan>, attribute: &str) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DuplicateComponentParameter,
        format!(
            "The component parameter '{}' is used two or more times for this component. Parameters must be unique (case-sensitive).",
            attribute
        ),
        span,
    )
}

/// A directive missing a required token.
pub fn malformed_directive(span: Option<SourceSpan>, directive: &str, expected: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::MalformedDirective,
        format!("The '{}' directive expects {}.", directive, expected),
        span,
    )
}

/// A node the code generator cannot write.
pub fn unsupported_node(span: Option<SourceSpan>, detail: impl Into<String>) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::UnsupportedNode, detail, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_multiple_components_lists_all() {
        let diagnostic = multiple_components(None, "Grid", &["A.Grid", "B.Grid"]);
        assert_eq!(diagnostic.code, DiagnosticCode::MultipleComponents);
        assert!(diagnostic.message.contains("A.Grid, B.Grid"));
    }

    #[test]
    fn test_bind_diagnostics_share_code() {
        assert_eq!(
            invalid_bind_syntax(None, "bind--x").code,
            bind_value_missing(None, "bind").code
        );
    }

    #[test]
    fn test_malformed_directive_is_warning() {
        let diagnostic = malformed_directive(None, "inject", "a type and a member name");
        assert_eq!(diagnostic.severity, Severity::Warning);
    }
}
