//! Diagnostics raised while lowering component templates.
//!
//! Diagnostics are plain data: passes attach them to the node they concern
//! and the code generator collects them once the tree has been written.

pub mod factory;

use source_map::SourceSpan;
use std::fmt;

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The rendered message.
    pub message: String,
    /// Where the diagnostic applies, when known.
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Option<SourceSpan>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            span,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            span,
        }
    }

    /// Stable identifier of the diagnostic kind.
    pub fn id(&self) -> &'static str {
        self.code.as_str()
    }

    /// Check if this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            write!(f, "{}: ", span)?;
        }
        write!(
            f,
            "{} {}: {}",
            self.severity.as_str(),
            self.code.as_str(),
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// The generated code is wrong or incomplete.
    Error,
    /// The generated code is usable but probably not what the author meant.
    Warning,
}

impl Severity {
    /// Get the severity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DiagnosticCode {
    // Classification
    /// More than one component matched a tag.
    MultipleComponents,
    /// Significant content next to explicit child content elements.
    ChildContentMixedWithExplicit,
    /// An attribute that child content elements do not accept.
    ChildContentInvalidAttribute,
    /// A child content parameter name that is not literal text.
    ChildContentInvalidParameter,
    /// A component-level parameter name that is not literal text.
    ChildContentInvalidParameterOnComponent,
    /// A child content parameter supplied by attribute and body.
    ChildContentSetByAttributeAndBody,
    /// Nested child content reusing an enclosing parameter name.
    ChildContentRepeatedParameterName,

    // Macro attributes
    /// Malformed bind attribute or empty bound expression.
    InvalidBindSyntax,
    /// Several bind attributes produce the same attribute.
    DuplicateBindAttribute,

    // Structure
    /// A script tag inside a component.
    DisallowedScriptTag,
    /// Mixed markup and code inside a bound attribute.
    UnsupportedComplexContent,
    /// A template inside an attribute value.
    TemplateInvalidLocation,
    /// The same markup attribute twice on one element.
    DuplicateMarkupAttribute,
    /// The same parameter twice on one component.
    DuplicateComponentParameter,
    /// A directive without the tokens it requires.
    MalformedDirective,

    // Emission
    /// A node the code generator cannot write.
    UnsupportedNode,
}

impl DiagnosticCode {
    /// Get the code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleComponents => "multiple-components",
            Self::ChildContentMixedWithExplicit => "child-content-mixed-with-explicit",
            Self::ChildContentInvalidAttribute => "child-content-invalid-attribute",
            Self::ChildContentInvalidParameter => "child-content-invalid-parameter",
            Self::ChildContentInvalidParameterOnComponent => {
                "child-content-invalid-parameter-on-component"
            }
            Self::ChildContentSetByAttributeAndBody => "child-content-set-by-attribute-and-body",
            Self::ChildContentRepeatedParameterName => "child-content-repeated-parameter-name",
            Self::InvalidBindSyntax => "invalid-bind-syntax",
            Self::DuplicateBindAttribute => "duplicate-bind-attribute",
            Self::DisallowedScriptTag => "disallowed-script-tag",
            Self::UnsupportedComplexContent => "unsupported-complex-content",
            Self::TemplateInvalidLocation => "template-invalid-location",
            Self::DuplicateMarkupAttribute => "duplicate-markup-attribute",
            Self::DuplicateComponentParameter => "duplicate-component-parameter",
            Self::MalformedDirective => "malformed-directive",
            Self::UnsupportedNode => "unsupported-node",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_with_span() {
        let span = SourceSpan::new("Index.razor", 0, 2, 4, 3);
        let diagnostic = Diagnostic::error(
            DiagnosticCode::InvalidBindSyntax,
            "bad bind",
            Some(span),
        );
        assert_eq!(
            diagnostic.to_string(),
            "Index.razor(3,5): error invalid-bind-syntax: bad bind"
        );
        assert!(diagnostic.is_error());
    }

    #[test]
    fn test_display_without_span() {
        let diagnostic = Diagnostic::warning(DiagnosticCode::MalformedDirective, "oops", None);
        assert_eq!(diagnostic.to_string(), "warning malformed-directive: oops");
        assert_eq!(diagnostic.id(), "malformed-directive");
    }
}
