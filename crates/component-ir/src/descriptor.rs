//! Tag descriptors: what a tag can bind to.
//!
//! Descriptors are produced by component discovery and consumed here as data.

use smol_str::SmolStr;

/// Wildcard tag name matching every tag.
pub const ANY_TAG: &str = "*";

/// Extra data carried by bind descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct BindInfo {
    /// Attribute receiving the value, overriding the one in the attribute name.
    pub value_attribute: Option<SmolStr>,
    /// Attribute receiving the change handler, overriding the one in the attribute name.
    pub change_attribute: Option<SmolStr>,
    /// The `type` attribute value this descriptor is specific to, such as `checkbox`.
    pub type_attribute: Option<SmolStr>,
    /// Format string applied when the value is rendered.
    pub format: Option<SmolStr>,
    /// Matches any `bind-*` attribute on any tag.
    pub is_fallback: bool,
}

/// The role of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "camelCase"))]
pub enum DescriptorKind {
    /// A component.
    Component,
    /// A child content element of a component.
    ChildContent,
    /// Two-way binding macro.
    Bind(BindInfo),
    /// Reference capture macro.
    Ref,
    /// Key macro.
    Key,
    /// Attribute splat macro.
    Splat,
}

/// A required attribute of a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RequiredAttribute {
    /// Attribute name, or name prefix.
    pub name: SmolStr,
    /// Match any attribute starting with `name`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prefix_match: bool,
    /// Required value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<SmolStr>,
}

impl RequiredAttribute {
    /// Require an attribute by name.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            prefix_match: false,
            value: None,
        }
    }

    /// Require any attribute starting with `prefix`.
    pub fn prefixed(prefix: impl Into<SmolStr>) -> Self {
        Self {
            name: prefix.into(),
            prefix_match: true,
            value: None,
        }
    }

    /// Require an attribute with a specific value.
    pub fn with_value(name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            prefix_match: false,
            value: Some(value.into()),
        }
    }

    /// Check a written attribute against this requirement.
    ///
    /// Names compare case-insensitively, as markup attributes do.
    pub fn matches(&self, name: &str, value: Option<&str>) -> bool {
        let name_matches = if self.prefix_match {
            name.len() >= self.name.len()
                && name.is_char_boundary(self.name.len())
                && name[..self.name.len()].eq_ignore_ascii_case(&self.name)
        } else {
            name.eq_ignore_ascii_case(&self.name)
        };
        name_matches
            && match &self.value {
                Some(expected) => value.is_some_and(|v| v.eq_ignore_ascii_case(expected)),
                None => true,
            }
    }
}

/// When a descriptor applies to a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TagMatchingRule {
    /// Tag name, or [`ANY_TAG`].
    pub tag_name: SmolStr,
    /// Required enclosing tag.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent_tag: Option<SmolStr>,
    /// Required attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<RequiredAttribute>,
}

impl TagMatchingRule {
    /// A rule matching a tag by name.
    pub fn tag(tag_name: impl Into<SmolStr>) -> Self {
        Self {
            tag_name: tag_name.into(),
            parent_tag: None,
            attributes: Vec::new(),
        }
    }

    /// Require the tag to sit directly inside `parent_tag`.
    pub fn with_parent(mut self, parent_tag: impl Into<SmolStr>) -> Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    /// Require an attribute.
    pub fn with_attribute(mut self, attribute: RequiredAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Check whether the rule could apply to `tag_name`, ignoring parent and attributes.
    pub fn matches_tag_name(&self, tag_name: &str) -> bool {
        self.tag_name == ANY_TAG || self.tag_name.eq_ignore_ascii_case(tag_name)
    }

    /// Check the rule against a written tag.
    pub fn matches(
        &self,
        tag_name: &str,
        parent_tag: Option<&str>,
        attributes: &[(&str, Option<&str>)],
    ) -> bool {
        self.matches_tag_name(tag_name)
            && self.parent_tag.as_ref().map_or(true, |required| {
                parent_tag.is_some_and(|p| p.eq_ignore_ascii_case(required))
            })
            && self
                .attributes
                .iter()
                .all(|req| attributes.iter().any(|(n, v)| req.matches(n, *v)))
    }
}

/// An attribute a descriptor declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct BoundAttribute {
    /// Attribute name.
    pub name: SmolStr,
    /// Declared type.
    pub type_name: SmolStr,
    /// Prefix for dictionary-style attributes, such as `bind-`.
    pub indexer_prefix: Option<SmolStr>,
    /// The value is a delegate and is written as a lambda.
    pub is_delegate: bool,
    /// The value is an event callback.
    pub is_event_callback: bool,
    /// The value is a render fragment.
    pub is_child_content: bool,
    /// The render fragment takes a context argument.
    pub is_parameterized_child_content: bool,
    /// The attribute names the context argument of child content.
    pub is_child_content_parameter_name: bool,
    /// The attribute supplies a generic type argument.
    pub is_type_parameter: bool,
    /// The declared type mentions a type parameter.
    pub is_generic_typed: bool,
    /// Values are passed without a type check.
    pub is_weakly_typed: bool,
}

impl BoundAttribute {
    /// Create an attribute with a name and type.
    pub fn new(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Check whether a written attribute name selects this attribute.
    ///
    /// Names compare ordinally; indexer attributes match any name with their prefix.
    pub fn matches(&self, name: &str) -> bool {
        match &self.indexer_prefix {
            Some(prefix) => name.starts_with(prefix.as_str()),
            None => self.name == name,
        }
    }

    /// Check whether values are text rather than host expressions.
    pub fn is_string_property(&self) -> bool {
        matches!(self.type_name.as_str(), "System.String" | "string")
    }
}

/// A descriptor a tag can be matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TagDescriptor {
    /// What the descriptor does.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: DescriptorKind,
    /// Display name.
    pub name: SmolStr,
    /// Full type name. For child content, the name of the owning parameter.
    pub type_name: SmolStr,
    /// Matching rules; any one suffices.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Vec<TagMatchingRule>,
    /// Declared attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bound_attributes: Vec<BoundAttribute>,
}

impl TagDescriptor {
    /// Create a descriptor with no rules or attributes.
    pub fn new(kind: DescriptorKind, name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            name: name.into(),
            type_name: type_name.into(),
            rules: Vec::new(),
            bound_attributes: Vec::new(),
        }
    }

    /// Add a matching rule.
    pub fn with_rule(mut self, rule: TagMatchingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a declared attribute.
    pub fn with_attribute(mut self, attribute: BoundAttribute) -> Self {
        self.bound_attributes.push(attribute);
        self
    }

    /// Check if this describes a component.
    pub fn is_component(&self) -> bool {
        matches!(self.kind, DescriptorKind::Component)
    }

    /// Check if this describes a child content element.
    pub fn is_child_content(&self) -> bool {
        matches!(self.kind, DescriptorKind::ChildContent)
    }

    /// Check if this describes a macro attribute rather than a tag.
    pub fn is_macro(&self) -> bool {
        matches!(
            self.kind,
            DescriptorKind::Bind(_) | DescriptorKind::Ref | DescriptorKind::Key | DescriptorKind::Splat
        )
    }

    /// Bind data, if this is a bind descriptor.
    pub fn bind_info(&self) -> Option<&BindInfo> {
        match &self.kind {
            DescriptorKind::Bind(info) => Some(info),
            _ => None,
        }
    }

    /// Check if this is the catch-all bind descriptor.
    pub fn is_fallback_bind(&self) -> bool {
        self.bind_info().is_some_and(|info| info.is_fallback)
    }

    /// Check if this binds `<input>` without regard to its `type`.
    pub fn is_input_element_fallback_bind(&self) -> bool {
        self.bind_info().is_some_and(|info| {
            !info.is_fallback && info.type_attribute.is_none() && self.targets_tag("input")
        })
    }

    /// Check if this binds `<input>` of one specific `type`.
    pub fn is_input_element_bind(&self) -> bool {
        self.bind_info()
            .is_some_and(|info| info.type_attribute.is_some() && self.targets_tag("input"))
    }

    /// Declared attribute by exact name.
    pub fn find_attribute(&self, name: &str) -> Option<&BoundAttribute> {
        self.bound_attributes.iter().find(|a| a.name == name)
    }

    /// Type parameter attributes, in declaration order.
    pub fn type_parameters(&self) -> impl Iterator<Item = &BoundAttribute> {
        self.bound_attributes.iter().filter(|a| a.is_type_parameter)
    }

    /// Check if the component declares type parameters.
    pub fn is_generic(&self) -> bool {
        self.type_parameters().next().is_some()
    }

    /// The attribute naming the context argument of child content, if declared.
    pub fn child_content_parameter_attribute(&self) -> Option<&BoundAttribute> {
        self.bound_attributes
            .iter()
            .find(|a| a.is_child_content_parameter_name)
    }

    fn targets_tag(&self, tag_name: &str) -> bool {
        self.rules.iter().any(|r| r.tag_name.eq_ignore_ascii_case(tag_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_bind(type_attribute: Option<&str>) -> TagDescriptor {
        TagDescriptor::new(
            DescriptorKind::Bind(BindInfo {
                value_attribute: Some("value".into()),
                change_attribute: Some("onchange".into()),
                type_attribute: type_attribute.map(Into::into),
                ..BindInfo::default()
            }),
            "Bind",
            "Bind",
        )
        .with_rule(TagMatchingRule::tag("input").with_attribute(RequiredAttribute::named("bind")))
    }

    #[test]
    fn test_input_bind_classification() {
        assert!(input_bind(None).is_input_element_fallback_bind());
        assert!(!input_bind(None).is_input_element_bind());
        assert!(input_bind(Some("checkbox")).is_input_element_bind());
        assert!(input_bind(Some("checkbox")).is_macro());
    }

    #[test]
    fn test_rule_matching() {
        let rule = TagMatchingRule::tag("input")
            .with_parent("form")
            .with_attribute(RequiredAttribute::with_value("type", "checkbox"));
        assert!(rule.matches("INPUT", Some("form"), &[("type", Some("checkbox"))]));
        assert!(!rule.matches("input", None, &[("type", Some("checkbox"))]));
        assert!(!rule.matches("input", Some("form"), &[("type", Some("text"))]));

        let prefixed = TagMatchingRule::tag(ANY_TAG).with_attribute(RequiredAttribute::prefixed("bind-"));
        assert!(prefixed.matches("div", None, &[("bind-value", Some("x"))]));
        assert!(!prefixed.matches("div", None, &[("bind", Some("x"))]));
    }

    #[test]
    fn test_bound_attribute_indexer() {
        let mut attribute = BoundAttribute::new("bind-...", "System.Object");
        attribute.indexer_prefix = Some("bind-".into());
        assert!(attribute.matches("bind-value"));
        assert!(!attribute.matches("value"));
        assert!(BoundAttribute::new("Title", "System.String").is_string_property());
    }
}
