//! Descriptor fixtures and helpers for pass tests.

use component_ir::{
    BindInfo, BoundAttribute, DescriptorKind, DescriptorSet, DocumentBuilder, DocumentOptions,
    DocumentTree, NodeId, RequiredAttribute, TagDescriptor, TagMatchingRule, ANY_TAG,
};

pub(crate) fn component(name: &str) -> TagDescriptor {
    TagDescriptor::new(DescriptorKind::Component, format!("Test.{}", name), format!("Test.{}", name))
        .with_rule(TagMatchingRule::tag(name))
}

pub(crate) fn string_attribute(name: &str) -> BoundAttribute {
    BoundAttribute::new(name, "System.String")
}

pub(crate) fn child_content_attribute(name: &str) -> BoundAttribute {
    BoundAttribute {
        is_child_content: true,
        ..BoundAttribute::new(name, "Microsoft.AspNetCore.Components.RenderFragment")
    }
}

pub(crate) fn parameterized_child_content_attribute(name: &str, context: &str) -> BoundAttribute {
    BoundAttribute {
        is_child_content: true,
        is_parameterized_child_content: true,
        is_generic_typed: true,
        ..BoundAttribute::new(
            name,
            format!("Microsoft.AspNetCore.Components.RenderFragment<{}>", context),
        )
    }
}

pub(crate) fn context_attribute() -> BoundAttribute {
    BoundAttribute {
        is_child_content_parameter_name: true,
        ..BoundAttribute::new("Context", "System.String")
    }
}

pub(crate) fn type_parameter(name: &str) -> BoundAttribute {
    BoundAttribute {
        is_type_parameter: true,
        ..BoundAttribute::new(name, "System.Type")
    }
}

pub(crate) fn child_content(component: &str, name: &str) -> TagDescriptor {
    TagDescriptor::new(
        DescriptorKind::ChildContent,
        format!("Test.{}.{}", component, name),
        name,
    )
    .with_rule(TagMatchingRule::tag(name).with_parent(component))
    .with_attribute(context_attribute())
}

pub(crate) fn fallback_bind() -> TagDescriptor {
    TagDescriptor::new(
        DescriptorKind::Bind(BindInfo {
            is_fallback: true,
            ..BindInfo::default()
        }),
        "Bind",
        "Bind",
    )
    .with_rule(TagMatchingRule::tag(ANY_TAG).with_attribute(RequiredAttribute::named("bind")))
    .with_rule(TagMatchingRule::tag(ANY_TAG).with_attribute(RequiredAttribute::prefixed("bind-")))
    .with_attribute(BoundAttribute::new("bind", "System.Object"))
    .with_attribute(BoundAttribute {
        indexer_prefix: Some("bind-".into()),
        ..BoundAttribute::new("bind-...", "System.Object")
    })
    .with_attribute(BoundAttribute {
        indexer_prefix: Some("format-".into()),
        ..BoundAttribute::new("format-...", "System.String")
    })
}

pub(crate) fn element_bind(tag: &str, value: &str, change: &str) -> TagDescriptor {
    TagDescriptor::new(
        DescriptorKind::Bind(BindInfo {
            value_attribute: Some(value.into()),
            change_attribute: Some(change.into()),
            ..BindInfo::default()
        }),
        format!("Bind_{}", tag),
        format!("Bind_{}", tag),
    )
    .with_rule(TagMatchingRule::tag(tag).with_attribute(RequiredAttribute::named("bind")))
    .with_attribute(BoundAttribute::new("bind", "System.Object"))
    .with_attribute(BoundAttribute::new(format!("format-{}", value), "System.String"))
}

pub(crate) fn typed_input_bind(type_attribute: &str, value: &str) -> TagDescriptor {
    TagDescriptor::new(
        DescriptorKind::Bind(BindInfo {
            value_attribute: Some(value.into()),
            change_attribute: Some("onchange".into()),
            type_attribute: Some(type_attribute.into()),
            ..BindInfo::default()
        }),
        format!("Bind_input_{}", type_attribute),
        format!("Bind_input_{}", type_attribute),
    )
    .with_rule(
        TagMatchingRule::tag("input")
            .with_attribute(RequiredAttribute::named("bind"))
            .with_attribute(RequiredAttribute::with_value("type", type_attribute)),
    )
    .with_attribute(BoundAttribute::new("bind", "System.Object"))
}

fn macro_descriptor(kind: DescriptorKind, attribute: &str) -> TagDescriptor {
    TagDescriptor::new(kind, attribute, attribute)
        .with_rule(TagMatchingRule::tag(ANY_TAG).with_attribute(RequiredAttribute::named(attribute)))
        .with_attribute(BoundAttribute::new(attribute, "System.Object"))
}

pub(crate) fn ref_descriptor() -> TagDescriptor {
    macro_descriptor(DescriptorKind::Ref, "ref")
}

pub(crate) fn key_descriptor() -> TagDescriptor {
    macro_descriptor(DescriptorKind::Key, "key")
}

pub(crate) fn splat_descriptor() -> TagDescriptor {
    macro_descriptor(DescriptorKind::Splat, "attributes")
}

pub(crate) fn builder(descriptors: Vec<TagDescriptor>) -> DocumentBuilder<DescriptorSet> {
    DocumentBuilder::new(DescriptorSet::new(descriptors), DocumentOptions::default())
}

/// Kind names of the children of `id`.
pub(crate) fn kinds(tree: &DocumentTree, id: NodeId) -> Vec<&'static str> {
    tree.children(id).iter().map(|&c| tree.kind(c).name()).collect()
}

/// Codes of every diagnostic in the document.
pub(crate) fn codes(tree: &DocumentTree) -> Vec<&'static str> {
    tree.collect_diagnostics().iter().map(|d| d.id()).collect()
}
