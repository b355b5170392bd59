//! Fixtures for emitter tests.

use component_ir::{
    BindInfo, BoundAttribute, DescriptorKind, DescriptorSet, DocumentBuilder, DocumentOptions,
    DocumentTree, RequiredAttribute, TagDescriptor, TagMatchingRule, ANY_TAG,
};
use pretty_assertions::assert_eq;

pub(crate) fn component(name: &str) -> TagDescriptor {
    TagDescriptor::new(DescriptorKind::Component, format!("Test.{}", name), format!("Test.{}", name))
        .with_rule(TagMatchingRule::tag(name))
}

/// `Card` with a string title, an int count and a click callback.
pub(crate) fn card() -> TagDescriptor {
    component("Card")
        .with_attribute(BoundAttribute::new("Title", "System.String"))
        .with_attribute(BoundAttribute::new("Count", "System.Int32"))
        .with_attribute(BoundAttribute {
            is_event_callback: true,
            ..BoundAttribute::new(
                "OnClick",
                "Microsoft.AspNetCore.Components.EventCallback<System.String>",
            )
        })
}

/// `Grid<TItem>` with an item list.
pub(crate) fn grid() -> TagDescriptor {
    component("Grid")
        .with_attribute(BoundAttribute {
            is_type_parameter: true,
            ..BoundAttribute::new("TItem", "System.Type")
        })
        .with_attribute(BoundAttribute {
            is_generic_typed: true,
            ..BoundAttribute::new("Items", "System.Collections.Generic.List<TItem>")
        })
}

pub(crate) fn input_bind() -> TagDescriptor {
    TagDescriptor::new(
        DescriptorKind::Bind(BindInfo {
            value_attribute: Some("value".into()),
            change_attribute: Some("onchange".into()),
            ..BindInfo::default()
        }),
        "Bind_input",
        "Bind_input",
    )
    .with_rule(TagMatchingRule::tag("input").with_attribute(RequiredAttribute::named("bind")))
    .with_attribute(BoundAttribute::new("bind", "System.Object"))
}

/// Catch-all bind with no element-specific names.
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
    builder_with(descriptors, DocumentOptions::default())
}

pub(crate) fn builder_with(
    descriptors: Vec<TagDescriptor>,
    options: DocumentOptions,
) -> DocumentBuilder<DescriptorSet> {
    DocumentBuilder::new(DescriptorSet::new(descriptors), options)
}

/// Run the default passes.
pub(crate) fn lower(mut tree: DocumentTree) -> DocumentTree {
    component_passes::lower(&mut tree);
    tree
}

/// Assert that `expected` appears as consecutive lines of `code`, ignoring indentation.
pub(crate) fn assert_lines(code: &str, expected: &[&str]) {
    let lines: Vec<&str> = code.lines().map(str::trim).collect();
    let Some(start) = lines.iter().position(|l| *l == expected[0]) else {
        panic!("line {:?} not found in:\n{}", expected[0], code);
    };
    let end = (start + expected.len()).min(lines.len());
    assert_eq!(&lines[start..end], expected, "in:\n{}", code);
}
