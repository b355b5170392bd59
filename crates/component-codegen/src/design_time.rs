//! Emitter for editor tooling.
//!
//! Markup is dropped; every host expression is kept as an assignment to a
//! discard variable so the host compiler type-checks it, and each one is
//! mapped back to where it was written.

use crate::api::DESIGN_TIME_VARIABLE;
use crate::component::{self, open_generic_type_name};
use crate::context::RenderContext;
use crate::writer::NodeWriter;
use crate::EmitResult;
use component_ir::{NodeId, NodeKind};

/// Writes code that preserves user expressions without executing markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignTimeNodeWriter;

/// Write `__o = <tokens>;` for one expression node.
fn write_discard(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let pragma = ctx.writer.begin_line_pragma(tree.source(id));
    ctx.writer.write_start_assignment(DESIGN_TIME_VARIABLE);
    ctx.render_children(id)?;
    ctx.writer.write(";").new_line().end_line_pragma(pragma);
    Ok(())
}

impl NodeWriter for DesignTimeNodeWriter {
    fn write_host_code(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        // Whitespace is kept so statement positions line up with the source.
        let pragma = ctx.writer.begin_line_pragma(tree.source(id));
        ctx.render_children(id)?;
        ctx.writer.ensure_new_line().end_line_pragma(pragma);
        Ok(())
    }

    fn write_host_expression(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        write_discard(ctx, id)
    }

    fn write_markup_content(&self, _ctx: &mut RenderContext<'_>, _id: NodeId) -> EmitResult<()> {
        Ok(())
    }

    fn write_markup_block(&self, _ctx: &mut RenderContext<'_>, _id: NodeId) -> EmitResult<()> {
        Ok(())
    }

    fn write_markup_element(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        ctx.render_children(id)
    }

    fn write_markup_attribute(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        for &value in tree.children(id) {
            if matches!(tree.kind(value), NodeKind::HostExpressionAttributeValue) {
                write_discard(ctx, value)?;
            }
        }
        Ok(())
    }

    fn write_component(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_component(ctx, id)?;
        let tree = ctx.tree;
        let NodeKind::Component(call) = tree.kind(id) else {
            return Ok(());
        };
        // Lets tooling resolve the component type at the tag.
        let type_name = open_generic_type_name(
            &call.descriptor.type_name,
            call.descriptor.type_parameters().count(),
        );
        ctx.writer
            .write_start_assignment(DESIGN_TIME_VARIABLE)
            .write("typeof(")
            .write_mapped(&type_name, tree.source(id))
            .write(");")
            .new_line();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::generate;
    use crate::test_support::*;
    use component_ir::{AttributeInput, DocumentOptions, TagMode};
    use pretty_assertions::assert_eq;
    use source_map::SourceSpan;

    fn design_time_builder(
        descriptors: Vec<component_ir::TagDescriptor>,
    ) -> component_ir::DocumentBuilder<component_ir::DescriptorSet> {
        builder_with(descriptors, DocumentOptions::design_time())
    }

    #[test]
    fn test_expressions_are_discarded() {
        let mut builder = design_time_builder(vec![]);
        let body = builder.body();
        let div = builder.element(
            body,
            "div",
            vec![
                AttributeInput::literal("class", "box"),
                AttributeInput::expression("title", "Title"),
            ],
        );
        builder.text(div, "static");
        builder.expression(div, "Name");
        let output = generate(&lower(builder.finish()));

        assert_lines(&output.code, &["__o = Title;", "__o = Name;"]);
        assert!(output.code.contains("private static object __o = null;"));
        assert!(!output.code.contains("OpenElement"));
    }

    #[test]
    fn test_component_uses_placeholder_sequences() {
        let mut builder = design_time_builder(vec![card()]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![AttributeInput::expression("Count", "total")],
            TagMode::StartTagAndEndTag,
        );
        builder.expression(card.body, "Name");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenComponent<Test.Card>(-1);",
                "__builder.AddAttribute(-1, \"Count\", global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck<System.Int32>(total));",
                "__builder.AddAttribute(-1, \"ChildContent\", (global::Microsoft.AspNetCore.Components.RenderFragment)((__builder2) => {",
                "__o = Name;",
                "}));",
                "__builder.CloseComponent();",
                "__o = typeof(Test.Card);",
            ],
        );
    }

    #[test]
    fn test_generic_typeof_is_open() {
        let mut builder = design_time_builder(vec![grid()]);
        let body = builder.body();
        builder.tag(
            body,
            "Grid",
            vec![
                AttributeInput::literal("TItem", "string"),
                AttributeInput::expression("Items", "names"),
            ],
            TagMode::SelfClosing,
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenComponent<Test.Grid<string>>(-1);",
                "__builder.AddAttribute(-1, \"Items\", global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck<System.Collections.Generic.List<string>>(names));",
                "__builder.CloseComponent();",
                "__o = typeof(Test.Grid<>);",
            ],
        );
    }

    #[test]
    fn test_expressions_are_mapped() {
        let span = SourceSpan::new("Index.razor", 10, 2, 4, 4);
        let mut builder = design_time_builder(vec![]);
        let body = builder.body();
        builder.expression_at(body, "Name", Some(span.clone()));
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &["#line 3 \"Index.razor\"", "__o = Name;", "#line default", "#line hidden"],
        );
        let mapping = &output.source_map.mappings()[0];
        assert_eq!(mapping.original, span);
        let start = mapping.generated.absolute_index as usize;
        assert_eq!(&output.code[start..start + 4], "Name");
    }
}
