//! Emitter for executable render code.

use crate::api::render_tree_builder as rtb;
use crate::context::RenderContext;
use crate::writer::NodeWriter;
use crate::EmitResult;
use component_ir::{NodeId, NodeKind};
use source_map::SourceSpan;

/// Writes render tree builder calls with increasing sequence numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeNodeWriter;

/// One segment of a plain attribute value.
enum ValueSegment<'a> {
    Literal(String),
    Host(&'a str, Option<&'a SourceSpan>),
}

fn attribute_segments<'a>(ctx: &RenderContext<'a>, id: NodeId) -> Vec<ValueSegment<'a>> {
    let tree = ctx.tree;
    let mut segments = Vec::new();
    for &value in tree.children(id) {
        match tree.kind(value) {
            NodeKind::MarkupAttributeValue => {
                segments.push(ValueSegment::Literal(tree.token_content(value)));
            }
            NodeKind::HostExpressionAttributeValue => {
                for token in tree.descendants(value) {
                    if let Some(t) = tree.token(token).filter(|t| t.is_host()) {
                        segments.push(ValueSegment::Host(&t.content, tree.source(token)));
                    }
                }
            }
            _ => {}
        }
    }
    segments
}

impl NodeWriter for RuntimeNodeWriter {
    fn write_host_code(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        // Whitespace-only statements have no effect at runtime.
        if tree.token_content(id).trim().is_empty() {
            return Ok(());
        }
        let pragma = ctx.writer.begin_line_pragma(tree.source(id));
        for &child in tree.children(id) {
            ctx.render(child)?;
        }
        ctx.writer.ensure_new_line().end_line_pragma(pragma);
        Ok(())
    }

    fn write_host_expression(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        let builder = ctx.builder();
        let sequence = ctx.next_sequence();
        let pragma = ctx.writer.begin_line_pragma(tree.source(id));
        ctx.writer
            .write(&builder)
            .write(".")
            .write_start_method_invocation(rtb::ADD_CONTENT)
            .write(&sequence)
            .write_parameter_separator();
        ctx.render_children(id)?;
        ctx.writer.write_end_method_invocation().end_line_pragma(pragma);
        Ok(())
    }

    fn write_markup_content(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        let NodeKind::MarkupContent(content) = tree.kind(id) else {
            return Ok(());
        };
        let method = if content.is_encoded {
            rtb::ADD_MARKUP_CONTENT
        } else {
            rtb::ADD_CONTENT
        };
        let builder = ctx.builder();
        let sequence = ctx.next_sequence();
        ctx.writer
            .write(&builder)
            .write(".")
            .write_start_method_invocation(method)
            .write(&sequence)
            .write_parameter_separator()
            .write_string_literal(&tree.token_content(id))
            .write_end_method_invocation();
        Ok(())
    }

    fn write_markup_block(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        let NodeKind::MarkupBlock(block) = tree.kind(id) else {
            return Ok(());
        };
        let builder = ctx.builder();
        let sequence = ctx.next_sequence();
        ctx.writer
            .write(&builder)
            .write(".")
            .write_start_method_invocation(rtb::ADD_MARKUP_CONTENT)
            .write(&sequence)
            .write_parameter_separator()
            .write_string_literal(&block.content)
            .write_end_method_invocation();
        Ok(())
    }

    fn write_markup_element(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        let NodeKind::MarkupElement(element) = tree.kind(id) else {
            return Ok(());
        };
        let builder = ctx.builder();
        let sequence = ctx.next_sequence();
        ctx.writer
            .write(&builder)
            .write(".")
            .write_start_method_invocation(rtb::OPEN_ELEMENT)
            .write(&sequence)
            .write_parameter_separator()
            .write_string_literal(&element.tag_name)
            .write_end_method_invocation();

        // Attributes and splats keep their relative order so later values win.
        ctx.render_children_where(id, |k| {
            matches!(
                k,
                NodeKind::MarkupAttribute(_) | NodeKind::ComponentAttribute(_) | NodeKind::Splat
            )
        })?;
        ctx.render_children_where(id, |k| matches!(k, NodeKind::SetKey(_)))?;
        ctx.render_children_where(id, |k| matches!(k, NodeKind::ReferenceCapture(_)))?;
        ctx.render_children_where(id, |k| {
            !matches!(
                k,
                NodeKind::MarkupAttribute(_)
                    | NodeKind::ComponentAttribute(_)
                    | NodeKind::Splat
                    | NodeKind::SetKey(_)
                    | NodeKind::ReferenceCapture(_)
            )
        })?;

        ctx.writer
            .write(&builder)
            .write(".")
            .write(rtb::CLOSE_ELEMENT)
            .write("();")
            .new_line();
        Ok(())
    }

    fn write_markup_attribute(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        let tree = ctx.tree;
        let NodeKind::MarkupAttribute(attribute) = tree.kind(id) else {
            return Ok(());
        };
        let segments = attribute_segments(ctx, id);
        let builder = ctx.builder();
        let sequence = ctx.next_sequence();
        ctx.writer
            .write(&builder)
            .write(".")
            .write_start_method_invocation(rtb::ADD_ATTRIBUTE)
            .write(&sequence)
            .write_parameter_separator()
            .write_string_literal(&attribute.name);

        if segments.is_empty() {
            if !ctx.options().omit_minimized_component_attribute_values {
                ctx.writer.write_parameter_separator().write_boolean_literal(true);
            }
            ctx.writer.write_end_method_invocation();
            return Ok(());
        }

        ctx.writer.write_parameter_separator();
        let has_literal = segments.iter().any(|s| matches!(s, ValueSegment::Literal(_)));
        let has_host = segments.iter().any(|s| matches!(s, ValueSegment::Host(..)));
        if has_literal && !has_host {
            let text: String = segments
                .iter()
                .filter_map(|s| match s {
                    ValueSegment::Literal(text) => Some(text.as_str()),
                    ValueSegment::Host(..) => None,
                })
                .collect();
            ctx.writer.write_string_literal(&text);
        } else if has_host && !has_literal {
            for segment in &segments {
                if let ValueSegment::Host(code, source) = segment {
                    ctx.writer.write_mapped(code, *source);
                }
            }
        } else {
            for (index, segment) in segments.iter().enumerate() {
                if index > 0 {
                    ctx.writer.write(" + ");
                }
                match segment {
                    ValueSegment::Literal(text) => {
                        ctx.writer.write_string_literal(text);
                    }
                    ValueSegment::Host(code, source) => {
                        ctx.writer.write("(").write_mapped(code, *source).write(")");
                    }
                }
            }
        }
        ctx.writer.write_end_method_invocation();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::generate;
    use crate::test_support::*;
    use component_ir::{AttributeInput, DocumentOptions, TagMode, ValuePart};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_elements_and_content() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        let div = builder.element(
            body,
            "div",
            vec![
                AttributeInput::literal("class", "box"),
                AttributeInput::expression("title", "Title"),
            ],
        );
        builder.text(div, "Hello, \"world\"");
        builder.expression(div, "Name");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenElement(0, \"div\");",
                "__builder.AddAttribute(1, \"class\", \"box\");",
                "__builder.AddAttribute(2, \"title\", Title);",
                "__builder.AddContent(3, \"Hello, \\\"world\\\"\");",
                "__builder.AddContent(4, Name);",
                "__builder.CloseElement();",
            ],
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_static_markup_is_folded() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        let h1 = builder.element(body, "h1", vec![]);
        builder.text(h1, "Hi & bye");
        builder.code(body, "var x = 1;");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.AddMarkupContent(0, \"<h1>Hi &amp; bye</h1>\");",
                "var x = 1;",
            ],
        );
    }

    #[test]
    fn test_mixed_and_minimized_attributes() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        builder.element(
            body,
            "button",
            vec![
                AttributeInput::mixed(
                    "class",
                    vec![ValuePart::literal("btn btn-"), ValuePart::expression("Kind")],
                ),
                AttributeInput::minimized("disabled"),
            ],
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenElement(0, \"button\");",
                "__builder.AddAttribute(1, \"class\", \"btn btn-\" + (Kind));",
                "__builder.AddAttribute(2, \"disabled\", true);",
                "__builder.CloseElement();",
            ],
        );
    }

    #[test]
    fn test_folded_and_emitted_attributes_agree() {
        let class = || {
            AttributeInput::mixed(
                "class",
                vec![ValuePart::literal("card "), ValuePart::literal("wide")],
            )
        };
        let mut builder = builder(vec![]);
        let body = builder.body();
        builder.element(body, "div", vec![class()]);
        let p = builder.element(body, "p", vec![class()]);
        builder.expression(p, "Name");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.AddMarkupContent(0, \"<div class=\\\"card wide\\\"></div>\");",
                "__builder.OpenElement(1, \"p\");",
                "__builder.AddAttribute(2, \"class\", \"card wide\");",
                "__builder.AddContent(3, Name);",
                "__builder.CloseElement();",
            ],
        );
    }

    #[test]
    fn test_omitted_minimized_values() {
        let options = DocumentOptions {
            omit_minimized_component_attribute_values: true,
            ..DocumentOptions::default()
        };
        let mut builder = builder_with(vec![], options);
        let body = builder.body();
        builder.element(
            body,
            "input",
            vec![
                AttributeInput::expression("value", "Name"),
                AttributeInput::minimized("checked"),
            ],
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.AddAttribute(1, \"value\", Name);",
                "__builder.AddAttribute(2, \"checked\");",
            ],
        );
    }

    #[test]
    fn test_component_with_child_content() {
        let mut builder = builder(vec![card()]);
        let body = builder.body();
        let card = builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::literal("Title", "Hi"),
                AttributeInput::expression("Count", "total + 1"),
                AttributeInput::expression("OnClick", "Save"),
            ],
            TagMode::StartTagAndEndTag,
        );
        builder.text(card.body, "Body");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenComponent<Test.Card>(0);",
                "__builder.AddAttribute(1, \"Title\", \"Hi\");",
                "__builder.AddAttribute(2, \"Count\", global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck<System.Int32>(total + 1));",
                "__builder.AddAttribute(3, \"OnClick\", global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck<Microsoft.AspNetCore.Components.EventCallback<System.String>>(global::Microsoft.AspNetCore.Components.EventCallback.Factory.Create<System.String>(this, Save)));",
                "__builder.AddAttribute(4, \"ChildContent\", (global::Microsoft.AspNetCore.Components.RenderFragment)((__builder2) => {",
                "__builder2.AddContent(5, \"Body\");",
                "}));",
                "__builder.CloseComponent();",
            ],
        );
    }

    #[test]
    fn test_captures_keys_and_splats() {
        let mut builder = builder(vec![card(), ref_descriptor(), key_descriptor(), splat_descriptor()]);
        let body = builder.body();
        builder.tag(
            body,
            "li",
            vec![
                AttributeInput::expression("ref", "_item"),
                AttributeInput::expression("key", "item.Id"),
                AttributeInput::expression("attributes", "Extra"),
            ],
            TagMode::SelfClosing,
        );
        builder.tag(
            body,
            "Card",
            vec![AttributeInput::expression("ref", "_card")],
            TagMode::SelfClosing,
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenElement(0, \"li\");",
                "__builder.AddMultipleAttributes(1, global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck<global::System.Collections.Generic.IEnumerable<global::System.Collections.Generic.KeyValuePair<string, object>>>(Extra));",
                "__builder.SetKey(item.Id);",
                "__builder.AddElementReferenceCapture(2, (__value) => {",
                "_item = __value;",
                "});",
                "__builder.CloseElement();",
                "__builder.OpenComponent<Test.Card>(3);",
                "__builder.AddComponentReferenceCapture(4, (__value) => {",
                "_card = (Test.Card)__value;",
                "});",
                "__builder.CloseComponent();",
            ],
        );
    }

    #[test]
    fn test_bind_lowering() {
        let mut builder = builder(vec![input_bind()]);
        let body = builder.body();
        builder.tag(
            body,
            "input",
            vec![AttributeInput::expression("bind", "Name")],
            TagMode::SelfClosing,
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &[
                "__builder.OpenElement(0, \"input\");",
                "__builder.AddAttribute(1, \"value\", global::Microsoft.AspNetCore.Components.BindMethods.GetValue(Name));",
                "__builder.AddAttribute(2, \"onchange\", global::Microsoft.AspNetCore.Components.BindMethods.SetValueHandler(__value => Name = __value, Name));",
                "__builder.CloseElement();",
            ],
        );
    }

    #[test]
    fn test_unresolved_bind_emits_nothing() {
        let mut builder = builder(vec![fallback_bind()]);
        let body = builder.body();
        builder.tag(
            body,
            "div",
            vec![AttributeInput::expression("bind", "Name")],
            TagMode::SelfClosing,
        );
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &["__builder.OpenElement(0, \"div\");", "__builder.CloseElement();"],
        );
        assert!(!output.code.contains("GetValue"));
        let codes: Vec<&str> = output.diagnostics.iter().map(|d| d.id()).collect();
        assert_eq!(codes, vec!["invalid-bind-syntax"]);
    }

    #[test]
    fn test_whitespace_code_is_skipped() {
        let mut builder = builder(vec![]);
        let body = builder.body();
        builder.expression(body, "A");
        builder.code(body, "   ");
        builder.expression(body, "B");
        let output = generate(&lower(builder.finish()));

        assert_lines(
            &output.code,
            &["__builder.AddContent(0, A);", "__builder.AddContent(1, B);"],
        );
    }
}
