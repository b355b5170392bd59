//! Node dispatch and document structure.
//!
//! Declarations (namespaces, classes, members) are written the same way in
//! both modes. Everything inside a render method goes through a
//! [`NodeWriter`], which the runtime and design-time emitters implement.

use crate::api::DESIGN_TIME_VARIABLE;
use crate::component;
use crate::context::RenderContext;
use crate::{EmitError, EmitResult};
use component_diagnostics::factory;
use component_ir::{EmitMode, NodeId, NodeKind};

/// Mode-specific rendering of template content.
///
/// The component family has shared implementations; emitters override them
/// only to add to the shared output.
pub trait NodeWriter {
    /// Host statements.
    fn write_host_code(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Host expression rendered as content.
    fn write_host_expression(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Literal text.
    fn write_markup_content(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Folded static markup.
    fn write_markup_block(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Plain element.
    fn write_markup_element(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Attribute of a plain element.
    fn write_markup_attribute(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()>;

    /// Component call.
    fn write_component(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_component(ctx, id)
    }

    /// Component parameter.
    fn write_component_attribute(
        &self,
        ctx: &mut RenderContext<'_>,
        id: NodeId,
    ) -> EmitResult<()> {
        component::write_component_attribute(ctx, id)
    }

    /// Child content lambda.
    fn write_child_content(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_child_content(ctx, id)
    }

    /// Element or component reference capture.
    fn write_reference_capture(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_reference_capture(ctx, id)
    }

    /// Key assignment.
    fn write_set_key(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_set_key(ctx, id)
    }

    /// Attribute splat.
    fn write_splat(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_splat(ctx, id)
    }

    /// Inline template lambda.
    fn write_template(&self, ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
        component::write_template(ctx, id)
    }

    /// Generic dispatch routine.
    fn write_type_inference_method(
        &self,
        ctx: &mut RenderContext<'_>,
        id: NodeId,
    ) -> EmitResult<()> {
        component::write_type_inference_method(ctx, id)
    }
}

/// An error for a node kind no pass should have left behind.
pub(crate) fn unsupported(ctx: &RenderContext<'_>, id: NodeId, detail: &str) -> EmitError {
    let kind = ctx.tree.kind(id).name();
    EmitError::Fatal(factory::unsupported_node(
        ctx.tree.source(id).cloned(),
        format!("cannot emit {} node: {}", kind, detail),
    ))
}

/// Render any node.
pub fn render_node(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let writer = ctx.node_writer();
    match tree.kind(id) {
        NodeKind::Document => ctx.render_children(id),
        NodeKind::Namespace(_) => write_namespace(ctx, id),
        NodeKind::Class(_) => write_class(ctx, id),
        NodeKind::Method(_) => write_method(ctx, id),
        NodeKind::Field(_) => write_field(ctx, id),
        NodeKind::Property(_) => write_property(ctx, id),
        NodeKind::Using(namespace) => {
            let pragma = ctx.writer.begin_line_pragma(tree.source(id));
            ctx.writer
                .write("using ")
                .write_mapped(namespace, tree.source(id))
                .write(";")
                .new_line();
            ctx.writer.end_line_pragma(pragma);
            Ok(())
        }
        // Directives are consumed by the directive passes; unknown ones are ignored.
        NodeKind::Directive(_) => Ok(()),
        NodeKind::Token(token) => {
            if token.is_host() {
                ctx.writer.write_mapped(&token.content, tree.source(id));
            }
            Ok(())
        }
        NodeKind::HostCode(_) => writer.write_host_code(ctx, id),
        NodeKind::HostExpression => writer.write_host_expression(ctx, id),
        // Values are written by the attribute that owns them.
        NodeKind::HostExpressionAttributeValue | NodeKind::MarkupAttributeValue => Ok(()),
        NodeKind::MarkupContent(_) => writer.write_markup_content(ctx, id),
        NodeKind::MarkupAttribute(_) => writer.write_markup_attribute(ctx, id),
        NodeKind::MarkupElement(_) => writer.write_markup_element(ctx, id),
        NodeKind::MarkupBlock(_) => writer.write_markup_block(ctx, id),
        NodeKind::TagCandidate(_)
        | NodeKind::TagBody
        | NodeKind::BoundAttribute(_)
        | NodeKind::UnboundAttribute(_) => Err(unsupported(ctx, id, "tag was never classified")),
        // Left in place by a macro expansion that already reported why.
        NodeKind::DirectiveAttribute(_) => Ok(()),
        NodeKind::Component(_) => writer.write_component(ctx, id),
        NodeKind::ComponentAttribute(_) => writer.write_component_attribute(ctx, id),
        NodeKind::ComponentChildContent(_) => writer.write_child_content(ctx, id),
        // Type arguments are folded into type names.
        NodeKind::ComponentTypeArgument(_) => Ok(()),
        NodeKind::TypeInferenceMethod(_) => writer.write_type_inference_method(ctx, id),
        NodeKind::ReferenceCapture(_) => writer.write_reference_capture(ctx, id),
        NodeKind::SetKey(_) => writer.write_set_key(ctx, id),
        NodeKind::Splat => writer.write_splat(ctx, id),
        NodeKind::Template => writer.write_template(ctx, id),
        NodeKind::Extension(extension) => {
            let mode = ctx.mode();
            extension.emitter.emit(&mut ctx.writer, mode);
            Ok(())
        }
    }
}

fn write_namespace(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Namespace(namespace) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer
        .ensure_new_line()
        .write("namespace ")
        .write(&namespace.content)
        .new_line()
        .begin_scope();
    ctx.render_children(id)?;
    ctx.writer.end_scope();
    Ok(())
}

fn write_class(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Class(class) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer.ensure_new_line();
    for modifier in &class.modifiers {
        ctx.writer.write(modifier).write(" ");
    }
    ctx.writer.write("class ").write(&class.class_name);
    let bases: Vec<&str> = class
        .base_type
        .iter()
        .chain(class.interfaces.iter())
        .map(|b| b.as_str())
        .collect();
    if !bases.is_empty() {
        ctx.writer.write(" : ").write(&bases.join(", "));
    }
    ctx.writer.new_line().begin_scope();
    if class.is_primary && ctx.mode() == EmitMode::DesignTime {
        ctx.writer
            .write_line("#pragma warning disable 0414")
            .write("private static object ")
            .write(DESIGN_TIME_VARIABLE)
            .write_line(" = null;")
            .write_line("#pragma warning restore 0414");
    }
    ctx.render_children(id)?;
    ctx.writer.end_scope();
    Ok(())
}

fn write_method(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Method(method) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer.ensure_new_line();
    for modifier in &method.modifiers {
        ctx.writer.write(modifier).write(" ");
    }
    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect();
    ctx.writer
        .write(&method.return_type)
        .write(" ")
        .write(&method.method_name)
        .write("(")
        .write(&parameters.join(", "))
        .write(")")
        .new_line()
        .begin_scope();
    if !(method.is_primary && ctx.options().suppress_primary_method_body) {
        ctx.render_children(id)?;
    }
    ctx.writer.end_scope();
    Ok(())
}

fn write_field(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Field(field) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer.ensure_new_line();
    for modifier in &field.modifiers {
        ctx.writer.write(modifier).write(" ");
    }
    ctx.writer
        .write(&field.field_type)
        .write(" ")
        .write(&field.field_name);
    if let Some(initializer) = &field.initializer {
        ctx.writer.write(" = ").write(initializer);
    }
    ctx.writer.write(";").new_line();
    Ok(())
}

fn write_property(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Property(property) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer.ensure_new_line();
    for attribute in &property.attributes {
        ctx.writer.write("[").write(attribute).write("]").new_line();
    }
    for modifier in &property.modifiers {
        ctx.writer.write(modifier).write(" ");
    }
    ctx.writer
        .write(&property.property_type)
        .write(" ")
        .write(&property.property_name)
        .write(" { get; set; }")
        .new_line();
    Ok(())
}
