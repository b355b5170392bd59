//! Component calls, shared by both emitters.
//!
//! A component is either opened directly on the builder or, when its type
//! arguments are inferred, constructed by a call to its dispatch routine
//! with every attribute, splat, child content, key and capture passed
//! positionally.

use crate::api::{
    render_tree_builder as rtb, CAPTURE_PARAMETER, EVENT_CALLBACK_CREATE, RENDER_TREE_BUILDER_TYPE,
    SPLAT_TYPE, TYPE_CHECK,
};
use crate::context::RenderContext;
use crate::writer::unsupported;
use crate::EmitResult;
use component_ir::type_name::generic_arguments;
use component_ir::{
    AttributeStructure, DispatchParameterKind, NodeId, NodeKind, TypeInferenceMethod,
};
use tracing::trace;

fn is_parameter(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::ComponentAttribute(_) | NodeKind::Splat)
}

/// Write a component call.
pub fn write_component(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::Component(call) = tree.kind(id) else {
        return Ok(());
    };
    if let Some(method) = call.type_inference {
        let NodeKind::TypeInferenceMethod(method) = tree.kind(method) else {
            return Err(unsupported(ctx, id, "dispatch routine is missing"));
        };
        return write_dispatch_call(ctx, method);
    }

    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&builder)
        .write(".")
        .write(rtb::OPEN_COMPONENT)
        .write("<")
        .write_mapped(&call.type_name, tree.source(id))
        .write(">(")
        .write(&sequence)
        .write_end_method_invocation();

    ctx.render_children_where(id, is_parameter)?;
    ctx.render_children_where(id, |k| matches!(k, NodeKind::ComponentChildContent(_)))?;
    ctx.render_children_where(id, |k| matches!(k, NodeKind::SetKey(_)))?;
    ctx.render_children_where(id, |k| matches!(k, NodeKind::ReferenceCapture(_)))?;

    ctx.writer
        .write(&builder)
        .write(".")
        .write(rtb::CLOSE_COMPONENT)
        .write("();")
        .new_line();
    Ok(())
}

fn write_dispatch_call(ctx: &mut RenderContext<'_>, method: &TypeInferenceMethod) -> EmitResult<()> {
    trace!(method = %method.method_name, "calling dispatch routine");
    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&method.full_type_name)
        .write(".")
        .write_start_method_invocation(&method.method_name)
        .write(&builder)
        .write_parameter_separator()
        .write(&sequence);
    for parameter in &method.parameters {
        ctx.writer.write_parameter_separator();
        if parameter.seq_name.is_some() {
            let sequence = ctx.next_sequence();
            ctx.writer.write(&sequence).write_parameter_separator();
        }
        match parameter.kind {
            DispatchParameterKind::Attribute => {
                write_component_attribute_value(ctx, parameter.node, false)?
            }
            DispatchParameterKind::Splat => ctx.write_host_tokens(parameter.node),
            DispatchParameterKind::ChildContent => write_child_content_lambda(ctx, parameter.node)?,
            DispatchParameterKind::Key => write_key_value(ctx, parameter.node),
            DispatchParameterKind::Capture => write_capture_lambda(ctx, parameter.node, false)?,
        }
    }
    ctx.writer.write_end_method_invocation();
    Ok(())
}

/// Write a component parameter as an `AddAttribute` call.
pub fn write_component_attribute(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ComponentAttribute(attribute) = tree.kind(id) else {
        return Ok(());
    };
    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&builder)
        .write(".")
        .write_start_method_invocation(rtb::ADD_ATTRIBUTE)
        .write(&sequence)
        .write_parameter_separator()
        .write_string_literal(&attribute.attribute_name)
        .write_parameter_separator();
    write_component_attribute_value(ctx, id, true)?;
    ctx.writer.write_end_method_invocation();
    Ok(())
}

/// Write the value of a component parameter.
///
/// `type_check` is off for dispatch arguments, whose types are inferred.
pub fn write_component_attribute_value(
    ctx: &mut RenderContext<'_>,
    id: NodeId,
    type_check: bool,
) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ComponentAttribute(attribute) = tree.kind(id) else {
        return Ok(());
    };
    if attribute.structure == AttributeStructure::Minimized {
        ctx.writer.write_boolean_literal(true);
        return Ok(());
    }
    let value = match tree.children(id) {
        [] => None,
        [only] => Some(*only),
        _ => return Err(unsupported(ctx, id, "attribute value has more than one part")),
    };
    if let Some(content) = value.filter(|&v| matches!(tree.kind(v), NodeKind::MarkupContent(_))) {
        ctx.writer.write_string_literal(&tree.token_content(content));
        return Ok(());
    }

    let bound = attribute.bound.as_ref();
    let type_name = attribute.type_name.as_deref().filter(|_| type_check);
    let is_delegate = bound.is_some_and(|b| b.is_delegate || b.is_child_content);
    let is_event_callback = bound.is_some_and(|b| b.is_event_callback);

    if is_delegate {
        if let Some(type_name) = type_name {
            ctx.writer.write("(").write(type_name).write(")(");
        }
        write_value(ctx, value);
        if type_name.is_some() {
            ctx.writer.write(")");
        }
    } else if is_event_callback {
        if let Some(type_name) = type_name {
            ctx.writer.write(TYPE_CHECK).write("<").write(type_name).write(">(");
        }
        ctx.writer.write(EVENT_CALLBACK_CREATE);
        let declared = attribute.type_name.as_deref().unwrap_or_default();
        if let [argument] = generic_arguments(declared).as_slice() {
            ctx.writer.write("<").write(argument).write(">");
        }
        ctx.writer.write("(this, ");
        write_value(ctx, value);
        ctx.writer.write(")");
        if type_name.is_some() {
            ctx.writer.write(")");
        }
    } else if let Some(type_name) = type_name.filter(|_| bound.is_some()) {
        ctx.writer.write(TYPE_CHECK).write("<").write(type_name).write(">(");
        write_value(ctx, value);
        ctx.writer.write(")");
    } else {
        write_value(ctx, value);
    }
    Ok(())
}

fn write_value(ctx: &mut RenderContext<'_>, value: Option<NodeId>) {
    if let Some(value) = value {
        ctx.write_host_tokens(value);
    }
}

/// Write a child content slot as an `AddAttribute` call.
pub fn write_child_content(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ComponentChildContent(content) = tree.kind(id) else {
        return Ok(());
    };
    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&builder)
        .write(".")
        .write_start_method_invocation(rtb::ADD_ATTRIBUTE)
        .write(&sequence)
        .write_parameter_separator()
        .write_string_literal(&content.attribute_name)
        .write_parameter_separator()
        .write("(")
        .write(&content.type_name)
        .write(")(");
    write_child_content_lambda(ctx, id)?;
    ctx.writer.write(")").write_end_method_invocation();
    Ok(())
}

/// Write the lambda of a child content slot.
pub fn write_child_content_lambda(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ComponentChildContent(content) = tree.kind(id) else {
        return Ok(());
    };
    let parameter = content
        .is_parameterized()
        .then(|| content.parameter_name.as_deref())
        .flatten();
    ctx.open_scope(parameter);
    ctx.render_children(id)?;
    ctx.close_scope();
    Ok(())
}

/// Write an inline template.
pub fn write_template(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    ctx.open_scope(None);
    ctx.render_children(id)?;
    ctx.close_scope();
    Ok(())
}

/// Write a reference capture.
pub fn write_reference_capture(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ReferenceCapture(capture) = tree.kind(id) else {
        return Ok(());
    };
    let method = if capture.is_component_capture() {
        rtb::ADD_COMPONENT_REFERENCE_CAPTURE
    } else {
        rtb::ADD_ELEMENT_REFERENCE_CAPTURE
    };
    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&builder)
        .write(".")
        .write_start_method_invocation(method)
        .write(&sequence)
        .write_parameter_separator();
    write_capture_lambda(ctx, id, true)?;
    ctx.writer.write_end_method_invocation();
    Ok(())
}

/// Write `(__value) => { identifier = __value; }`.
///
/// Component captures are cast to the component type when `type_check` is set.
pub fn write_capture_lambda(
    ctx: &mut RenderContext<'_>,
    id: NodeId,
    type_check: bool,
) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::ReferenceCapture(capture) = tree.kind(id) else {
        return Ok(());
    };
    ctx.writer.begin_lambda(&[CAPTURE_PARAMETER]);
    ctx.writer
        .write_mapped(&capture.identifier, capture.identifier_source.as_ref())
        .write(" = ");
    if let Some(type_name) = capture
        .component_capture_type_name
        .as_deref()
        .filter(|_| type_check)
    {
        ctx.writer.write("(").write(type_name).write(")");
    }
    ctx.writer.write(CAPTURE_PARAMETER).write(";").new_line();
    ctx.writer.end_lambda();
    Ok(())
}

/// Write a key assignment.
pub fn write_set_key(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::SetKey(key) = tree.kind(id) else {
        return Ok(());
    };
    let builder = ctx.builder();
    ctx.writer
        .write(&builder)
        .write(".")
        .write_start_method_invocation(rtb::SET_KEY)
        .write_mapped(&key.key, key.key_source.as_ref())
        .write_end_method_invocation();
    Ok(())
}

fn write_key_value(ctx: &mut RenderContext<'_>, id: NodeId) {
    let tree = ctx.tree;
    if let NodeKind::SetKey(key) = tree.kind(id) {
        ctx.writer.write_mapped(&key.key, key.key_source.as_ref());
    }
}

/// Write an attribute splat.
pub fn write_splat(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let builder = ctx.builder();
    let sequence = ctx.next_sequence();
    ctx.writer
        .write(&builder)
        .write(".")
        .write_start_method_invocation(rtb::ADD_MULTIPLE_ATTRIBUTES)
        .write(&sequence)
        .write_parameter_separator()
        .write(TYPE_CHECK)
        .write("<")
        .write(SPLAT_TYPE)
        .write(">(");
    ctx.write_host_tokens(id);
    ctx.writer.write(")").write_end_method_invocation();
    Ok(())
}

/// Write a dispatch routine.
///
/// The routine opens the component with its type arguments inferred from
/// the parameters and forwards each value with its sequence number.
pub fn write_type_inference_method(ctx: &mut RenderContext<'_>, id: NodeId) -> EmitResult<()> {
    let tree = ctx.tree;
    let NodeKind::TypeInferenceMethod(method) = tree.kind(id) else {
        return Ok(());
    };
    let mut signature = format!("{} __builder, int seq", RENDER_TREE_BUILDER_TYPE);
    for parameter in &method.parameters {
        if let Some(seq_name) = &parameter.seq_name {
            signature.push_str(&format!(", int {}", seq_name));
        }
        signature.push_str(&format!(", {} {}", parameter.type_name, parameter.name));
    }
    ctx.writer
        .ensure_new_line()
        .write("public static void ")
        .write(&method.method_name)
        .write("<")
        .write(&method.type_parameters.join(", "))
        .write(">(")
        .write(&signature)
        .write(")")
        .new_line()
        .begin_scope();

    ctx.writer
        .write("__builder.")
        .write(rtb::OPEN_COMPONENT)
        .write("<")
        .write(&method.component_type_name)
        .write_line(">(seq);");
    for parameter in &method.parameters {
        let seq_name = parameter.seq_name.as_deref().unwrap_or_default();
        match parameter.kind {
            DispatchParameterKind::Capture => {
                ctx.writer
                    .write("__builder.")
                    .write_start_method_invocation(rtb::ADD_COMPONENT_REFERENCE_CAPTURE)
                    .write(seq_name)
                    .write_parameter_separator()
                    .write("(")
                    .write(CAPTURE_PARAMETER)
                    .write(") => { ")
                    .write(&parameter.name)
                    .write("((")
                    .write(&method.component_type_name)
                    .write(")")
                    .write(CAPTURE_PARAMETER)
                    .write("); }")
                    .write_end_method_invocation();
            }
            DispatchParameterKind::Splat => {
                ctx.writer
                    .write("__builder.")
                    .write_start_method_invocation(rtb::ADD_MULTIPLE_ATTRIBUTES)
                    .write(seq_name)
                    .write_parameter_separator()
                    .write(&parameter.name)
                    .write_end_method_invocation();
            }
            DispatchParameterKind::Key => {
                ctx.writer
                    .write("__builder.")
                    .write_start_method_invocation(rtb::SET_KEY)
                    .write(&parameter.name)
                    .write_end_method_invocation();
            }
            DispatchParameterKind::Attribute | DispatchParameterKind::ChildContent => {
                let name = match tree.kind(parameter.node) {
                    NodeKind::ComponentAttribute(attribute) => attribute.attribute_name.as_str(),
                    NodeKind::ComponentChildContent(content) => content.attribute_name.as_str(),
                    _ => return Err(unsupported(ctx, id, "dispatch parameter has no source")),
                };
                ctx.writer
                    .write("__builder.")
                    .write_start_method_invocation(rtb::ADD_ATTRIBUTE)
                    .write(seq_name)
                    .write_parameter_separator()
                    .write_string_literal(name)
                    .write_parameter_separator()
                    .write(&parameter.name)
                    .write_end_method_invocation();
            }
        }
    }
    ctx.writer
        .write("__builder.")
        .write(rtb::CLOSE_COMPONENT)
        .write_line("();")
        .end_scope();
    Ok(())
}

/// Open generic form of a component type for design-time `typeof`, such as `Grid<,>`.
pub fn open_generic_type_name(type_name: &str, type_parameter_count: usize) -> String {
    match type_parameter_count {
        0 => type_name.to_string(),
        n => format!("{}<{}>", type_name, ",".repeat(n - 1)),
    }
}
