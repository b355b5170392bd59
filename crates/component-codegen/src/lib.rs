//! Code generation for lowered component documents.
//!
//! [`generate`] writes a lowered [`DocumentTree`] as host-language source.
//! The runtime emitter produces render tree builder calls with real sequence
//! numbers; the design-time emitter keeps every user expression for editor
//! tooling and maps it back to the template.

pub mod api;
mod component;
pub mod context;
pub mod design_time;
pub mod runtime;
#[cfg(test)]
mod test_support;
pub mod writer;

use component_diagnostics::Diagnostic;
use component_ir::{DocumentTree, EmitMode};
use source_map::SourceMap;
use tracing::{debug, warn};

pub use context::{EmitState, RenderContext, ScopeStack};
pub use design_time::DesignTimeNodeWriter;
pub use runtime::RuntimeNodeWriter;
pub use writer::{render_node, NodeWriter};

/// Result of emitting one document.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// The generated source.
    pub code: String,
    /// Mappings from the generated source back to the template.
    pub source_map: SourceMap,
    /// Every diagnostic of the document.
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedDocument {
    /// Check if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// An emission failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmitError {
    /// A node the emitter cannot express; the document produces no code.
    #[error("{0}")]
    Fatal(Diagnostic),
}

/// Result type for emission.
pub type EmitResult<T> = Result<T, EmitError>;

/// Emit a lowered document with the emitter its options select.
///
/// A fatal error discards all output and reports only that error.
#[tracing::instrument(skip_all)]
pub fn generate(tree: &DocumentTree) -> GeneratedDocument {
    let mode = tree.options().emit_mode();
    let node_writer: &dyn NodeWriter = match mode {
        EmitMode::Runtime => &RuntimeNodeWriter,
        EmitMode::DesignTime => &DesignTimeNodeWriter,
    };
    let mut ctx = RenderContext::new(tree, node_writer);
    match render_document(&mut ctx) {
        Ok(()) => {
            debug!(?mode, sequences = ctx.state.sequence_count(), "emitted document");
            let (code, source_map) = ctx.finish();
            GeneratedDocument {
                code,
                source_map,
                diagnostics: tree.collect_diagnostics(),
            }
        }
        Err(EmitError::Fatal(diagnostic)) => {
            warn!(%diagnostic, "emission aborted");
            GeneratedDocument {
                code: String::new(),
                source_map: SourceMap::new(),
                diagnostics: vec![diagnostic],
            }
        }
    }
}

fn render_document(ctx: &mut RenderContext<'_>) -> EmitResult<()> {
    ctx.writer
        .write_line("// <auto-generated/>")
        .write_line("#pragma warning disable 1591");
    let root = ctx.tree.root();
    ctx.render(root)?;
    ctx.writer.write_line("#pragma warning restore 1591");
    Ok(())
}
