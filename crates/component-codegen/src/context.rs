//! Emission context.

use crate::api::BUILDER_PARAMETER;
use crate::writer::{render_node, NodeWriter};
use crate::EmitResult;
use component_ir::{DocumentOptions, DocumentTree, EmitMode, NodeId, NodeKind, TokenKind};
use source_map::{CodeWriter, SourceMap};

/// Nesting of render lambdas.
///
/// Each child content or template lambda takes its own builder parameter:
/// `__builder` at the top, then `__builder2`, `__builder3` and so on.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    depth: usize,
}

impl ScopeStack {
    /// Number of open lambdas.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Builder variable of the innermost scope.
    pub fn builder_var_name(&self) -> String {
        match self.depth {
            0 => BUILDER_PARAMETER.to_string(),
            n => format!("{}{}", BUILDER_PARAMETER, n + 1),
        }
    }

    /// Open a render lambda, curried over `parameter` when one is given.
    pub fn open_scope(&mut self, writer: &mut CodeWriter, parameter: Option<&str>) {
        if let Some(parameter) = parameter {
            writer.write("(").write(parameter).write(") => ");
        }
        self.depth += 1;
        let builder = self.builder_var_name();
        writer.begin_lambda(&[&builder]);
    }

    /// Close the innermost lambda.
    pub fn close_scope(&mut self, writer: &mut CodeWriter) {
        writer.end_lambda();
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Counters threaded through one emission.
#[derive(Debug, Clone)]
pub struct EmitState {
    mode: EmitMode,
    sequence: u32,
    /// Open render lambdas.
    pub scopes: ScopeStack,
}

impl EmitState {
    /// Create state for the given mode.
    pub fn new(mode: EmitMode) -> Self {
        Self {
            mode,
            sequence: 0,
            scopes: ScopeStack::default(),
        }
    }

    /// Next frame sequence number.
    ///
    /// Runtime numbers increase monotonically; design time uses a fixed placeholder.
    pub fn next_sequence(&mut self) -> String {
        match self.mode {
            EmitMode::DesignTime => "-1".to_string(),
            EmitMode::Runtime => {
                let sequence = self.sequence;
                self.sequence += 1;
                sequence.to_string()
            }
        }
    }

    /// Number of sequence numbers handed out.
    pub fn sequence_count(&self) -> u32 {
        self.sequence
    }
}

/// Context for emitting one document.
pub struct RenderContext<'a> {
    /// The lowered document.
    pub tree: &'a DocumentTree,
    /// Output.
    pub writer: CodeWriter,
    /// Sequence numbers and scopes.
    pub state: EmitState,
    node_writer: &'a dyn NodeWriter,
}

impl<'a> RenderContext<'a> {
    /// Create a context that emits `tree` with `node_writer`.
    pub fn new(tree: &'a DocumentTree, node_writer: &'a dyn NodeWriter) -> Self {
        Self {
            tree,
            writer: CodeWriter::new(),
            state: EmitState::new(tree.options().emit_mode()),
            node_writer,
        }
    }

    /// Options of the document.
    pub fn options(&self) -> &'a DocumentOptions {
        self.tree.options()
    }

    /// Emission mode.
    pub fn mode(&self) -> EmitMode {
        self.tree.options().emit_mode()
    }

    /// The mode-specific node writer.
    pub fn node_writer(&self) -> &'a dyn NodeWriter {
        self.node_writer
    }

    /// Builder variable of the current scope.
    pub fn builder(&self) -> String {
        self.state.scopes.builder_var_name()
    }

    /// Next frame sequence number.
    pub fn next_sequence(&mut self) -> String {
        self.state.next_sequence()
    }

    /// Render one node.
    pub fn render(&mut self, id: NodeId) -> EmitResult<()> {
        render_node(self, id)
    }

    /// Render every child of `id` in order.
    pub fn render_children(&mut self, id: NodeId) -> EmitResult<()> {
        let tree = self.tree;
        for &child in tree.children(id) {
            self.render(child)?;
        }
        Ok(())
    }

    /// Render the children of `id` that satisfy `pred`, in order.
    pub fn render_children_where(
        &mut self,
        id: NodeId,
        pred: impl Fn(&NodeKind) -> bool,
    ) -> EmitResult<()> {
        let tree = self.tree;
        for &child in tree.children(id) {
            if pred(tree.kind(child)) {
                self.render(child)?;
            }
        }
        Ok(())
    }

    /// Write every host token under `id`, mapped to its source.
    pub fn write_host_tokens(&mut self, id: NodeId) {
        let tree = self.tree;
        let tokens = match tree.token(id) {
            Some(_) => vec![id],
            None => tree.tokens(id, Some(TokenKind::Host)),
        };
        for token_id in tokens {
            if let Some(token) = tree.token(token_id).filter(|t| t.is_host()) {
                self.writer.write_mapped(&token.content, tree.source(token_id));
            }
        }
    }

    /// Open a render lambda.
    pub fn open_scope(&mut self, parameter: Option<&str>) {
        self.state.scopes.open_scope(&mut self.writer, parameter);
    }

    /// Close the innermost render lambda.
    pub fn close_scope(&mut self) {
        self.state.scopes.close_scope(&mut self.writer);
    }

    /// Consume the context and return the code and source map.
    pub fn finish(self) -> (String, SourceMap) {
        self.writer.finish()
    }
}
