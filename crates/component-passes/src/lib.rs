//! Lowering passes for component documents.
//!
//! Each pass is a stateless [`DocumentPass`] with an integer order. A
//! [`PassPipeline`] runs its passes by ascending order, breaking ties by
//! registration order, and every later pass may rely on the rewrites of the
//! earlier ones: classification turns tag candidates into components and
//! elements, the macro passes expand bind, ref, key and splat attributes,
//! generic instantiation synthesizes dispatch routines, and the optimization
//! passes trim whitespace and fold static markup.

mod bind;
mod classify;
mod content;
pub mod diagnostics;
mod directive_attributes;
mod directives;
mod generic;
pub mod markup_block;
pub mod names;
#[cfg(test)]
mod test_support;
mod whitespace;

pub use bind::BindLoweringPass;
pub use classify::ComponentLoweringPass;
pub use directive_attributes::DirectiveAttributeLoweringPass;
pub use directives::{
    ImplementsDirectivePass, InjectDirectivePass, InjectedProperty, LayoutDirectivePass,
    PageDirectivePass,
};
pub use generic::GenericComponentPass;
pub use markup_block::MarkupBlockPass;
pub use whitespace::WhitespacePass;

use component_ir::{DocumentOptions, DocumentTree};
use tracing::{debug, info_span};

/// A unit of rewriting over one document.
pub trait DocumentPass: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Position in the pipeline; lower runs earlier.
    fn order(&self) -> i32;

    /// Whether the pass applies to documents with these options.
    fn is_enabled(&self, _options: &DocumentOptions) -> bool {
        true
    }

    /// Rewrite the document.
    fn execute(&self, tree: &mut DocumentTree);
}

/// An ordered set of passes.
#[derive(Default)]
pub struct PassPipeline {
    passes: Vec<Box<dyn DocumentPass>>,
}

impl PassPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with every built-in pass.
    pub fn with_default_passes() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .register(InjectDirectivePass)
            .register(ImplementsDirectivePass)
            .register(LayoutDirectivePass)
            .register(PageDirectivePass)
            .register(diagnostics::ComplexAttributeContentPass)
            .register(ComponentLoweringPass)
            .register(BindLoweringPass)
            .register(DirectiveAttributeLoweringPass)
            .register(diagnostics::TemplateDiagnosticPass)
            .register(diagnostics::ChildContentDiagnosticPass)
            .register(GenericComponentPass)
            .register(diagnostics::ScriptTagPass)
            .register(diagnostics::DuplicateAttributePass)
            .register(WhitespacePass)
            .register(MarkupBlockPass);
        pipeline
    }

    /// Add a pass, keeping the list sorted by order.
    pub fn register(&mut self, pass: impl DocumentPass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        // Stable sort keeps registration order among equal orders.
        self.passes.sort_by_key(|p| p.order());
        self
    }

    /// Registered passes in execution order.
    pub fn passes(&self) -> impl Iterator<Item = &dyn DocumentPass> {
        self.passes.iter().map(|p| p.as_ref())
    }

    /// Run every enabled pass over the document.
    #[tracing::instrument(skip_all)]
    pub fn run(&self, tree: &mut DocumentTree) {
        for pass in &self.passes {
            if !pass.is_enabled(tree.options()) {
                debug!(pass = pass.name(), "pass disabled for document");
                continue;
            }
            let span = info_span!("pass", pass = pass.name(), order = pass.order());
            let _enter = span.enter();

            let before = tree.len();
            pass.execute(tree);
            debug!(allocated = tree.len() - before, "pass complete");
        }
    }
}

/// Run the default pipeline over a document.
pub fn lower(tree: &mut DocumentTree) {
    PassPipeline::with_default_passes().run(tree);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use component_ir::{AttributeInput, NodeId, NodeKind, TagHandle, TagMode};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl DocumentPass for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn order(&self) -> i32 {
            self.order
        }

        fn is_enabled(&self, options: &DocumentOptions) -> bool {
            self.name != "design-only" || options.design_time
        }

        fn execute(&self, _tree: &mut DocumentTree) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    #[test]
    fn test_pipeline_orders_passes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = PassPipeline::new();
        for (name, order) in [("late", 20), ("first", 10), ("second", 10), ("design-only", 5)] {
            pipeline.register(Recording {
                name,
                order,
                log: Arc::clone(&log),
            });
        }
        let mut tree = DocumentTree::new(DocumentOptions::default());
        pipeline.run(&mut tree);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "late"]);
    }

    #[test]
    fn test_default_pipeline_order() {
        let pipeline = PassPipeline::with_default_passes();
        let orders: Vec<i32> = pipeline.passes().map(|p| p.order()).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
        assert_eq!(pipeline.passes().next().map(|p| p.name()), Some("inject-directive"));
    }

    /// A page with a heading, a bound input, a component and a script.
    fn sample_document() -> (DocumentTree, NodeId, TagHandle, NodeId) {
        let mut builder = builder(vec![
            component("Card").with_attribute(string_attribute("Title")),
            element_bind("input", "value", "onchange"),
            ref_descriptor(),
        ]);
        builder.directive("page", &["/"], None);
        let body = builder.body();
        builder.text(body, "\n  ");
        let header = builder.element(body, "h1", vec![]);
        builder.text(header, "Hello");
        builder.text(body, "\n");
        builder.tag(
            body,
            "input",
            vec![AttributeInput::expression("bind", "Name")],
            TagMode::SelfClosing,
        );
        let card = builder.tag(
            body,
            "Card",
            vec![
                AttributeInput::literal("Title", "Hi"),
                AttributeInput::expression("ref", "_card"),
            ],
            TagMode::StartTagAndEndTag,
        );
        builder.text(card.body, "  Body  ");
        let script = builder.element(body, "script", vec![]);
        (builder.finish(), body, card, script)
    }

    #[test]
    fn test_default_pipeline_lowers_document() {
        let (mut tree, body, card, script) = sample_document();
        lower(&mut tree);

        assert_eq!(
            kinds(&tree, body),
            vec!["markup-block", "markup-element", "component", "markup-element"]
        );
        assert_eq!(
            kinds(&tree, tree.children(body)[1]),
            vec!["markup-attribute", "markup-attribute"]
        );
        assert_eq!(
            kinds(&tree, card.node),
            vec!["component-attribute", "reference-capture", "component-child-content"]
        );
        let slot = tree.children(card.node)[2];
        assert_eq!(tree.token_content(slot), "Body");
        assert!(matches!(tree.kind(script), NodeKind::MarkupElement(_)));
        assert_eq!(codes(&tree), vec!["disallowed-script-tag"]);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let (mut first, ..) = sample_document();
        let (mut second, ..) = sample_document();
        lower(&mut first);
        lower(&mut second);
        assert_eq!(codes(&first), codes(&second));
        assert_eq!(first.len(), second.len());
    }
}
