//! Passes that only report problems, removing what cannot be lowered.

mod child_content;
mod complex_content;
mod duplicates;
mod script_tag;
mod template;

pub use child_content::ChildContentDiagnosticPass;
pub use complex_content::ComplexAttributeContentPass;
pub use duplicates::DuplicateAttributePass;
pub use script_tag::ScriptTagPass;
pub use template::TemplateDiagnosticPass;
