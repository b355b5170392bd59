//! Per-document lowering options.

/// Which emitter the document is lowered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitMode {
    /// Executable render code.
    Runtime,
    /// Code for editor tooling that preserves every user expression.
    DesignTime,
}

/// Options controlling passes and emission of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct DocumentOptions {
    /// Lower for tooling instead of execution.
    pub design_time: bool,
    /// Skip the `true` argument for minimized component attributes.
    pub omit_minimized_component_attribute_values: bool,
    /// Keep leading and trailing whitespace in bodies.
    pub preserve_whitespace: bool,
    /// Emit the class without a render method body.
    pub suppress_primary_method_body: bool,
}

impl DocumentOptions {
    /// Options for the runtime emitter.
    pub fn runtime() -> Self {
        Self::default()
    }

    /// Options for the design-time emitter.
    pub fn design_time() -> Self {
        Self {
            design_time: true,
            ..Self::default()
        }
    }

    /// The emitter these options select.
    pub fn emit_mode(&self) -> EmitMode {
        if self.design_time {
            EmitMode::DesignTime
        } else {
            EmitMode::Runtime
        }
    }
}
