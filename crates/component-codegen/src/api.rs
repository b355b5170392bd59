//! Names of the rendering API the generated code calls.

pub use component_ir::builder::{BUILDER_PARAMETER, RENDER_TREE_BUILDER_TYPE};

/// Instance methods of the render tree builder.
pub mod render_tree_builder {
    pub const OPEN_ELEMENT: &str = "OpenElement";
    pub const CLOSE_ELEMENT: &str = "CloseElement";
    pub const ADD_ATTRIBUTE: &str = "AddAttribute";
    pub const ADD_CONTENT: &str = "AddContent";
    pub const ADD_MARKUP_CONTENT: &str = "AddMarkupContent";
    pub const OPEN_COMPONENT: &str = "OpenComponent";
    pub const CLOSE_COMPONENT: &str = "CloseComponent";
    pub const ADD_ELEMENT_REFERENCE_CAPTURE: &str = "AddElementReferenceCapture";
    pub const ADD_COMPONENT_REFERENCE_CAPTURE: &str = "AddComponentReferenceCapture";
    pub const SET_KEY: &str = "SetKey";
    pub const ADD_MULTIPLE_ATTRIBUTES: &str = "AddMultipleAttributes";
}

/// Compile-time conversion check applied to attribute values.
pub const TYPE_CHECK: &str =
    "global::Microsoft.AspNetCore.Components.CompilerServices.RuntimeHelpers.TypeCheck";

/// Factory method that wraps a handler in an event callback.
pub const EVENT_CALLBACK_CREATE: &str =
    "global::Microsoft.AspNetCore.Components.EventCallback.Factory.Create";

/// Value type accepted by an attribute splat.
pub const SPLAT_TYPE: &str = "global::System.Collections.Generic.IEnumerable<global::System.Collections.Generic.KeyValuePair<string, object>>";

/// Parameter of reference capture callbacks.
pub const CAPTURE_PARAMETER: &str = "__value";

/// Discard variable that design-time expressions are assigned to.
pub const DESIGN_TIME_VARIABLE: &str = "__o";
