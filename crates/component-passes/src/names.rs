//! Names the passes write into the tree.

/// Default child content parameter.
pub const CHILD_CONTENT: &str = "ChildContent";
/// Attribute naming the context argument of child content.
pub const CONTEXT_ATTRIBUTE: &str = "Context";
/// Context argument name when none is given.
pub const DEFAULT_CONTEXT_NAME: &str = "context";
/// Delegate type of unparameterized child content.
pub const RENDER_FRAGMENT: &str = "global::Microsoft.AspNetCore.Components.RenderFragment";

/// Bind attribute prefix.
pub const BIND_PREFIX: &str = "bind";
/// Bind format attribute prefix.
pub const FORMAT_PREFIX: &str = "format-";
/// Suffix of the synthesized change parameter of a component bind.
pub const CHANGED_SUFFIX: &str = "Changed";
/// Lambda parameter of change handlers.
pub const VALUE_PARAMETER: &str = "__value";
/// Reads a bound value.
pub const BIND_GET_VALUE: &str = "global::Microsoft.AspNetCore.Components.BindMethods.GetValue";
/// Wraps a setter into an element event handler.
pub const BIND_SET_VALUE_HANDLER: &str =
    "global::Microsoft.AspNetCore.Components.BindMethods.SetValueHandler";

/// Root of the synthesized type inference namespace.
pub const TYPE_INFERENCE_NAMESPACE: &str = "__Blazor";
/// Class holding dispatch routines.
pub const TYPE_INFERENCE_CLASS: &str = "TypeInference";
/// Type used for values with no declared type.
pub const OBJECT_TYPE: &str = "object";
/// Capture callback delegate.
pub const ACTION_TYPE: &str = "global::System.Action";
/// Parameter type of a forwarded attribute splat.
pub const SPLAT_TYPE: &str = "global::System.Collections.Generic.IEnumerable<global::System.Collections.Generic.KeyValuePair<string, object>>";

/// Tag that is reported when used inside a component.
pub const SCRIPT_TAG: &str = "script";
/// Attribute opting out of a diagnostic.
pub const SUPPRESS_ERROR_ATTRIBUTE: &str = "suppress-error";

/// Marks injected properties.
pub const INJECT_ATTRIBUTE: &str = "global::Microsoft.AspNetCore.Components.InjectAttribute";
/// Declares the layout of a component.
pub const LAYOUT_ATTRIBUTE: &str = "global::Microsoft.AspNetCore.Components.LayoutAttribute";
/// Declares a route template of a component.
pub const ROUTE_ATTRIBUTE: &str = "global::Microsoft.AspNetCore.Components.RouteAttribute";
