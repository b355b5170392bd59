//! Text output with indentation, location tracking and source mappings.

use crate::{SourceLocation, SourceMap, SourceMapping, SourceSpan};

const NEW_LINE: &str = "\n";

/// Builder for generated code.
///
/// Every write keeps the current [`SourceLocation`] up to date so that
/// mapped writes can record where their text landed.
#[derive(Debug)]
pub struct CodeWriter {
    buffer: String,
    indent_size: usize,
    current_indent: usize,
    location: SourceLocation,
    at_line_start: bool,
    source_map: SourceMap,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Marker returned by [`CodeWriter::begin_line_pragma`].
///
/// Must be handed back to [`CodeWriter::end_line_pragma`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePragma {
    active: bool,
}

impl LinePragma {
    /// Whether a `#line` directive was actually written.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl CodeWriter {
    /// Create a writer that indents by four spaces.
    pub fn new() -> Self {
        Self::with_indent_size(4)
    }

    /// Create a writer with a custom indentation width.
    pub fn with_indent_size(indent_size: usize) -> Self {
        Self {
            buffer: String::new(),
            indent_size,
            current_indent: 0,
            location: SourceLocation::default(),
            at_line_start: true,
            source_map: SourceMap::new(),
        }
    }

    /// Current output position.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Whether the next write starts a fresh line.
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Increase indentation for following lines.
    pub fn indent(&mut self) -> &mut Self {
        self.current_indent += self.indent_size;
        self
    }

    /// Decrease indentation for following lines.
    pub fn dedent(&mut self) -> &mut Self {
        self.current_indent = self.current_indent.saturating_sub(self.indent_size);
        self
    }

    /// Append text. Indentation is applied at the start of every line.
    pub fn write(&mut self, text: &str) -> &mut Self {
        let mut rest = text;
        while !rest.is_empty() {
            let (line, tail) = match rest.find('\n') {
                Some(i) => rest.split_at(i + 1),
                None => (rest, ""),
            };
            if self.at_line_start && line != NEW_LINE {
                let padding = " ".repeat(self.current_indent);
                self.push_raw(&padding);
            }
            self.push_raw(line);
            self.at_line_start = line.ends_with('\n');
            rest = tail;
        }
        self
    }

    /// Append text and terminate the line.
    pub fn write_line(&mut self, text: &str) -> &mut Self {
        self.write(text).new_line()
    }

    /// Terminate the current line.
    pub fn new_line(&mut self) -> &mut Self {
        self.push_raw(NEW_LINE);
        self.at_line_start = true;
        self
    }

    /// Terminate the current line unless already at the start of one.
    pub fn ensure_new_line(&mut self) -> &mut Self {
        if !self.at_line_start {
            self.new_line();
        }
        self
    }

    /// Append text and record a mapping back to `source` when one is given.
    pub fn write_mapped(&mut self, text: &str, source: Option<&SourceSpan>) -> &mut Self {
        if self.at_line_start && !text.is_empty() {
            // Materialize indentation first so the mapping starts at the text.
            let padding = " ".repeat(self.current_indent);
            self.push_raw(&padding);
            self.at_line_start = false;
        }
        let start = self.location;
        self.write(text);
        if let Some(original) = source {
            if !text.is_empty() {
                self.source_map.add_mapping(SourceMapping {
                    original: original.clone(),
                    generated: SourceSpan::at(None, start, text.len() as u32),
                });
            }
        }
        self
    }

    /// Append a C# string literal.
    pub fn write_string_literal(&mut self, literal: &str) -> &mut Self {
        let mut escaped = String::with_capacity(literal.len() + 2);
        escaped.push('"');
        for c in literal.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\0' => escaped.push_str("\\0"),
                '\u{0085}' => escaped.push_str("\\u0085"),
                '\u{2028}' => escaped.push_str("\\u2028"),
                '\u{2029}' => escaped.push_str("\\u2029"),
                other => escaped.push(other),
            }
        }
        escaped.push('"');
        self.write(&escaped)
    }

    /// Append `true` or `false`.
    pub fn write_boolean_literal(&mut self, value: bool) -> &mut Self {
        self.write(if value { "true" } else { "false" })
    }

    /// Append `name(`.
    pub fn write_start_method_invocation(&mut self, name: &str) -> &mut Self {
        self.write(name).write("(")
    }

    /// Append `, `.
    pub fn write_parameter_separator(&mut self) -> &mut Self {
        self.write(", ")
    }

    /// Close an invocation statement with `);` and a newline.
    pub fn write_end_method_invocation(&mut self) -> &mut Self {
        self.write(");").new_line()
    }

    /// Append a complete `instance.method();` statement.
    pub fn write_instance_method_invocation(&mut self, instance: &str, method: &str) -> &mut Self {
        self.write(instance)
            .write(".")
            .write(method)
            .write("();")
            .new_line()
    }

    /// Append `name = `.
    pub fn write_start_assignment(&mut self, name: &str) -> &mut Self {
        self.write(name).write(" = ")
    }

    /// Append a using directive.
    pub fn write_using(&mut self, namespace: &str) -> &mut Self {
        self.write("using ").write(namespace).write(";").new_line()
    }

    /// Open a `{` block and indent.
    pub fn begin_scope(&mut self) -> &mut Self {
        self.write("{").new_line().indent()
    }

    /// Close a block opened with [`begin_scope`](Self::begin_scope).
    pub fn end_scope(&mut self) -> &mut Self {
        self.dedent().ensure_new_line().write("}").new_line()
    }

    /// Open a statement lambda: `(a, b) => {`.
    pub fn begin_lambda(&mut self, parameters: &[&str]) -> &mut Self {
        self.write("(")
            .write(&parameters.join(", "))
            .write(") => ")
            .begin_scope()
    }

    /// Close a lambda body without terminating the line.
    pub fn end_lambda(&mut self) -> &mut Self {
        self.dedent().ensure_new_line().write("}")
    }

    /// Open a `#line` region for `span`.
    ///
    /// Spans without a file path produce an inactive pragma and no output.
    pub fn begin_line_pragma(&mut self, span: Option<&SourceSpan>) -> LinePragma {
        let Some((span, file_path)) = span.and_then(|s| s.file_path.as_ref().map(|p| (s, p)))
        else {
            return LinePragma { active: false };
        };
        self.ensure_new_line();
        let directive = format!("#line {} \"{}\"", span.line_index + 1, file_path);
        // Pragmas are never indented.
        self.push_raw(&directive);
        self.new_line();
        LinePragma { active: true }
    }

    /// Close a region opened with [`begin_line_pragma`](Self::begin_line_pragma).
    pub fn end_line_pragma(&mut self, pragma: LinePragma) -> &mut Self {
        if pragma.active {
            self.ensure_new_line();
            self.push_raw("#line default");
            self.new_line();
            self.push_raw("#line hidden");
            self.new_line();
        }
        self
    }

    /// Get the generated code.
    pub fn code(&self) -> &str {
        &self.buffer
    }

    /// Get the source map.
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Consume the writer and return the code and source map.
    pub fn finish(self) -> (String, SourceMap) {
        (self.buffer, self.source_map)
    }

    fn push_raw(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.location = self.location.advance(text);
        if !text.is_empty() {
            self.at_line_start = text.ends_with('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indentation() {
        let mut writer = CodeWriter::with_indent_size(2);
        writer.write("class A").new_line().begin_scope();
        writer.write_line("int x;");
        writer.end_scope();
        assert_eq!(writer.code(), "class A\n{\n  int x;\n}\n");
    }

    #[test]
    fn test_string_literal_escapes() {
        let mut writer = CodeWriter::new();
        writer.write_string_literal("a \"b\"\n\\c");
        assert_eq!(writer.code(), r#""a \"b\"\n\\c""#);
    }

    #[test]
    fn test_method_invocation() {
        let mut writer = CodeWriter::new();
        writer
            .write_start_method_invocation("__builder.AddContent")
            .write("0")
            .write_parameter_separator()
            .write_string_literal("hi")
            .write_end_method_invocation();
        assert_eq!(writer.code(), "__builder.AddContent(0, \"hi\");\n");
    }

    #[test]
    fn test_lambda() {
        let mut writer = CodeWriter::with_indent_size(4);
        writer.write("f(");
        writer.begin_lambda(&["__builder2"]);
        writer.write_line("x();");
        writer.end_lambda();
        writer.write(");");
        assert_eq!(writer.code(), "f((__builder2) => {\n    x();\n});");
    }

    #[test]
    fn test_line_pragma() {
        let span = SourceSpan::new("Index.razor", 12, 3, 4, 5);
        let mut writer = CodeWriter::new();
        writer.indent();
        let pragma = writer.begin_line_pragma(Some(&span));
        writer.write_mapped("Count", Some(&span));
        writer.end_line_pragma(pragma);
        assert_eq!(
            writer.code(),
            "#line 4 \"Index.razor\"\n    Count\n#line default\n#line hidden\n"
        );

        let mapping = &writer.source_map().mappings()[0];
        assert_eq!(mapping.generated.absolute_index, 26);
        assert_eq!(mapping.generated.line_index, 1);
        assert_eq!(mapping.generated.character_index, 4);
        assert_eq!(mapping.original, span);
    }

    #[test]
    fn test_pragma_without_file_is_inactive() {
        let span = SourceSpan::default();
        let mut writer = CodeWriter::new();
        let pragma = writer.begin_line_pragma(Some(&span));
        assert!(!pragma.is_active());
        writer.end_line_pragma(pragma);
        assert_eq!(writer.code(), "");
    }
}
