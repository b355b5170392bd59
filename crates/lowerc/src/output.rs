//! Output formatting for diagnostics.

use crate::cli::OutputFormat;
use crate::orchestrator::CheckResult;
use component_diagnostics::{Diagnostic, Severity};
use std::path::Path;

/// Formatter for diagnostic output.
pub struct OutputFormatter {
    format: OutputFormat,
    max_errors: Option<usize>,
}

impl OutputFormatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, max_errors: Option<usize>) -> Self {
        Self { format, max_errors }
    }

    /// Print a diagnostic. `errors_so_far` includes this one if it is an error.
    pub fn print_diagnostic(&self, file: &Path, diagnostic: &Diagnostic, errors_so_far: usize) {
        if diagnostic.is_error() && self.max_errors.is_some_and(|max| errors_so_far > max) {
            return;
        }
        println!("{}", self.format_diagnostic(file, diagnostic));
    }

    /// Print a file that could not be compiled.
    pub fn print_failure(&self, file: &Path, message: &str) {
        println!("{}", self.format_failure(file, message));
    }

    /// Print the summary.
    pub fn print_summary(&self, result: &CheckResult) {
        match self.format {
            OutputFormat::Human => self.print_summary_human(result),
            OutputFormat::Json => println!("{}", self.summary_json(result)),
            OutputFormat::Machine => {
                // No summary for machine format
            }
        }
    }

    /// Render a diagnostic in the configured format.
    pub fn format_diagnostic(&self, file: &Path, diagnostic: &Diagnostic) -> String {
        match self.format {
            OutputFormat::Human => format_human(file, diagnostic),
            OutputFormat::Json => format_json(file, diagnostic).to_string(),
            OutputFormat::Machine => format_machine(file, diagnostic),
        }
    }

    fn format_failure(&self, file: &Path, message: &str) -> String {
        match self.format {
            OutputFormat::Human => {
                format!("{}: \x1b[31merror\x1b[0m: {}", file.display(), message)
            }
            OutputFormat::Json => serde_json::json!({
                "type": "failure",
                "file": file.to_string_lossy(),
                "message": message,
            })
            .to_string(),
            OutputFormat::Machine => format!(
                "{}:0:0:error:io:{}",
                file.display(),
                escape_machine(message)
            ),
        }
    }

    fn summary_json(&self, result: &CheckResult) -> serde_json::Value {
        serde_json::json!({
            "type": "summary",
            "files": result.file_count,
            "written": result.written_count,
            "errors": result.error_count,
            "warnings": result.warning_count,
            "duration_ms": result.duration_ms
        })
    }

    fn print_summary_human(&self, result: &CheckResult) {
        println!();
        if result.error_count == 0 && result.warning_count == 0 {
            println!(
                "\x1b[32m✓\x1b[0m Compiled {} files ({}ms)",
                result.file_count, result.duration_ms
            );
            return;
        }
        if result.error_count > 0 {
            println!(
                "\x1b[31m✗\x1b[0m Found {} error{} in {} files",
                result.error_count,
                plural(result.error_count),
                result.file_count
            );
            if let Some(max) = self.max_errors.filter(|max| result.error_count > *max) {
                println!("  ({} not shown)", result.error_count - max);
            }
        }
        if result.warning_count > 0 {
            println!(
                "\x1b[33m⚠\x1b[0m Found {} warning{}",
                result.warning_count,
                plural(result.warning_count)
            );
        }
        println!("Time: {}ms", result.duration_ms);
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// One-based line and column of a diagnostic, `0:0` without a span.
fn position(diagnostic: &Diagnostic) -> (u32, u32) {
    diagnostic
        .span
        .as_ref()
        .map(|span| (span.line_index + 1, span.character_index + 1))
        .unwrap_or((0, 0))
}

fn format_human(file: &Path, diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
    };
    let (line, column) = position(diagnostic);
    format!(
        "{}:{}:{}: {} [{}]: {}",
        file.display(),
        line,
        column,
        severity,
        diagnostic.id(),
        diagnostic.message
    )
}

fn format_json(file: &Path, diagnostic: &Diagnostic) -> serde_json::Value {
    serde_json::json!({
        "type": "diagnostic",
        "file": file.to_string_lossy(),
        "severity": diagnostic.severity.as_str(),
        "code": diagnostic.id(),
        "message": diagnostic.message,
        "span": diagnostic.span,
    })
}

fn format_machine(file: &Path, diagnostic: &Diagnostic) -> String {
    let (line, column) = position(diagnostic);
    format!(
        "{}:{}:{}:{}:{}:{}",
        file.display(),
        line,
        column,
        diagnostic.severity.as_str(),
        diagnostic.id(),
        escape_machine(&diagnostic.message)
    )
}

fn escape_machine(message: &str) -> String {
    message.replace(':', "\\:")
}
