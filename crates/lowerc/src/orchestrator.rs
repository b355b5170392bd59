//! Orchestrator for compiling a workspace.

use crate::cli::Args;
use crate::config::{Config, INPUT_SUFFIX};
use crate::input::InputDocument;
use crate::output::OutputFormatter;
use component_codegen::GeneratedDocument;
use component_diagnostics::{Diagnostic, Severity};
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info_span, warn};

/// Result of a compile run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Number of files compiled.
    pub file_count: usize,
    /// Number of files written.
    pub written_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Time taken.
    pub duration_ms: u64,
}

impl CheckResult {
    /// Check if the run should fail the process.
    pub fn is_failure(&self, fail_on_warning: bool) -> bool {
        self.error_count > 0 || (fail_on_warning && self.warning_count > 0)
    }
}

/// Outcome of compiling one input.
#[derive(Debug)]
pub struct FileOutcome {
    /// The input document.
    pub path: PathBuf,
    /// Where code was written, if any.
    pub output: Option<PathBuf>,
    /// Diagnostics of the document.
    pub diagnostics: Vec<Diagnostic>,
    /// A failure to read, parse or write the document.
    pub failure: Option<String>,
}

/// Orchestrator for running lowerc.
pub struct Orchestrator {
    /// Configuration.
    config: Config,
    /// CLI arguments.
    args: Args,
    /// Output formatter.
    formatter: OutputFormatter,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(workspace: PathBuf, args: Args) -> Result<Self> {
        let config = Config::load(&workspace, &args)
            .into_diagnostic()
            .wrap_err("Failed to load configuration")?;
        let formatter = OutputFormatter::new(args.output, args.max_errors);
        Ok(Self::with_config(config, args, formatter))
    }

    /// Create an orchestrator from a resolved configuration.
    pub fn with_config(config: Config, args: Args, formatter: OutputFormatter) -> Self {
        Self {
            config,
            args,
            formatter,
        }
    }

    /// Compile every input once and report.
    pub fn run(&self) -> Result<CheckResult> {
        let start = Instant::now();

        let files = self.find_input_files();
        debug!(
            count = files.len(),
            workspace = %self.config.workspace.display(),
            config = ?self.config.config_path,
            "found inputs"
        );

        let outcomes = self.compile_all(&files);
        let (error_count, warning_count) = self.output_results(&outcomes);

        let result = CheckResult {
            file_count: files.len(),
            written_count: outcomes.iter().filter(|o| o.output.is_some()).count(),
            error_count,
            warning_count,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if self.args.timings {
            eprintln!("\nTiming: {}ms", result.duration_ms);
        }
        self.formatter.print_summary(&result);

        Ok(result)
    }

    /// Find all input documents in the workspace, sorted by path.
    pub fn find_input_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.config.workspace)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.config.should_process(path))
            .collect();
        files.sort();
        files
    }

    /// Compile inputs in parallel; outcomes keep the order of `files`.
    pub fn compile_all(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        files.par_iter().map(|file| self.compile_file(file)).collect()
    }

    /// Compile one input and write its generated code.
    pub fn compile_file(&self, path: &Path) -> FileOutcome {
        let _span = info_span!("compile", file = %path.display()).entered();
        let mut outcome = FileOutcome {
            path: path.to_path_buf(),
            output: None,
            diagnostics: Vec::new(),
            failure: None,
        };

        let document = match InputDocument::load(path) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "skipping input");
                outcome.failure = Some(e.to_string());
                return outcome;
            }
        };

        let generated = self.generate(&document, path);
        outcome.diagnostics = generated.diagnostics;
        if generated.code.is_empty() {
            return outcome;
        }

        let output = self.config.output_path(path);
        match write_output(&output, &generated.code) {
            Ok(()) => {
                debug!(output = %output.display(), "wrote generated code");
                outcome.output = Some(output);
            }
            Err(e) => outcome.failure = Some(format!("{:?}", e)),
        }
        outcome
    }

    fn generate(&self, document: &InputDocument, path: &Path) -> GeneratedDocument {
        let class_name = default_class_name(path);
        let mut tree = document.build(
            &self.config.descriptors,
            self.config.options.clone(),
            &class_name,
        );
        component_passes::lower(&mut tree);
        component_codegen::generate(&tree)
    }

    /// Print outcomes in input order and return error/warning counts.
    fn output_results(&self, outcomes: &[FileOutcome]) -> (usize, usize) {
        let mut error_count = 0;
        let mut warning_count = 0;

        for outcome in outcomes {
            if let Some(failure) = &outcome.failure {
                self.formatter.print_failure(&outcome.path, failure);
                error_count += 1;
            }
            for diagnostic in &outcome.diagnostics {
                match diagnostic.severity {
                    Severity::Error => error_count += 1,
                    Severity::Warning => warning_count += 1,
                }
                self.formatter
                    .print_diagnostic(&outcome.path, diagnostic, error_count);
            }
        }

        (error_count, warning_count)
    }
}

/// Class name for an input without an explicit one: the file stem.
fn default_class_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .strip_suffix(INPUT_SUFFIX)
        .unwrap_or(&file_name)
        .replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "_")
}

fn write_output(path: &Path, code: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(path, code)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::config::{ConfigFile, CONFIG_FILE_NAME};
    use pretty_assertions::assert_eq;
    use std::fs;

    const DESCRIPTORS: &str = r#"[
        {
            "kind": "component",
            "name": "App.Card",
            "typeName": "App.Card",
            "rules": [{ "tagName": "Card" }],
            "boundAttributes": [{ "name": "Title", "typeName": "System.String" }]
        }
    ]"#;

    const COUNTER: &str = r#"{
        "namespace": "App.Pages",
        "nodes": [
            { "type": "tag", "name": "h1", "children": [{ "type": "text", "text": "Counter" }] },
            {
                "type": "tag",
                "name": "Card",
                "selfClosing": true,
                "attributes": [{ "name": "Title", "value": "Hello" }]
            }
        ]
    }"#;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("descriptors.json"), DESCRIPTORS).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "descriptors": ["descriptors.json"] }"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("Pages")).unwrap();
        fs::write(dir.path().join("Pages/Counter.component.json"), COUNTER).unwrap();
        fs::write(dir.path().join("Pages/notes.json"), "{}").unwrap();
        dir
    }

    fn orchestrator(root: &Path, args: Args) -> Orchestrator {
        let config = Config::load(root, &args).unwrap();
        Orchestrator::with_config(config, args, OutputFormatter::new(OutputFormat::Machine, None))
    }

    #[test]
    fn test_compiles_workspace() {
        let dir = workspace();
        let orchestrator = orchestrator(dir.path(), Args::default());

        let result = orchestrator.run().unwrap();
        assert_eq!(result.file_count, 1);
        assert_eq!(result.written_count, 1);
        assert_eq!(result.error_count, 0);
        assert_eq!(result.warning_count, 0);
        assert!(!result.is_failure(true));

        let code = fs::read_to_string(dir.path().join("Pages/Counter.g.cs")).unwrap();
        assert!(code.contains("namespace App.Pages"));
        assert!(code.contains("public class Counter"));
        assert!(code.contains("__builder.OpenComponent<App.Card>("));
        assert!(code.contains("\"Title\", \"Hello\""));
    }

    #[test]
    fn test_diagnostics_are_counted() {
        let dir = workspace();
        fs::write(
            dir.path().join("Pages/Log.component.json"),
            r#"{
                "directives": [{ "name": "inject", "tokens": ["ILogger"] }],
                "nodes": [{ "type": "tag", "name": "script" }]
            }"#,
        )
        .unwrap();
        let orchestrator = orchestrator(dir.path(), Args::default());

        let result = orchestrator.run().unwrap();
        assert_eq!(result.file_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
        assert!(result.is_failure(false));
        // Recoverable diagnostics still produce code.
        assert_eq!(result.written_count, 2);
    }

    #[test]
    fn test_warnings_fail_only_on_request() {
        let result = CheckResult {
            warning_count: 2,
            ..CheckResult::default()
        };
        assert!(!result.is_failure(false));
        assert!(result.is_failure(true));
    }

    #[test]
    fn test_out_dir_and_design_time() {
        let dir = workspace();
        let out = dir.path().join("obj");
        let args = Args {
            design_time: true,
            out_dir: Some(out.clone()),
            ..Args::default()
        };
        let orchestrator = orchestrator(dir.path(), args);

        orchestrator.run().unwrap();
        let code = fs::read_to_string(out.join("Pages/Counter.g.cs")).unwrap();
        assert!(code.contains("private static object __o = null;"));
        assert!(code.contains("__o = typeof(App.Card);"));
        assert!(!dir.path().join("Pages/Counter.g.cs").exists());
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let dir = workspace();
        fs::write(dir.path().join("Pages/Broken.component.json"), "{ nodes").unwrap();
        let orchestrator = orchestrator(dir.path(), Args::default());

        let files = orchestrator.find_input_files();
        let outcomes = orchestrator.compile_all(&files);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].path.ends_with("Broken.component.json"));
        assert!(outcomes[0].failure.is_some());
        assert!(outcomes[1].failure.is_none());

        let result = orchestrator.run().unwrap();
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_default_class_name() {
        assert_eq!(default_class_name(Path::new("a/Counter.component.json")), "Counter");
        assert_eq!(default_class_name(Path::new("a/my-page.component.json")), "my_page");
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = workspace();
        let other = dir.path().join("other.json");
        fs::write(&other, r#"{ "exclude": ["Pages/**"] }"#).unwrap();
        let args = Args {
            config: Some(other),
            ..Args::default()
        };
        let config = Config::load(dir.path(), &args).unwrap();
        let file = ConfigFile::load(config.config_path.as_deref().unwrap()).unwrap();

        assert_eq!(file.exclude, vec!["Pages/**".to_string()]);
        assert!(config.descriptors.is_empty());
        let orchestrator = Orchestrator::with_config(
            config,
            args,
            OutputFormatter::new(OutputFormat::Machine, None),
        );
        assert!(orchestrator.find_input_files().is_empty());
    }
}
