//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Lowers component templates into render tree builder code.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "lowerc")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Workspace directory to compile
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Path to lowerc.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit design-time code for editor tooling
    #[arg(long)]
    pub design_time: bool,

    /// Directory for generated files
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub output: OutputFormat,

    /// Fail on warnings
    #[arg(long)]
    pub fail_on_warning: bool,

    /// Show timing information
    #[arg(long)]
    pub timings: bool,

    /// Maximum number of errors to show
    #[arg(long)]
    pub max_errors: Option<usize>,

    /// Ignore patterns (glob)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON lines
    Json,
    /// Machine-readable output
    Machine,
}

impl Args {
    /// Default tracing filter for these arguments.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "lowerc",
            "--design-time",
            "--output",
            "machine",
            "--ignore",
            "**/generated/**",
            "--max-errors",
            "3",
        ]);
        assert!(args.design_time);
        assert_eq!(args.output, OutputFormat::Machine);
        assert_eq!(args.ignore, vec!["**/generated/**".to_string()]);
        assert_eq!(args.max_errors, Some(3));
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let args = Args::parse_from(["lowerc", "-v"]);
        assert_eq!(args.log_level(), "debug");
    }
}
