//! Configuration loading and management.

use crate::cli::Args;
use camino::Utf8PathBuf;
use component_ir::{DescriptorSet, DocumentOptions, TagDescriptor};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "lowerc.json";

/// Suffix of input documents.
pub const INPUT_SUFFIX: &str = ".component.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid JSON for its purpose.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An include, exclude or ignore pattern is not a valid glob.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of `lowerc.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    /// Patterns of input documents, relative to the workspace.
    pub include: Vec<String>,
    /// Patterns of input documents to skip.
    pub exclude: Vec<String>,
    /// Paths of JSON descriptor sets.
    pub descriptors: Vec<PathBuf>,
    /// Directory for generated files.
    pub out_dir: Option<PathBuf>,
    /// Extension of generated files.
    pub extension: Option<String>,
    /// Document options.
    pub options: DocumentOptions,
}

impl ConfigFile {
    /// Load a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        read_json(path)
    }

    /// Find `lowerc.json` in a directory or its parents.
    pub fn find(dir: &Path) -> Option<Utf8PathBuf> {
        let mut current = dir;
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Utf8PathBuf::from_path_buf(candidate).ok();
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }
}

/// Resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace: PathBuf,
    /// Path of the configuration file that was loaded.
    pub config_path: Option<PathBuf>,
    /// Descriptors every document is bound against.
    pub descriptors: DescriptorSet,
    /// Document options.
    pub options: DocumentOptions,
    /// Directory for generated files; `None` writes next to each input.
    pub out_dir: Option<PathBuf>,
    /// Extension of generated files, without the leading dot.
    pub extension: String,
    include: GlobSet,
    has_include: bool,
    exclude: GlobSet,
}

impl Config {
    /// Load configuration from CLI arguments and workspace.
    pub fn load(workspace: &Path, args: &Args) -> ConfigResult<Self> {
        let config_path = args.config.clone().or_else(|| {
            ConfigFile::find(workspace).map(Utf8PathBuf::into_std_path_buf)
        });
        let file = match &config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let base = config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(workspace);
        Self::from_file(workspace, base, config_path.clone(), file, args)
    }

    /// Combine a configuration file with CLI overrides.
    ///
    /// Relative paths in the file are resolved against `base`.
    pub fn from_file(
        workspace: &Path,
        base: &Path,
        config_path: Option<PathBuf>,
        file: ConfigFile,
        args: &Args,
    ) -> ConfigResult<Self> {
        let mut descriptors = DescriptorSet::default();
        for path in &file.descriptors {
            let set: Vec<TagDescriptor> = read_json(&base.join(path))?;
            descriptors.extend(set);
        }

        let mut options = file.options;
        if args.design_time {
            options.design_time = true;
        }

        let out_dir = args
            .out_dir
            .clone()
            .or_else(|| file.out_dir.map(|dir| base.join(dir)));

        let mut exclude = vec![
            "**/node_modules/**".to_string(),
            "**/target/**".to_string(),
            "**/.git/**".to_string(),
        ];
        exclude.extend(file.exclude);
        exclude.extend(args.ignore.iter().cloned());

        Ok(Self {
            workspace: workspace.to_path_buf(),
            config_path,
            descriptors,
            options,
            out_dir,
            extension: file
                .extension
                .map(|e| e.trim_start_matches('.').to_string())
                .unwrap_or_else(|| "g.cs".to_string()),
            has_include: !file.include.is_empty(),
            include: build_glob_set(&file.include)?,
            exclude: build_glob_set(&exclude)?,
        })
    }

    /// Check if a file should be compiled.
    pub fn should_process(&self, path: &Path) -> bool {
        let is_input = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(INPUT_SUFFIX))
            .unwrap_or(false);
        if !is_input {
            return false;
        }

        let relative = path.strip_prefix(&self.workspace).unwrap_or(path);
        if self.exclude.is_match(relative) || self.exclude.is_match(path) {
            return false;
        }
        !self.has_include || self.include.is_match(relative)
    }

    /// Where the code generated for `input` is written.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(INPUT_SUFFIX).unwrap_or(&file_name);
        let generated = format!("{}.{}", stem, self.extension);

        match &self.out_dir {
            Some(out_dir) => {
                let relative = input.strip_prefix(&self.workspace).unwrap_or(input);
                let dir = relative.parent().unwrap_or_else(|| Path::new(""));
                out_dir.join(dir).join(generated)
            }
            None => input.with_file_name(generated),
        }
    }
}

fn build_glob_set(patterns: &[String]) -> ConfigResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
