//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::coating::CoatingRequirements;
use crate::core::error::InspectionError;
use crate::core::table::AcReTable;
use crate::core::Project;
use crate::yaml::{parse_yaml, YamlError};

/// Coating thresholds used when no configuration sets them
pub const DEFAULT_COATING_MEAN: f64 = 85.0;
pub const DEFAULT_COATING_LOCAL: f64 = 70.0;

/// Coating requirements as written in a config file (either key may be absent)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CoatingRequirementsConfig {
    pub mean: Option<f64>,
    pub local: Option<f64>,
}

/// AQL configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default inspector for new inspections
    pub author: Option<String>,

    /// Editor command for `aql insp edit`
    pub editor: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Minimum coating thickness thresholds
    pub coating_requirements: CoatingRequirementsConfig,

    /// Custom Ac/Re table file, relative to the project root
    pub acre_table: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// A config file that exists but does not parse is an error; falling back
    /// to defaults would silently swap in another acceptance table.
    pub fn load_for(project: Option<&Project>) -> Result<Self, YamlError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/aql/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path)? {
                config.merge(global);
            }
        }

        // 3. Project config (.aql/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.aql_dir().join("config.yaml"))? {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("AQL_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("AQL_EDITOR") {
            config.editor = Some(editor);
        }

        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Config>, YamlError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;

        // The generated config is all comments
        let blank = contents
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if blank {
            return Ok(None);
        }

        let config = parse_yaml(&contents, &path.display().to_string(), "config")?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "aql")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.coating_requirements.mean.is_some() {
            self.coating_requirements.mean = other.coating_requirements.mean;
        }
        if other.coating_requirements.local.is_some() {
            self.coating_requirements.local = other.coating_requirements.local;
        }
        if other.acre_table.is_some() {
            self.acre_table = other.acre_table;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        // Fall back to username
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file, properly handling commands with arguments
    /// (e.g., "emacsclient -nw" or "code --wait")
    pub fn run_editor(&self, file_path: &std::path::Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let parts: Vec<&str> = editor.split_whitespace().collect();

        let Some((cmd, args)) = parts.split_first() else {
            return std::process::Command::new("vi").arg(file_path).status();
        };

        std::process::Command::new(cmd)
            .args(args)
            .arg(file_path)
            .status()
    }

    /// Coating requirements, validated
    pub fn coating_requirements(&self) -> Result<CoatingRequirements, InspectionError> {
        CoatingRequirements::new(
            self.coating_requirements.mean.unwrap_or(DEFAULT_COATING_MEAN),
            self.coating_requirements.local.unwrap_or(DEFAULT_COATING_LOCAL),
        )
    }

    /// The Ac/Re table in effect: the configured file, or the built-in table
    pub fn acre_table(&self, project: Option<&Project>) -> Result<AcReTable, InspectionError> {
        match &self.acre_table {
            None => Ok(AcReTable::standard()),
            Some(path) => {
                let full = match project {
                    Some(project) if path.is_relative() => project.root().join(path),
                    _ => path.clone(),
                };
                AcReTable::load(&full)
            }
        }
    }
}
