//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Name of the project marker directory
const PROJECT_DIR: &str = ".aql";

/// Represents an AQL project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .aql/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use an explicit project root (from `--project`) or discover one
    pub fn open(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .aql/ exists (rewrites the default config)
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    fn create_structure(root: &Path) -> Result<(), ProjectError> {
        let project_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&project_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for prefix in EntityPrefix::all() {
            std::fs::create_dir_all(root.join(prefix.directory()))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# AQL Project Configuration

# Default inspector name for new inspections (can be overridden by global config)
# author: ""

# Editor to use for `aql insp edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, json, tsv, md, id)
# default_format: auto

# Minimum coating thickness (same unit as the readings)
# coating_requirements:
#   mean: 85
#   local: 70

# Custom Ac/Re table (YAML, relative to the project root); built-in table if unset
# acre_table: tables/acre.yaml
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .aql configuration directory
    pub fn aql_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the directory for a given entity prefix
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(prefix.directory())
    }

    /// Get the path for an entity file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entity_dir(id.prefix())
            .join(format!("{}.aql.yaml", id))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an AQL project (searched from {searched_from:?}). Run 'aql init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("AQL project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
