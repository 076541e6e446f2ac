//! Import workspace discovery
//!
//! A workspace is any directory holding a `.rimport/` folder. It carries the
//! project-level config (API URL, mapping overrides) shared by everyone who
//! imports from that directory tree.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory
pub const WORKSPACE_DIR: &str = ".rimport";

/// Represents an import workspace
#[derive(Debug)]
pub struct Project {
    /// Root directory of the workspace (parent of .rimport/)
    root: PathBuf,
}

impl Project {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(WORKSPACE_DIR);
        if dir.exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# rimport workspace configuration
# Values here override ~/.config/rimport/config.yaml and are overridden by
# RIMPORT_* environment variables and command-line flags.

api_url: "http://localhost:8000/api"
timeout_secs: 30

# Per-entity column overrides, merged over the built-in tables:
# mappings:
#   conferences:
#     level:
#       rename: category
#     visa_required: skip
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .rimport directory
    pub fn rimport_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Path of the workspace config file
    pub fn config_path(&self) -> PathBuf {
        self.rimport_dir().join("config.yaml")
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an rimport workspace (searched from {searched_from:?}). Run 'rimport init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("rimport workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
