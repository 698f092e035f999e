//! Workspace discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory at a workspace root
pub const MARKER_DIR: &str = ".trove";

/// Represents a Trove workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .trove/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path, force: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let marker = root.join(MARKER_DIR);
        if marker.exists() && !force {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        let workspace = Self { root };
        std::fs::create_dir_all(workspace.default_data_dir())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let config_path = workspace.config_path();
        if force || !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# Trove workspace configuration

# Persistence backend: file (pipe-delimited text) or sqlite
backend: file

# Where records are kept; relative paths resolve against the workspace root
# data_dir: .trove/data

# Library loan period in days
loan_period_days: 14

# Default output format (auto, tsv, json, csv, id)
# default_format: auto
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .trove directory
    pub fn trove_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Get the workspace config file path
    pub fn config_path(&self) -> PathBuf {
        self.trove_dir().join("config.yaml")
    }

    /// Data directory used when the config does not name one
    pub fn default_data_dir(&self) -> PathBuf {
        self.trove_dir().join("data")
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a trove workspace (searched from {searched_from:?}). Run 'trove init' or pass --data-dir.")]
    NotFound { searched_from: PathBuf },

    #[error("trove workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();

        assert!(workspace.trove_dir().is_dir());
        assert!(workspace.config_path().exists());
        assert!(workspace.default_data_dir().is_dir());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let err = Workspace::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_workspace_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_relative_path() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();
        assert_eq!(
            workspace.resolve(Path::new("records")),
            workspace.root().join("records")
        );
    }
}
