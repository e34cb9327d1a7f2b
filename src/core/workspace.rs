//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory holding config and the database
pub const HDP_DIR: &str = ".hdp";

/// A directory tree managed by hdp
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .hdp/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(HDP_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use `path` as the workspace root, or discover one when `None`
    pub fn locate(path: Option<&Path>) -> Result<Self, WorkspaceError> {
        match path {
            Some(p) => Self::discover_from(p),
            None => Self::discover(),
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path, force: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let hdp_dir = root.join(HDP_DIR);
        if hdp_dir.exists() && !force {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&hdp_dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let config_path = hdp_dir.join("config.yaml");
        if force || !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        // the database is local state, never shared
        std::fs::write(hdp_dir.join(".gitignore"), "data.db*\n")
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# hdp workspace configuration

# Folder holding the CSV exports, relative to the workspace root
# data_root: data

# SQLite database file (default: .hdp/data.db)
# database: .hdp/data.db

# Audit report destinations
# report_markdown: DATA_AUDIT_REPORT.md
# report_json: data-audit.json

# Year used as the period start for market metrics
# market_year: 2024

# Override where each importer looks for its files (paths under data_root)
# sources:
#   developers:
#     - Houston Development Market_ Competitive Analysis/houston_developers_2024.csv
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .hdp directory
    pub fn hdp_dir(&self) -> PathBuf {
        self.root.join(HDP_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.hdp_dir().join("config.yaml")
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
    #[error("not an hdp workspace (searched from {searched_from:?}). Run 'hdp init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("hdp workspace already exists at {0:?}")]
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
        let ws = Workspace::init(tmp.path(), false).unwrap();

        assert!(ws.hdp_dir().is_dir());
        assert!(ws.config_path().exists());
        assert!(ws.hdp_dir().join(".gitignore").exists());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let err = Workspace::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));

        // force re-initializes in place
        Workspace::init(tmp.path(), true).unwrap();
    }

    #[test]
    fn test_workspace_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("data/permits");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
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
    fn test_resolve_relative_and_absolute() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path(), false).unwrap();
        assert_eq!(ws.resolve(Path::new("data")), ws.root().join("data"));
        let abs = tmp.path().join("elsewhere");
        assert_eq!(ws.resolve(&abs), abs);
    }
}
