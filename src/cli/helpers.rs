//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::store::DataStore;
use crate::core::workspace::Workspace;

/// A located workspace together with its effective configuration
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
}

impl Session {
    /// Locate the workspace (honouring `--project`) and load its config
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = Workspace::locate(global.project.as_deref())
            .map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&workspace)).into_diagnostic()?;
        Ok(Self { workspace, config })
    }

    pub fn data_root(&self) -> PathBuf {
        self.workspace.resolve(&self.config.data_root())
    }

    pub fn database_path(&self) -> PathBuf {
        self.workspace.resolve(&self.config.database())
    }

    pub fn report_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.workspace.resolve(&self.config.report_markdown()),
            self.workspace.resolve(&self.config.report_json()),
        )
    }

    pub fn open_store(&self) -> Result<DataStore> {
        let path = self.database_path();
        DataStore::open(&path)
            .map_err(|e| miette::miette!("cannot open database {}: {}", path.display(), e))
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Île-de-Houston", 6), "Île...");
    }
}
