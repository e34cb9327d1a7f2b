//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Global user config (`~/.config/hdp/config.yaml`)
//! 3. Workspace config (`.hdp/config.yaml`)
//! 4. `HDP_*` environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::workspace::Workspace;

const DEFAULT_DATA_ROOT: &str = "data";
const DEFAULT_DATABASE: &str = ".hdp/data.db";
const DEFAULT_REPORT_MARKDOWN: &str = "DATA_AUDIT_REPORT.md";
const DEFAULT_REPORT_JSON: &str = "data-audit.json";
const DEFAULT_MARKET_YEAR: i32 = 2024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// hdp configuration with layered hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the CSV exports
    pub data_root: Option<PathBuf>,

    /// SQLite database file
    pub database: Option<PathBuf>,

    pub report_markdown: Option<PathBuf>,

    pub report_json: Option<PathBuf>,

    /// Period start year for market metrics rows
    pub market_year: Option<i32>,

    /// Per-importer source paths; a present key replaces the default
    pub sources: Option<SourceLayout>,
}

/// A file tagged with the intelligence category its rows belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedSource {
    pub category: String,
    pub path: PathBuf,
}

impl CategorizedSource {
    fn new(category: &str, path: &str) -> Self {
        Self {
            category: category.to_string(),
            path: PathBuf::from(path),
        }
    }
}

/// Where each importer finds its input, relative to the data root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    pub developers: Vec<PathBuf>,
    pub projects: Vec<PathBuf>,
    pub properties: Vec<PathBuf>,
    pub permits: Vec<PathBuf>,
    pub market_metrics: Vec<PathBuf>,
    /// Folders scanned for construction, permit and activity exports
    pub construction_dirs: Vec<PathBuf>,
    pub market_intelligence: Vec<CategorizedSource>,
    /// Folders whose CSV files all hold quality-of-life rows
    pub quality_of_life_dirs: Vec<PathBuf>,
    pub neighborhood_demographics: PathBuf,
    pub population_projections: PathBuf,
}

impl Default for SourceLayout {
    fn default() -> Self {
        let competitive = "Houston Development Market_ Competitive Analysis";
        Self {
            developers: vec![format!("{}/houston_developers_2024.csv", competitive).into()],
            projects: vec![
                format!("{}/houston_major_projects_2024.csv", competitive).into(),
                "Real-Time Houston Development Pipeline Research/houston_development_projects.csv"
                    .into(),
            ],
            properties: vec![
                "Houston Micro-Market Intelligence Report 2024/houston_property_values.csv".into(),
            ],
            permits: vec![
                "Real-Time Houston Development Pipeline Research/houston_construction_permits.csv"
                    .into(),
            ],
            market_metrics: vec![
                "Houston Association of Realtors (HAR) MLS Data Rep/houston_neighborhoods_january_2025.csv"
                    .into(),
            ],
            construction_dirs: vec![
                "Harris County Texas Construction Activity Report_".into(),
                "Houston Micro-Market Intelligence Report 2024".into(),
            ],
            market_intelligence: vec![
                CategorizedSource::new(
                    "competitive",
                    "Competitive Intelligence_ Texas Real Estate Market/houston_development_platforms.csv",
                ),
                CategorizedSource::new(
                    "competitive",
                    "Competitive Intelligence_ Texas Real Estate Market/texas_county_comparison_2024.csv",
                ),
                CategorizedSource::new(
                    "financial-performance",
                    "Harris County Real Estate Financial Performance An/harris_county_real_estate_performance_2024.csv",
                ),
                CategorizedSource::new(
                    "neighborhood",
                    "Neighborhood-Level Market Intelligence /houston_market_intelligence_2024.csv",
                ),
                CategorizedSource::new(
                    "investment-sentiment",
                    "Investment Sentiment and International Capital Flo/houston_market_outlook_2024.csv",
                ),
            ],
            quality_of_life_dirs: vec!["Quality of Life Metrics_ Houston and Harris County".into()],
            neighborhood_demographics:
                "Diversity and Cultural Demographics_ Harris County/houston_neighborhood_demographics_2025.csv"
                    .into(),
            population_projections:
                "Population Growth and Migration in Harris County,/population_projections_2030.csv"
                    .into(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/hdp/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path)? {
                config.merge(global);
            }
        }

        // 3. Workspace config (.hdp/config.yaml)
        if let Some(ws) = workspace {
            if let Some(local) = Self::read_file(&ws.config_path())? {
                config.merge(local);
            }
        }

        // 4. Environment variables
        config.apply_env(|name| std::env::var(name).ok())?;

        Ok(config)
    }

    /// Parse a config file; a missing file is `Ok(None)`
    fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn from_yaml(contents: &str) -> Result<Config, serde_yml::Error> {
        // an all-comment file deserializes to unit, not a map
        if contents.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "hdp")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("HDP_DATA_ROOT") {
            self.data_root = Some(root.into());
        }
        if let Some(db) = lookup("HDP_DATABASE") {
            self.database = Some(db.into());
        }
        if let Some(year) = lookup("HDP_MARKET_YEAR") {
            let parsed = year.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "HDP_MARKET_YEAR",
                value: year.clone(),
            })?;
            self.market_year = Some(parsed);
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_root.is_some() {
            self.data_root = other.data_root;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.report_markdown.is_some() {
            self.report_markdown = other.report_markdown;
        }
        if other.report_json.is_some() {
            self.report_json = other.report_json;
        }
        if other.market_year.is_some() {
            self.market_year = other.market_year;
        }
        if other.sources.is_some() {
            self.sources = other.sources;
        }
    }

    pub fn data_root(&self) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT))
    }

    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn report_markdown(&self) -> PathBuf {
        self.report_markdown
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_MARKDOWN))
    }

    pub fn report_json(&self) -> PathBuf {
        self.report_json
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_JSON))
    }

    pub fn market_year(&self) -> i32 {
        self.market_year.unwrap_or(DEFAULT_MARKET_YEAR)
    }

    pub fn sources(&self) -> SourceLayout {
        self.sources.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database(), PathBuf::from(".hdp/data.db"));
        assert_eq!(config.report_markdown(), PathBuf::from("DATA_AUDIT_REPORT.md"));
        assert_eq!(config.report_json(), PathBuf::from("data-audit.json"));
        assert_eq!(config.market_year(), 2024);
        assert_eq!(config.sources().developers.len(), 1);
    }

    #[test]
    fn test_commented_file_is_default() {
        let config = Config::from_yaml("# nothing here\n\n# data_root: x\n").unwrap();
        assert!(config.data_root.is_none());
    }

    #[test]
    fn test_partial_sources_keep_other_defaults() {
        let yaml = "sources:\n  developers:\n    - devs.csv\n";
        let config = Config::from_yaml(yaml).unwrap();
        let sources = config.sources();
        assert_eq!(sources.developers, vec![PathBuf::from("devs.csv")]);
        assert_eq!(sources.permits, SourceLayout::default().permits);
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let mut base = Config::from_yaml("data_root: a\nmarket_year: 2023\n").unwrap();
        let local = Config::from_yaml("data_root: b\n").unwrap();
        base.merge(local);
        assert_eq!(base.data_root(), PathBuf::from("b"));
        assert_eq!(base.market_year(), 2023);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [("HDP_DATA_ROOT", "/srv/csv"), ("HDP_MARKET_YEAR", "2025")].into();
        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_root(), PathBuf::from("/srv/csv"));
        assert_eq!(config.market_year(), 2025);
    }

    #[test]
    fn test_env_rejects_bad_year() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == "HDP_MARKET_YEAR").then(|| "next year".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}
