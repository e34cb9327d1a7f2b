//! CSV importers and the orchestrator that sequences them
//!
//! Each importer reads its sources, normalizes every row and writes it
//! through the [`DataStore`]. A bad row never aborts the batch: it is
//! recorded in the importer's [`ImportResult`] and skipped.

pub mod common;
pub mod construction;
pub mod demographics;
pub mod developers;
pub mod intelligence;
pub mod market_metrics;
pub mod permits;
pub mod projects;
pub mod properties;
pub mod quality_of_life;

pub use common::{ImportTally, RowError, SourceFile};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::core::config::{Config, SourceLayout};
use crate::core::store::DataStore;

/// Outcome of one importer run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    pub data_type: String,
    /// True when no row or file reported an error
    pub success: bool,
    pub records_imported: usize,
    pub records_created: usize,
    pub records_updated: usize,
    pub records_failed: usize,
    pub files_read: usize,
    pub errors: Vec<String>,
}

/// Everything an importer needs besides its rows
pub struct ImportContext<'a> {
    pub store: &'a mut DataStore,
    pub data_root: PathBuf,
    pub layout: SourceLayout,
    pub market_year: i32,
}

impl<'a> ImportContext<'a> {
    pub fn new(store: &'a mut DataStore, data_root: PathBuf, config: &Config) -> Self {
        Self {
            store,
            data_root,
            layout: config.sources(),
            market_year: config.market_year(),
        }
    }

    /// Resolve a layout path against the data root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_root.join(path)
        }
    }
}

/// The importers, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImporterKind {
    Developers,
    Projects,
    Properties,
    Permits,
    MarketMetrics,
    Construction,
    MarketIntelligence,
    QualityOfLife,
    Demographics,
}

impl ImporterKind {
    pub fn all() -> &'static [ImporterKind] {
        &[
            ImporterKind::Developers,
            ImporterKind::Projects,
            ImporterKind::Properties,
            ImporterKind::Permits,
            ImporterKind::MarketMetrics,
            ImporterKind::Construction,
            ImporterKind::MarketIntelligence,
            ImporterKind::QualityOfLife,
            ImporterKind::Demographics,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImporterKind::Developers => "developers",
            ImporterKind::Projects => "projects",
            ImporterKind::Properties => "properties",
            ImporterKind::Permits => "permits",
            ImporterKind::MarketMetrics => "market-metrics",
            ImporterKind::Construction => "construction",
            ImporterKind::MarketIntelligence => "market-intelligence",
            ImporterKind::QualityOfLife => "quality-of-life",
            ImporterKind::Demographics => "demographics",
        }
    }

    /// Sources from the configured layout
    pub fn default_sources(&self, ctx: &ImportContext<'_>) -> Vec<SourceFile> {
        let layout = &ctx.layout;
        let plain = |paths: &[PathBuf]| -> Vec<SourceFile> {
            paths.iter().map(|p| SourceFile::new(ctx.resolve(p))).collect()
        };

        match self {
            ImporterKind::Developers => plain(&layout.developers),
            ImporterKind::Projects => plain(&layout.projects),
            ImporterKind::Properties => plain(&layout.properties),
            ImporterKind::Permits => plain(&layout.permits),
            ImporterKind::MarketMetrics => plain(&layout.market_metrics),
            ImporterKind::Construction => {
                let dirs: Vec<PathBuf> = layout
                    .construction_dirs
                    .iter()
                    .map(|d| ctx.resolve(d))
                    .collect();
                construction::discover(&dirs)
            }
            ImporterKind::MarketIntelligence => layout
                .market_intelligence
                .iter()
                .map(|s| SourceFile::new(ctx.resolve(&s.path)).with_category(&s.category))
                .collect(),
            ImporterKind::QualityOfLife => {
                let dirs: Vec<PathBuf> = layout
                    .quality_of_life_dirs
                    .iter()
                    .map(|d| ctx.resolve(d))
                    .collect();
                quality_of_life::discover(&dirs)
            }
            ImporterKind::Demographics => vec![
                SourceFile::new(ctx.resolve(&layout.neighborhood_demographics)),
                SourceFile::new(ctx.resolve(&layout.population_projections)),
            ],
        }
    }

    /// Run this importer over `files`
    pub fn run(&self, ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
        match self {
            ImporterKind::Developers => developers::import(ctx, files),
            ImporterKind::Projects => projects::import(ctx, files),
            ImporterKind::Properties => properties::import(ctx, files),
            ImporterKind::Permits => permits::import(ctx, files),
            ImporterKind::MarketMetrics => market_metrics::import(ctx, files),
            ImporterKind::Construction => construction::import(ctx, files),
            ImporterKind::MarketIntelligence => intelligence::import(ctx, files),
            ImporterKind::QualityOfLife => quality_of_life::import(ctx, files),
            ImporterKind::Demographics => demographics::import(ctx, files),
        }
    }
}

impl fmt::Display for ImporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImporterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ImporterKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = ImporterKind::all().iter().map(|k| k.as_str()).collect();
                format!("unknown importer '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Run one importer, over explicit files when given
pub fn run_one(
    ctx: &mut ImportContext<'_>,
    kind: ImporterKind,
    files: Option<Vec<SourceFile>>,
) -> ImportResult {
    let files = files.unwrap_or_else(|| kind.default_sources(ctx));
    info!(importer = %kind, sources = files.len(), "import started");

    let result = kind.run(ctx, &files);

    info!(
        importer = %kind,
        imported = result.records_imported,
        failed = result.records_failed,
        "import finished"
    );
    result
}

/// Run every importer in dependency order.
///
/// Importers are independent: a failing importer does not stop later ones,
/// and nothing is rolled back across importers.
pub fn run_all(ctx: &mut ImportContext<'_>) -> Vec<ImportResult> {
    ImporterKind::all()
        .iter()
        .map(|&kind| run_one(ctx, kind, None))
        .collect()
}
