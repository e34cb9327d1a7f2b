//! Entity types persisted by the pipeline

pub mod demographics;
pub mod developer;
pub mod intelligence;
pub mod market;
pub mod permit;
pub mod project;
pub mod property;

pub use demographics::{AreaDemographics, PopulationProjection};
pub use developer::Developer;
pub use intelligence::{ConstructionActivity, MarketIntelligence, QualityOfLife};
pub use market::MarketMetrics;
pub use permit::Permit;
pub use project::{Project, ProjectPhase};
pub use property::Property;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every table the pipeline writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Developer,
    Project,
    Property,
    Permit,
    MarketMetrics,
    ConstructionActivity,
    MarketIntelligence,
    QualityOfLife,
    AreaDemographics,
    PopulationProjection,
}

impl EntityKind {
    /// Machine name, also used as the JSON key in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Developer => "developers",
            EntityKind::Project => "projects",
            EntityKind::Property => "properties",
            EntityKind::Permit => "permits",
            EntityKind::MarketMetrics => "market_metrics",
            EntityKind::ConstructionActivity => "construction_activity",
            EntityKind::MarketIntelligence => "market_intelligence",
            EntityKind::QualityOfLife => "quality_of_life",
            EntityKind::AreaDemographics => "area_demographics",
            EntityKind::PopulationProjection => "population_projections",
        }
    }

    /// SQLite table backing this entity
    pub fn table(&self) -> &'static str {
        self.as_str()
    }

    /// Human-readable plural label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Developer => "Developers",
            EntityKind::Project => "Projects",
            EntityKind::Property => "Properties",
            EntityKind::Permit => "Permits",
            EntityKind::MarketMetrics => "Market Metrics",
            EntityKind::ConstructionActivity => "Construction Activity",
            EntityKind::MarketIntelligence => "Market Intelligence",
            EntityKind::QualityOfLife => "Quality of Life",
            EntityKind::AreaDemographics => "Area Demographics",
            EntityKind::PopulationProjection => "Population Projections",
        }
    }

    /// Number of data fields a row of this entity carries.
    ///
    /// Bookkeeping columns (`id`, `created_at`, `updated_at`) are excluded.
    pub fn field_count(&self) -> usize {
        match self {
            EntityKind::Developer => Developer::FIELDS.len(),
            EntityKind::Project => Project::FIELDS.len(),
            EntityKind::Property => Property::FIELDS.len(),
            EntityKind::Permit => Permit::FIELDS.len(),
            EntityKind::MarketMetrics => MarketMetrics::FIELDS.len(),
            EntityKind::ConstructionActivity => ConstructionActivity::FIELDS.len(),
            EntityKind::MarketIntelligence => MarketIntelligence::FIELDS.len(),
            EntityKind::QualityOfLife => QualityOfLife::FIELDS.len(),
            EntityKind::AreaDemographics => AreaDemographics::FIELDS.len(),
            EntityKind::PopulationProjection => PopulationProjection::FIELDS.len(),
        }
    }

    /// All kinds, in import dependency order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Developer,
            EntityKind::Project,
            EntityKind::Property,
            EntityKind::Permit,
            EntityKind::MarketMetrics,
            EntityKind::ConstructionActivity,
            EntityKind::MarketIntelligence,
            EntityKind::QualityOfLife,
            EntityKind::AreaDemographics,
            EntityKind::PopulationProjection,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EntityKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("unknown entity kind: '{}'", s))
    }
}
