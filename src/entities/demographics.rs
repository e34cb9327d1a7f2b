//! Demographic snapshots and population projections
//!
//! Both tables are replaced wholesale by every demographics import.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDemographics {
    pub neighborhood: String,

    pub total_population: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_income: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hispanic_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asian_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_born_percent: Option<f64>,

    pub report_year: i64,

    pub source: String,
}

impl AreaDemographics {
    pub const FIELDS: &'static [&'static str] = &[
        "neighborhood",
        "total_population",
        "median_income",
        "hispanic_percent",
        "asian_percent",
        "black_percent",
        "white_percent",
        "foreign_born_percent",
        "report_year",
        "source",
    ];
}

/// Projected population for a county or city in a given year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationProjection {
    /// County or city name
    pub area: String,

    /// "county" or "city"
    pub area_type: String,

    pub projection_year: i64,

    pub projected_population: i64,

    /// Growth over the base year, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_absolute: Option<i64>,

    pub source: String,
}

impl PopulationProjection {
    pub const FIELDS: &'static [&'static str] = &[
        "area",
        "area_type",
        "projection_year",
        "projected_population",
        "growth_rate",
        "growth_absolute",
        "source",
    ];

    /// Build a projection, computing growth against a base-year population
    pub fn against_base(
        area: impl Into<String>,
        area_type: impl Into<String>,
        year: i64,
        population: i64,
        base: Option<(i64, i64)>,
        source: impl Into<String>,
    ) -> Self {
        let (growth_rate, growth_absolute) = match base {
            Some((base_year, _)) if base_year == year => (Some(0.0), Some(0)),
            Some((_, base_pop)) if base_pop > 0 => {
                let delta = population - base_pop;
                (Some(delta as f64 / base_pop as f64 * 100.0), Some(delta))
            }
            _ => (None, None),
        };
        Self {
            area: area.into(),
            area_type: area_type.into(),
            projection_year: year,
            projected_population: population,
            growth_rate,
            growth_absolute,
            source: source.into(),
        }
    }
}
