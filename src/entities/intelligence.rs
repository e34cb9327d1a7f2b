//! Loosely structured intelligence records
//!
//! Source schemas for these feeds change between exports, so besides a few
//! typed columns each record keeps the original row as a JSON payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single market-intelligence data point.
///
/// Keyed by (category, data point, location, source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIntelligence {
    /// competitive, financial-performance, investment-sentiment, ...
    pub category: String,

    /// Metric or subject name
    pub data_point: String,

    /// Raw value as it appeared in the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Numeric reading of `value`, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,

    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_date: Option<NaiveDate>,

    pub source: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl MarketIntelligence {
    pub const FIELDS: &'static [&'static str] = &[
        "category",
        "data_point",
        "value",
        "numeric_value",
        "location",
        "zip_code",
        "data_date",
        "source",
        "payload",
    ];
}

/// Construction activity from permit-style feeds, keyed by permit number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionActivity {
    pub permit_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    pub source: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ConstructionActivity {
    pub const FIELDS: &'static [&'static str] = &[
        "permit_number",
        "permit_type",
        "sub_type",
        "address",
        "zip_code",
        "neighborhood",
        "project_name",
        "developer",
        "contractor",
        "estimated_cost",
        "square_footage",
        "units",
        "permit_date",
        "status",
        "source",
        "payload",
    ];
}

/// Neighborhood quality-of-life scores, keyed by (zip code, data date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityOfLife {
    pub zip_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    pub data_date: NaiveDate,

    /// Incidents per 1000 residents per year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crime_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bike_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schools_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_school_rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parks_count: Option<i64>,

    pub source: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl QualityOfLife {
    pub const FIELDS: &'static [&'static str] = &[
        "zip_code",
        "neighborhood",
        "data_date",
        "crime_rate",
        "safety_score",
        "walk_score",
        "transit_score",
        "bike_score",
        "schools_count",
        "avg_school_rating",
        "parks_count",
        "source",
        "payload",
    ];
}
