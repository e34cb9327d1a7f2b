//! Developer entity - builders and development companies

use serde::{Deserialize, Serialize};

/// A development company, keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    /// Company name (natural key)
    pub name: String,

    /// builder, developer, reit, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,

    /// Primary specialization (residential, commercial, mixed-use)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_focus: Option<String>,

    /// Active project count, refreshed on every import
    #[serde(default)]
    pub active_projects: i64,

    /// Average home or unit price across the portfolio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,

    /// Aggregate portfolio value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,

    /// Primary operating areas
    #[serde(default)]
    pub primary_areas: Vec<String>,
}

impl Developer {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "company_type",
        "primary_focus",
        "active_projects",
        "average_price",
        "total_value",
        "primary_areas",
    ];

    /// Minimal record created when another entity references an unknown developer
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company_type: Some("developer".to_string()),
            primary_focus: None,
            active_projects: 0,
            average_price: None,
            total_value: None,
            primary_areas: Vec::new(),
        }
    }
}
