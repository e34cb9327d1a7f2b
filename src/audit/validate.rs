//! Field-level validation rules applied to stored records
//!
//! Each rule returns the problems it found for one record; a record with
//! no problems is valid. Nothing here touches the database.

use serde::Serialize;

use crate::core::store::Stored;
use crate::entities::{Developer, MarketMetrics, Permit, Project, Property};

/// Earliest plausible construction year
pub const MIN_YEAR_BUILT: i64 = 1800;

/// Validation outcome for one entity type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityValidation {
    pub entity: String,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub issues: Vec<String>,
    /// valid / total, 1.0 when there are no records
    pub quality_score: f64,
}

impl EntityValidation {
    /// Run `rule` over every record and tally the results
    pub fn check<R, F>(entity: &str, records: &[Stored<R>], rule: F) -> Self
    where
        F: Fn(&R) -> Vec<String>,
    {
        let mut issues = Vec::new();
        let mut valid = 0;

        for stored in records {
            let problems = rule(&stored.record);
            if problems.is_empty() {
                valid += 1;
            }
            issues.extend(
                problems
                    .into_iter()
                    .map(|p| format!("{} {}: {}", singular(entity), stored.id, p)),
            );
        }

        let total = records.len();
        let quality_score = if total == 0 {
            1.0
        } else {
            valid as f64 / total as f64
        };

        Self {
            entity: entity.to_string(),
            total_records: total,
            valid_records: valid,
            invalid_records: total - valid,
            issues,
            quality_score,
        }
    }
}

fn singular(entity: &str) -> &str {
    match entity {
        "Properties" => "Property",
        "Developers" => "Developer",
        "Projects" => "Project",
        "Permits" => "Permit",
        "Market Metrics" => "Market metric",
        other => other,
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn negative<T: PartialOrd + Default>(value: Option<T>) -> bool {
    value.map(|v| v < T::default()).unwrap_or(false)
}

pub fn property_issues(p: &Property, current_year: i64) -> Vec<String> {
    let mut issues = Vec::new();
    if blank(Some(p.address.as_str())) {
        issues.push("Missing address".to_string());
    }
    if blank(p.zip_code.as_deref()) {
        issues.push("Missing zip code".to_string());
    }
    if negative(p.list_price) {
        issues.push(format!("Invalid list price: {}", p.list_price.unwrap_or_default()));
    }
    if negative(p.sold_price) {
        issues.push(format!("Invalid sold price: {}", p.sold_price.unwrap_or_default()));
    }
    if negative(p.square_feet) {
        issues.push(format!("Invalid square feet: {}", p.square_feet.unwrap_or_default()));
    }
    if let Some(year) = p.year_built {
        if year < MIN_YEAR_BUILT || year > current_year + 2 {
            issues.push(format!("Invalid year built: {}", year));
        }
    }
    issues
}

pub fn developer_issues(d: &Developer) -> Vec<String> {
    let mut issues = Vec::new();
    if blank(Some(d.name.as_str())) {
        issues.push("Missing name".to_string());
    }
    if blank(d.company_type.as_deref()) {
        issues.push("Missing company type".to_string());
    }
    if d.active_projects < 0 {
        issues.push("Invalid active projects count".to_string());
    }
    if negative(d.total_value) {
        issues.push("Invalid total value".to_string());
    }
    issues
}

pub fn project_issues(p: &Project) -> Vec<String> {
    let mut issues = Vec::new();
    if blank(Some(p.name.as_str())) {
        issues.push("Missing name".to_string());
    }
    if blank(p.project_type.as_deref()) {
        issues.push("Missing project type".to_string());
    }
    if negative(p.total_value) {
        issues.push("Invalid total value".to_string());
    }
    if blank(p.developer_id.as_deref()) {
        issues.push("Missing developer reference".to_string());
    }
    issues
}

pub fn permit_issues(p: &Permit) -> Vec<String> {
    let mut issues = Vec::new();
    if blank(Some(p.permit_number.as_str())) {
        issues.push("Missing permit number".to_string());
    }
    if blank(p.address.as_deref()) {
        issues.push("Missing address".to_string());
    }
    if blank(p.permit_type.as_deref()) {
        issues.push("Missing permit type".to_string());
    }
    if negative(p.declared_value) {
        issues.push("Invalid declared value".to_string());
    }
    issues
}

pub fn market_metrics_issues(m: &MarketMetrics) -> Vec<String> {
    let mut issues = Vec::new();
    if blank(Some(m.area_name.as_str())) {
        issues.push("Missing area name".to_string());
    }
    if negative(m.median_price) {
        issues.push("Invalid median price".to_string());
    }
    if negative(m.active_listings) {
        issues.push("Invalid active listings".to_string());
    }
    issues
}
