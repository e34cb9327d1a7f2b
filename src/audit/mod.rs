//! Data-quality audit over the relational store
//!
//! The audit is read-only and stateless: every run recomputes counts,
//! validation results, duplicate groups and relationship coverage from the
//! current database contents and derives a quality score and a list of
//! recommendations from fixed thresholds.

pub mod report;
pub mod validate;

pub use report::{pct, render_markdown, write_reports};
pub use validate::EntityValidation;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::store::{DataStore, DuplicateGroup, StoreError, TableCount};
use crate::entities::{Developer, EntityKind, MarketMetrics, Permit, Project, Property};

/// Score below which an entity gets a quality recommendation
pub const QUALITY_THRESHOLD: f64 = 0.8;

/// Issue count above which an entity gets a clean-up recommendation
pub const ISSUE_THRESHOLD: usize = 10;

/// Duplicate groups listed per entity in the report
const SAMPLE_GROUPS: usize = 5;

/// Natural keys checked for duplicates
const DUPLICATE_KEYS: &[(EntityKind, &[&str])] = &[
    (EntityKind::Property, &["address", "city", "zip_code"]),
    (EntityKind::Developer, &["name"]),
    (EntityKind::Permit, &["permit_number"]),
    (EntityKind::Project, &["name"]),
];

/// Duplicate natural keys found in one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCheck {
    pub entity: EntityKind,
    pub key: Vec<String>,
    /// Number of key values held by more than one row
    pub groups: i64,
    pub examples: Vec<DuplicateGroup>,
}

/// How many rows of a table carry a foreign key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCoverage {
    pub linked: i64,
    pub total: i64,
    /// linked / total, 0 when the table is empty
    pub ratio: f64,
}

impl LinkCoverage {
    pub fn new(linked: i64, total: i64) -> Self {
        let ratio = if total > 0 {
            linked as f64 / total as f64
        } else {
            0.0
        };
        Self {
            linked,
            total,
            ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationships {
    pub properties_with_developers: LinkCoverage,
    pub permits_with_properties: LinkCoverage,
    pub permits_with_projects: LinkCoverage,
    pub projects_with_developers: LinkCoverage,
}

/// Full audit result, serialized as the JSON report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataAuditReport {
    pub timestamp: DateTime<Utc>,
    pub total_data_points: i64,
    pub entities: Vec<TableCount>,
    pub validation: Vec<EntityValidation>,
    pub duplicates: Vec<DuplicateCheck>,
    pub relationships: Relationships,
    pub data_quality_score: f64,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DataAuditReport {
    pub fn total_records(&self) -> i64 {
        self.entities.iter().map(|c| c.rows).sum()
    }

    pub fn duplicate_groups(&self, kind: EntityKind) -> i64 {
        self.duplicates
            .iter()
            .find(|d| d.entity == kind)
            .map(|d| d.groups)
            .unwrap_or(0)
    }
}

/// Audit the store as of now
pub fn run(store: &DataStore) -> Result<DataAuditReport, StoreError> {
    run_at(store, Utc::now())
}

/// Audit the store, judging date-relative rules against `now`
pub fn run_at(store: &DataStore, now: DateTime<Utc>) -> Result<DataAuditReport, StoreError> {
    let entities = store.counts()?;
    let total_data_points = total_data_points(&entities);
    debug!(total_data_points, "counted entities");

    let validation = validate_all(store, i64::from(now.year()))?;
    let duplicates = check_duplicates(store)?;
    let relationships = check_relationships(store)?;

    let data_quality_score = if validation.is_empty() {
        0.0
    } else {
        validation.iter().map(|v| v.quality_score).sum::<f64>() / validation.len() as f64
    };
    let issues = validation.iter().flat_map(|v| v.issues.clone()).collect();
    let recommendations = recommend(&validation, &duplicates, &relationships);

    Ok(DataAuditReport {
        timestamp: now,
        total_data_points,
        entities,
        validation,
        duplicates,
        relationships,
        data_quality_score,
        issues,
        recommendations,
    })
}

/// Rows times mapped data fields, summed over every table
pub fn total_data_points(counts: &[TableCount]) -> i64 {
    counts
        .iter()
        .map(|c| c.rows * c.kind.field_count() as i64)
        .sum()
}

fn validate_all(store: &DataStore, current_year: i64) -> Result<Vec<EntityValidation>, StoreError> {
    Ok(vec![
        EntityValidation::check(
            EntityKind::Property.label(),
            &store.list::<Property>()?,
            |p| validate::property_issues(p, current_year),
        ),
        EntityValidation::check(
            EntityKind::Developer.label(),
            &store.list::<Developer>()?,
            validate::developer_issues,
        ),
        EntityValidation::check(
            EntityKind::Project.label(),
            &store.list::<Project>()?,
            validate::project_issues,
        ),
        EntityValidation::check(
            EntityKind::Permit.label(),
            &store.list::<Permit>()?,
            validate::permit_issues,
        ),
        EntityValidation::check(
            EntityKind::MarketMetrics.label(),
            &store.list::<MarketMetrics>()?,
            validate::market_metrics_issues,
        ),
    ])
}

fn check_duplicates(store: &DataStore) -> Result<Vec<DuplicateCheck>, StoreError> {
    DUPLICATE_KEYS
        .iter()
        .map(|&(entity, key)| {
            Ok(DuplicateCheck {
                entity,
                key: key.iter().map(|k| k.to_string()).collect(),
                groups: store.duplicate_group_count(entity, key)?,
                examples: store.duplicate_groups(entity, key, SAMPLE_GROUPS)?,
            })
        })
        .collect()
}

fn coverage(store: &DataStore, kind: EntityKind, column: &str) -> Result<LinkCoverage, StoreError> {
    Ok(LinkCoverage::new(
        store.count_populated(kind, column)?,
        store.count(kind)?,
    ))
}

fn check_relationships(store: &DataStore) -> Result<Relationships, StoreError> {
    Ok(Relationships {
        properties_with_developers: coverage(store, EntityKind::Property, "developer_id")?,
        permits_with_properties: coverage(store, EntityKind::Permit, "property_id")?,
        permits_with_projects: coverage(store, EntityKind::Permit, "project_id")?,
        projects_with_developers: coverage(store, EntityKind::Project, "developer_id")?,
    })
}

/// Threshold-driven recommendations, most specific first
pub fn recommend(
    validation: &[EntityValidation],
    duplicates: &[DuplicateCheck],
    relationships: &Relationships,
) -> Vec<String> {
    let mut out = Vec::new();

    for v in validation {
        if v.quality_score < QUALITY_THRESHOLD {
            out.push(format!(
                "Improve data quality for {} (currently {})",
                v.entity,
                pct(v.quality_score)
            ));
        }
        if v.issues.len() > ISSUE_THRESHOLD {
            out.push(format!("Address {} data issues in {}", v.issues.len(), v.entity));
        }
    }

    for d in duplicates.iter().filter(|d| d.groups > 0) {
        out.push(match d.entity {
            EntityKind::Property => format!("Remove {} duplicate property records", d.groups),
            EntityKind::Developer => format!("Merge {} duplicate developer records", d.groups),
            EntityKind::Permit => format!("Investigate {} duplicate permit numbers", d.groups),
            EntityKind::Project => format!("Merge {} duplicate project records", d.groups),
            other => format!("Resolve {} duplicate keys in {}", d.groups, other.as_str()),
        });
    }

    let links = [
        (&relationships.properties_with_developers, 0.5, "properties to developers"),
        (&relationships.permits_with_properties, 0.3, "permits to properties"),
        (&relationships.projects_with_developers, 0.5, "projects to developers"),
    ];
    for (link, threshold, what) in links {
        if link.total > 0 && link.ratio < threshold {
            out.push(format!("Link more {} (currently {})", what, pct(link.ratio)));
        }
    }

    out.push("Set up automated data validation checks".to_string());
    out.push("Implement data quality monitoring dashboard".to_string());
    out.push("Schedule regular data cleanup processes".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProjectPhase;

    fn project(name: &str, developer_id: Option<String>) -> Project {
        Project {
            name: name.to_string(),
            project_type: Some("mixed-use".into()),
            developer_id,
            area: None,
            total_value: Some(1_000_000.0),
            phase: ProjectPhase::Planning,
            description: None,
        }
    }

    fn permit(number: &str) -> Permit {
        Permit {
            permit_number: number.to_string(),
            permit_type: Some("building".into()),
            work_type: None,
            address: Some("1 Main St".into()),
            zip_code: Some("77002".into()),
            declared_value: Some(100.0),
            application_date: None,
            status: None,
            contractor_name: None,
            owner_name: None,
            description: None,
            property_id: None,
            project_id: None,
        }
    }

    #[test]
    fn test_empty_store_audit() {
        let store = DataStore::open_in_memory().unwrap();
        let report = run(&store).unwrap();

        assert_eq!(report.total_data_points, 0);
        assert_eq!(report.entities.len(), EntityKind::all().len());
        assert_eq!(report.validation.len(), 5);
        assert_eq!(report.data_quality_score, 1.0);
        assert_eq!(report.relationships.permits_with_projects.ratio, 0.0);
        // only the standing recommendations
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_project_developer_ratio() {
        let store = DataStore::open_in_memory().unwrap();
        let dev = store.upsert(&Developer::named("Hines")).unwrap();
        for i in 0..10 {
            let developer_id = (i < 7).then(|| dev.id().to_string());
            store.upsert(&project(&format!("Project {}", i), developer_id)).unwrap();
        }

        let report = run(&store).unwrap();
        let link = &report.relationships.projects_with_developers;
        assert_eq!(link.linked, 7);
        assert_eq!(link.total, 10);
        assert!((link.ratio - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_permits_form_one_group() {
        let store = DataStore::open_in_memory().unwrap();
        store.insert(&permit("P-1")).unwrap();
        store.insert(&permit("P-1")).unwrap();
        store.insert(&permit("P-2")).unwrap();

        let report = run(&store).unwrap();
        assert_eq!(report.duplicate_groups(EntityKind::Permit), 1);
        assert_eq!(report.duplicate_groups(EntityKind::Property), 0);
        assert!(report
            .recommendations
            .contains(&"Investigate 1 duplicate permit numbers".to_string()));
    }

    #[test]
    fn test_data_points_use_field_counts() {
        let store = DataStore::open_in_memory().unwrap();
        store.upsert(&Developer::named("Hines")).unwrap();
        store.upsert(&Developer::named("Lovett")).unwrap();
        store.upsert(&project("East River", None)).unwrap();

        let report = run(&store).unwrap();
        let expected = 2 * EntityKind::Developer.field_count() as i64
            + EntityKind::Project.field_count() as i64;
        assert_eq!(report.total_data_points, expected);
        assert_eq!(report.total_records(), 3);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let poor = EntityValidation {
            entity: "Projects".into(),
            total_records: 20,
            valid_records: 5,
            invalid_records: 15,
            issues: vec!["x".to_string(); 15],
            quality_score: 0.25,
        };
        let relationships = Relationships {
            properties_with_developers: LinkCoverage::new(1, 10),
            permits_with_properties: LinkCoverage::new(3, 10),
            permits_with_projects: LinkCoverage::new(0, 10),
            projects_with_developers: LinkCoverage::new(0, 0),
        };

        let recs = recommend(&[poor], &[], &relationships);
        assert_eq!(recs[0], "Improve data quality for Projects (currently 25.0%)");
        assert_eq!(recs[1], "Address 15 data issues in Projects");
        assert_eq!(recs[2], "Link more properties to developers (currently 10.0%)");
        // 0.3 is not below the permit threshold; empty projects are skipped
        assert_eq!(recs.len(), 6);
    }
}
