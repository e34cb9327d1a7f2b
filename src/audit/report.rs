//! Markdown and JSON rendering of an audit

use std::fs;
use std::io;
use std::path::Path;

use tabled::{builder::Builder, settings::Style};

use super::{DataAuditReport, LinkCoverage};

/// Issues shown per entity before eliding the rest
const TOP_ISSUES: usize = 3;

/// Format a ratio in [0, 1] as a percentage
pub fn pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Group digits in threes: 1234567 → "1,234,567"
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn link_row(builder: &mut Builder, name: &str, link: &LinkCoverage) {
    builder.push_record([
        name.to_string(),
        thousands(link.linked),
        thousands(link.total),
        pct(link.ratio),
    ]);
}

pub fn render_markdown(report: &DataAuditReport) -> String {
    let mut output = String::new();
    output.push_str("# Houston Development Data Audit Report\n\n");
    output.push_str(&format!(
        "**Generated:** {}\n\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str("## Executive Summary\n\n");
    output.push_str(&format!(
        "- **Total Data Points:** {}\n",
        thousands(report.total_data_points)
    ));
    output.push_str(&format!(
        "- **Total Records:** {}\n",
        thousands(report.total_records())
    ));
    output.push_str(&format!(
        "- **Overall Data Quality:** {}\n",
        pct(report.data_quality_score)
    ));
    output.push_str(&format!("- **Total Issues:** {}\n", report.issues.len()));
    output.push_str(&format!("- **Database Tables:** {}\n\n", report.entities.len()));

    output.push_str("## Entity Summary\n\n");
    let mut entities = Builder::default();
    entities.push_record(["Entity", "Records", "Fields", "Data Points"]);
    for count in &report.entities {
        let fields = count.kind.field_count() as i64;
        entities.push_record([
            count.kind.label().to_string(),
            thousands(count.rows),
            fields.to_string(),
            thousands(count.rows * fields),
        ]);
    }
    output.push_str(&entities.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    output.push_str("## Data Quality Analysis\n\n");
    let mut quality = Builder::default();
    quality.push_record(["Entity", "Total", "Valid", "Invalid", "Quality Score"]);
    for v in &report.validation {
        quality.push_record([
            v.entity.clone(),
            thousands(v.total_records as i64),
            thousands(v.valid_records as i64),
            thousands(v.invalid_records as i64),
            pct(v.quality_score),
        ]);
    }
    output.push_str(&quality.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    for v in report.validation.iter().filter(|v| !v.issues.is_empty()) {
        output.push_str(&format!("### {}\n\n", v.entity));
        for issue in v.issues.iter().take(TOP_ISSUES) {
            output.push_str(&format!("- {}\n", issue));
        }
        if v.issues.len() > TOP_ISSUES {
            output.push_str(&format!("- ... and {} more\n", v.issues.len() - TOP_ISSUES));
        }
        output.push('\n');
    }

    output.push_str("## Duplicate Analysis\n\n");
    let mut dups = Builder::default();
    dups.push_record(["Entity", "Natural Key", "Duplicate Groups"]);
    for d in &report.duplicates {
        dups.push_record([
            d.entity.label().to_string(),
            d.key.join(", "),
            d.groups.to_string(),
        ]);
    }
    output.push_str(&dups.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    let examples: Vec<_> = report
        .duplicates
        .iter()
        .flat_map(|d| d.examples.iter().map(move |g| (d.entity, g)))
        .collect();
    if !examples.is_empty() {
        let mut sample = Builder::default();
        sample.push_record(["Entity", "Key", "Rows"]);
        for (entity, group) in examples {
            sample.push_record([
                entity.label().to_string(),
                group.key.clone(),
                group.count.to_string(),
            ]);
        }
        output.push_str(&sample.build().with(Style::markdown()).to_string());
        output.push_str("\n\n");
    }

    output.push_str("## Relationship Analysis\n\n");
    let rel = &report.relationships;
    let mut links = Builder::default();
    links.push_record(["Relationship", "Linked", "Total", "Coverage"]);
    link_row(&mut links, "Properties with Developers", &rel.properties_with_developers);
    link_row(&mut links, "Permits with Properties", &rel.permits_with_properties);
    link_row(&mut links, "Permits with Projects", &rel.permits_with_projects);
    link_row(&mut links, "Projects with Developers", &rel.projects_with_developers);
    output.push_str(&links.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    output.push_str("## Recommendations\n\n");
    for (i, rec) in report.recommendations.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, rec));
    }

    output
}

pub fn render_json(report: &DataAuditReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Write both report artifacts, creating parent directories as needed
pub fn write_reports(report: &DataAuditReport, markdown: &Path, json: &Path) -> io::Result<()> {
    for path in [markdown, json] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(markdown, render_markdown(report))?;
    fs::write(json, render_json(report).map_err(io::Error::other)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit;
    use crate::core::store::DataStore;
    use crate::entities::{Developer, Permit};
    use tempfile::tempdir;

    fn audited_store() -> DataStore {
        let store = DataStore::open_in_memory().unwrap();
        store.upsert(&Developer::named("Hines")).unwrap();
        let permit = Permit {
            permit_number: "P-1".into(),
            permit_type: None,
            work_type: None,
            address: None,
            zip_code: None,
            declared_value: None,
            application_date: None,
            status: None,
            contractor_name: None,
            owner_name: None,
            description: None,
            property_id: None,
            project_id: None,
        };
        store.insert(&permit).unwrap();
        store.insert(&permit).unwrap();
        store
    }

    #[test]
    fn test_pct() {
        assert_eq!(pct(0.7), "70.0%");
        assert_eq!(pct(1.0), "100.0%");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-4500), "-4,500");
    }

    #[test]
    fn test_markdown_sections() {
        let report = audit::run(&audited_store()).unwrap();
        let md = render_markdown(&report);

        assert!(md.starts_with("# Houston Development Data Audit Report"));
        assert!(md.contains("## Entity Summary"));
        assert!(md.contains("| Developers"));
        assert!(md.contains("### Permits"));
        assert!(md.contains("Missing permit type"));
        assert!(md.contains("| P-1"));
        assert!(md.contains("1. "));
    }

    #[test]
    fn test_write_reports() {
        let tmp = tempdir().unwrap();
        let report = audit::run(&audited_store()).unwrap();
        let md = tmp.path().join("out/DATA_AUDIT_REPORT.md");
        let json = tmp.path().join("out/data-audit.json");

        write_reports(&report, &md, &json).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(parsed["entities"][0]["kind"], "developer");
        assert_eq!(parsed["entities"][0]["rows"], 1);
        assert!(parsed["recommendations"].as_array().unwrap().len() >= 3);
        assert!(std::fs::read_to_string(&md).unwrap().contains("## Recommendations"));
    }
}
