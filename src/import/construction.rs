//! Import construction activity from development-pipeline exports
//!
//! The pipeline folders hold several differently shaped CSVs. Any file whose
//! name mentions construction, permits or activity is read; the full source
//! row is kept as a JSON payload.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::core::normalize::{lowercase_enum, parse_date, parse_money, safe_int, safe_string};
use crate::core::reader::RowRecord;
use crate::entities::permit::synthesize_permit_number;
use crate::entities::ConstructionActivity;

use super::common::{for_each_row, ImportTally, RowError};
use super::properties::ZIP_ALIASES;
use super::{ImportContext, ImportResult, SourceFile};

const NAME_MARKERS: &[&str] = &["construction", "permit", "activity", "development_projects"];

/// CSV files directly inside `dirs` whose names look like construction feeds
pub fn discover(dirs: &[PathBuf]) -> Vec<SourceFile> {
    let mut found: Vec<PathBuf> = dirs
        .iter()
        .filter(|d| d.is_dir())
        .flat_map(|d| {
            WalkDir::new(d)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
        })
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            name.ends_with(".csv") && NAME_MARKERS.iter().any(|m| name.contains(m))
        })
        .collect();
    found.sort();
    found.into_iter().map(SourceFile::new).collect()
}

pub fn activity_from_row(row: &RowRecord, source: &str) -> Result<ConstructionActivity, RowError> {
    let address = safe_string(row.get(&["Address", "Location", "Site_Address"]));
    let project_name = safe_string(row.get(&["Project Name", "Project_Name", "Project"]));
    let date_raw = row.get(&["Issue Date", "Permit_Date", "Date", "Start_Date"]);
    let permit_type = lowercase_enum(row.get(&["Type", "Permit_Type", "Permit Type"]));

    let permit_number = match safe_string(row.get(&["Permit Number", "Permit_Number", "Permit_No"])) {
        Some(n) => n,
        None if address.is_some() || project_name.is_some() => synthesize_permit_number(
            "DEV",
            &[
                address.as_deref(),
                project_name.as_deref(),
                date_raw,
                permit_type.as_deref(),
                Some(source),
            ],
        ),
        None => return Err(RowError::MissingField("permit_number")),
    };

    Ok(ConstructionActivity {
        permit_number,
        permit_type,
        sub_type: lowercase_enum(row.get(&["Sub_Type", "Work_Type", "Subtype"])),
        address,
        zip_code: safe_string(row.get(ZIP_ALIASES)),
        neighborhood: safe_string(row.get(&["Area", "Neighborhood", "Submarket"])),
        project_name,
        developer: safe_string(row.get(&["Developer", "Builder", "Owner"])),
        contractor: safe_string(row.get(&["Contractor", "General_Contractor"])),
        estimated_cost: parse_money(row.get(&["Value", "Estimated_Cost", "Valuation", "Investment"])),
        square_footage: safe_int(row.get(&["Square Feet", "Square_Footage", "Sqft", "SF"])),
        units: safe_int(row.get(&["Units", "Unit_Count"])),
        permit_date: parse_date(date_raw),
        status: lowercase_enum(row.get(&["Status"])),
        source: source.to_string(),
        payload: row.to_json(),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("construction");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |file, row| {
        let activity = activity_from_row(row, &file.name())?;
        Ok(store.upsert(&activity)?)
    });

    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::store::DataStore;
    use crate::entities::EntityKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_filters_by_name() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("houston_construction_permits.csv"), "a\n1\n").unwrap();
        fs::write(tmp.path().join("houston_development_projects.csv"), "a\n1\n").unwrap();
        fs::write(tmp.path().join("market_outlook.csv"), "a\n1\n").unwrap();
        fs::write(tmp.path().join("construction_notes.txt"), "x").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/construction_2023.csv"), "a\n1\n").unwrap();

        let found = discover(&[tmp.path().to_path_buf(), tmp.path().join("absent")]);
        let names: Vec<String> = found.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["houston_construction_permits.csv", "houston_development_projects.csv"]
        );
    }

    #[test]
    fn test_import_keeps_payload_and_dedupes() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("houston_development_projects.csv");
        fs::write(
            &path,
            "Project Name,Developer,Type,Location,ZIP Code,Value,Square Feet,Units,Status\n\
             Hines Tower,Hines,Commercial,Downtown,77002,$450M,\"1,200,000\",,Under Construction\n\
             ,,,,,,,,\n\
             Hines Tower,Hines,Commercial,Downtown,77002,$475M,\"1,200,000\",,Under Construction\n\
             ,,Residential,,77008,$2M,,12,Planned\n",
        )
        .unwrap();

        let mut store = DataStore::open_in_memory().unwrap();
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
        let result = import(&mut ctx, &[SourceFile::new(&path)]);

        assert_eq!(result.records_created, 1);
        assert_eq!(result.records_updated, 1);
        assert_eq!(result.records_failed, 1);
        assert_eq!(store.count(EntityKind::ConstructionActivity).unwrap(), 1);

        let rows = store.list::<ConstructionActivity>().unwrap();
        let a = &rows[0].record;
        assert!(a.permit_number.starts_with("DEV-"));
        assert_eq!(a.estimated_cost, Some(475_000_000.0));
        assert_eq!(a.square_footage, Some(1_200_000));
        assert_eq!(a.source, "houston_development_projects.csv");
        assert_eq!(a.payload["Developer"], "Hines");
    }
}
