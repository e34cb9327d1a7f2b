//! Import neighborhood demographics and population projections
//!
//! Unlike the other importers this one replaces its tables wholesale. All
//! rows are parsed first, then the tables whose source file was present are
//! cleared and refilled in a single transaction.

use crate::core::normalize::{parse_money, parse_percent, safe_int, safe_string};
use crate::core::reader::{normalize_header, RowRecord};
use crate::core::store::{Record, RecordRow};
use crate::entities::{AreaDemographics, EntityKind, PopulationProjection};

use super::common::{open_source, require, ImportTally, RowError};
use super::{ImportContext, ImportResult, SourceFile};

/// Year the neighborhood snapshot describes when the file does not say
const REPORT_YEAR: i64 = 2025;

/// Projection columns: (header, area, area type, base year, base population)
const PROJECTED_AREAS: &[(&str, &str, &str, i64, i64)] = &[
    ("Harris_County", "Harris County", "county", 2025, 4_943_000),
    ("City_of_Houston", "Houston", "city", 2025, 2_390_000),
];

/// What a demographics file holds, judged from its headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemographicsFile {
    Neighborhoods,
    Projections,
}

impl DemographicsFile {
    pub fn classify(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let has = |name: &str| normalized.iter().any(|h| h == &normalize_header(name));
        let has_area_column = PROJECTED_AREAS.iter().any(|(col, ..)| has(col));
        if has("Year") && has_area_column {
            DemographicsFile::Projections
        } else {
            DemographicsFile::Neighborhoods
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            DemographicsFile::Neighborhoods => EntityKind::AreaDemographics,
            DemographicsFile::Projections => EntityKind::PopulationProjection,
        }
    }
}

pub fn demographics_from_row(row: &RowRecord, source: &str) -> Result<AreaDemographics, RowError> {
    let neighborhood = require(row, &["Neighborhood", "Area", "Name"], "neighborhood")?;
    let total_population = safe_int(row.get(&["Population_2025", "Total_Population", "Population"]))
        .ok_or(RowError::MissingField("total_population"))?;

    Ok(AreaDemographics {
        neighborhood,
        total_population,
        median_income: parse_money(row.get(&["Median_Income", "Median_Household_Income"])),
        hispanic_percent: parse_percent(row.get(&["Hispanic_Latino_Pct", "Hispanic_Pct"])),
        asian_percent: parse_percent(row.get(&["Asian_Pct"])),
        black_percent: parse_percent(row.get(&["Black_Pct"])),
        white_percent: parse_percent(row.get(&["White_Pct"])),
        foreign_born_percent: parse_percent(row.get(&["Foreign_Born_Pct"])),
        report_year: safe_int(row.get(&["Report_Year", "Year"])).unwrap_or(REPORT_YEAR),
        source: source.to_string(),
    })
}

/// One projection per populated area column of the row
pub fn projections_from_row(
    row: &RowRecord,
    source: &str,
) -> Result<Vec<PopulationProjection>, RowError> {
    let year_raw = row.get(&["Year"]);
    let year = safe_int(year_raw).ok_or_else(|| match year_raw {
        Some(v) => RowError::InvalidValue {
            field: "year",
            value: v.to_string(),
        },
        None => RowError::MissingField("year"),
    })?;

    let projections: Vec<PopulationProjection> = PROJECTED_AREAS
        .iter()
        .filter_map(|&(column, area, area_type, base_year, base_pop)| {
            let population = safe_int(row.get(&[column]))?;
            Some(PopulationProjection::against_base(
                area,
                area_type,
                year,
                population,
                Some((base_year, base_pop)),
                source,
            ))
        })
        .collect();

    if projections.is_empty() {
        return Err(RowError::MissingField("projected_population"));
    }
    Ok(projections)
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("demographics");
    let mut kinds: Vec<EntityKind> = Vec::new();
    let mut rows: Vec<RecordRow> = Vec::new();

    for file in files {
        let Some(source) = open_source(&mut tally, file) else {
            continue;
        };
        let shape = DemographicsFile::classify(source.headers());
        if !kinds.contains(&shape.kind()) {
            kinds.push(shape.kind());
        }
        let name = file.name();

        let mut line = 1;
        for result in source {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    line += 1;
                    tally.row_failed(&file.path, line, e.into());
                    continue;
                }
            };
            line = row.line();

            let parsed = match shape {
                DemographicsFile::Neighborhoods => {
                    demographics_from_row(&row, &name).map(|d| vec![d.to_row()])
                }
                DemographicsFile::Projections => projections_from_row(&row, &name)
                    .map(|ps| ps.iter().map(Record::to_row).collect()),
            };
            match parsed {
                Ok(records) => rows.extend(records),
                Err(e) => tally.row_failed(&file.path, row.line(), e),
            }
        }
    }

    if kinds.is_empty() {
        return tally.finish();
    }

    match ctx.store.replace_all(&kinds, &rows) {
        Ok(inserted) => tally.created += inserted,
        Err(e) => tally.errors.push(format!("replace failed: {}", e)),
    }
    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::store::DataStore;
    use std::fs;
    use tempfile::tempdir;

    const NEIGHBORHOODS: &str = "Neighborhood,Population_2025,Hispanic_Latino_Pct,Asian_Pct,Black_Pct,White_Pct,Foreign_Born_Pct\n\
        Alief,105000,48.5%,22.1,20.3,6.0,45.2\n\
        Gulfton,46000,75.0,4.1,10.2,8.9,60.0\n\
        Nowhere,,1,1,1,1,1\n";

    const PROJECTIONS: &str = "Year,Harris_County,City_of_Houston\n2025,4943000,2390000\n2030,5200000,\n";

    fn write(dir: &std::path::Path, name: &str, body: &str) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        SourceFile::new(path)
    }

    #[test]
    fn test_classify_by_headers() {
        let proj = vec!["Year".to_string(), "Harris County".to_string()];
        assert_eq!(DemographicsFile::classify(&proj), DemographicsFile::Projections);
        let hood = vec!["Neighborhood".to_string(), "Year".to_string()];
        assert_eq!(DemographicsFile::classify(&hood), DemographicsFile::Neighborhoods);
    }

    #[test]
    fn test_projection_growth() {
        let row = RowRecord::from_pairs(3, &[("Year", "2030"), ("Harris_County", "5,436,300")]);
        let ps = projections_from_row(&row, "p.csv").unwrap();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].area, "Harris County");
        assert_eq!(ps[0].growth_absolute, Some(493_300));
        let rate = ps[0].growth_rate.unwrap();
        assert!((rate - 9.979769).abs() < 1e-4);
    }

    #[test]
    fn test_import_replaces_tables() {
        let tmp = tempdir().unwrap();
        let files = vec![
            write(tmp.path(), "demographics.csv", NEIGHBORHOODS),
            write(tmp.path(), "projections.csv", PROJECTIONS),
        ];
        let mut store = DataStore::open_in_memory().unwrap();
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());

        let first = import(&mut ctx, &files);
        assert_eq!(first.records_imported, 5);
        assert_eq!(first.records_failed, 1);
        assert!(first.errors[0].contains("total_population"));

        // a second run does not accumulate
        let second = import(&mut ctx, &files);
        assert_eq!(second.records_imported, 5);
        assert_eq!(store.count(EntityKind::AreaDemographics).unwrap(), 2);
        assert_eq!(store.count(EntityKind::PopulationProjection).unwrap(), 3);

        let demos = store.list::<AreaDemographics>().unwrap();
        assert_eq!(demos[0].record.hispanic_percent, Some(48.5));
        assert_eq!(demos[0].record.report_year, 2025);
    }

    #[test]
    fn test_missing_file_keeps_its_table() {
        let tmp = tempdir().unwrap();
        let mut store = DataStore::open_in_memory().unwrap();
        {
            let mut ctx =
                ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
            import(&mut ctx, &[write(tmp.path(), "projections.csv", PROJECTIONS)]);
        }

        let hoods = write(tmp.path(), "demographics.csv", NEIGHBORHOODS);
        let absent = SourceFile::new(tmp.path().join("gone.csv"));
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
        let result = import(&mut ctx, &[hoods, absent]);

        assert_eq!(result.records_imported, 2);
        assert_eq!(store.count(EntityKind::PopulationProjection).unwrap(), 3);
    }

    #[test]
    fn test_no_sources_touches_nothing() {
        let tmp = tempdir().unwrap();
        let mut store = DataStore::open_in_memory().unwrap();
        {
            let mut ctx =
                ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
            import(&mut ctx, &[write(tmp.path(), "projections.csv", PROJECTIONS)]);
        }
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
        let result = import(&mut ctx, &[SourceFile::new(tmp.path().join("gone.csv"))]);
        assert!(result.success);
        assert_eq!(result.records_imported, 0);
        assert_eq!(store.count(EntityKind::PopulationProjection).unwrap(), 3);
    }
}
