//! Import quality-of-life scores per ZIP code
//!
//! Crime, walkability and school feeds arrive as separate files keyed by the
//! same ZIP code and date; each file fills in its own columns of the row.

use std::path::PathBuf;

use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::core::normalize::{parse_date, safe_float, safe_int, safe_string};
use crate::core::reader::RowRecord;
use crate::entities::QualityOfLife;

use super::common::{for_each_row, require, ImportTally, RowError};
use super::properties::ZIP_ALIASES;
use super::{ImportContext, ImportResult, SourceFile};

/// Every CSV file directly inside `dirs`
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
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found.into_iter().map(SourceFile::new).collect()
}

pub fn quality_from_row(
    row: &RowRecord,
    default_date: NaiveDate,
    source: &str,
) -> Result<QualityOfLife, RowError> {
    let zip_code = require(row, ZIP_ALIASES, "zip_code")?;

    Ok(QualityOfLife {
        zip_code,
        neighborhood: safe_string(row.get(&["Neighborhood", "Area"])),
        data_date: parse_date(row.get(&["Data_Date", "Date"])).unwrap_or(default_date),
        crime_rate: safe_float(row.get(&["Crime_Rate", "Crime_Index"])),
        safety_score: safe_float(row.get(&["Safety_Score"])),
        walk_score: safe_float(row.get(&["Walk_Score", "Walkability"])),
        transit_score: safe_float(row.get(&["Transit_Score"])),
        bike_score: safe_float(row.get(&["Bike_Score"])),
        schools_count: safe_int(row.get(&["Schools_Count", "School_Count", "Schools"])),
        avg_school_rating: safe_float(row.get(&["Avg_School_Rating", "School_Rating", "Rating"])),
        parks_count: safe_int(row.get(&["Parks_Count", "Park_Count", "Parks"])),
        source: source.to_string(),
        payload: row.to_json(),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("quality-of-life");
    let store = &*ctx.store;

    let Some(default_date) = NaiveDate::from_ymd_opt(ctx.market_year, 1, 1) else {
        tally.errors.push(format!("invalid market year {}", ctx.market_year));
        return tally.finish();
    };

    for_each_row(&mut tally, files, |file, row| {
        let record = quality_from_row(row, default_date, &file.name())?;
        Ok(store.upsert_merge(&record)?)
    });

    tally.finish()
}
