//! Import market-intelligence data points
//!
//! Every row becomes one data point tagged with the category of its source
//! file. Value columns differ per export, so the first matching value
//! column is kept verbatim alongside its numeric reading.

use crate::core::normalize::{parse_date, parse_magnitude, safe_float, safe_string};
use crate::core::reader::RowRecord;
use crate::entities::MarketIntelligence;

use super::common::{for_each_row, require, ImportTally, RowError};
use super::properties::ZIP_ALIASES;
use super::{ImportContext, ImportResult, SourceFile};

const DEFAULT_CATEGORY: &str = "general";
const DEFAULT_LOCATION: &str = "Houston";

const DATA_POINT_ALIASES: &[&str] = &[
    "Data_Point",
    "Metric",
    "Indicator",
    "Platform",
    "Project_Name",
    "Developer",
    "Name",
    "Category",
];

const VALUE_ALIASES: &[&str] = &[
    "Value",
    "Houston",
    "Amount",
    "Score",
    "Rate",
    "Total",
    "Median_Price",
    "Price",
    "Volume",
    "Percentage",
];

const LOCATION_ALIASES: &[&str] = &[
    "Location",
    "Area",
    "Neighborhood",
    "Submarket",
    "Market",
    "County",
    "City",
];

/// Numeric reading of a value cell: magnitude suffixes first, then percents
fn numeric(raw: Option<&str>) -> Option<f64> {
    parse_magnitude(raw).or_else(|| safe_float(raw))
}

pub fn intelligence_from_row(
    row: &RowRecord,
    category: &str,
    source: &str,
) -> Result<MarketIntelligence, RowError> {
    let data_point = require(row, DATA_POINT_ALIASES, "data_point")?;
    let value = row.get(VALUE_ALIASES);

    Ok(MarketIntelligence {
        category: category.to_string(),
        data_point,
        value: safe_string(value),
        numeric_value: numeric(value),
        location: safe_string(row.get(LOCATION_ALIASES))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        zip_code: safe_string(row.get(ZIP_ALIASES)),
        data_date: parse_date(row.get(&["Date", "Data_Date", "As_Of", "Period"])),
        source: source.to_string(),
        payload: row.to_json(),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("market-intelligence");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |file, row| {
        let category = file.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        let record = intelligence_from_row(row, category, &file.name())?;
        Ok(store.upsert(&record)?)
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
    fn test_row_mapping() {
        let row = RowRecord::from_pairs(
            2,
            &[
                ("Metric", "Cap Rate"),
                ("Houston", "6.5%"),
                ("Dallas", "5.9%"),
            ],
        );
        let rec = intelligence_from_row(&row, "competitive", "comparison.csv").unwrap();
        assert_eq!(rec.data_point, "Cap Rate");
        assert_eq!(rec.value.as_deref(), Some("6.5%"));
        assert_eq!(rec.numeric_value, Some(6.5));
        assert_eq!(rec.location, "Houston");
        assert_eq!(rec.payload["Dallas"], "5.9%");
    }

    #[test]
    fn test_money_values_expand_suffixes() {
        let row = RowRecord::from_pairs(2, &[("Indicator", "Foreign capital"), ("Value", "$1.2B")]);
        let rec = intelligence_from_row(&row, "investment-sentiment", "outlook.csv").unwrap();
        assert_eq!(rec.numeric_value, Some(1_200_000_000.0));
    }

    #[test]
    fn test_plain_decimals_are_not_rounded() {
        let row = RowRecord::from_pairs(2, &[("Metric", "Cap Rate"), ("Value", "6.5")]);
        let rec = intelligence_from_row(&row, "financial-performance", "perf.csv").unwrap();
        assert_eq!(rec.numeric_value, Some(6.5));

        let row = RowRecord::from_pairs(3, &[("Metric", "Walk score"), ("Value", "4.7%")]);
        let rec = intelligence_from_row(&row, "financial-performance", "perf.csv").unwrap();
        assert_eq!(rec.numeric_value, Some(4.7));
    }

    #[test]
    fn test_category_comes_from_source_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("houston_market_outlook_2024.csv");
        fs::write(
            &path,
            "Indicator,Value,Market\nBuyer confidence,72,Houston\nBuyer confidence,75,Houston\nRent growth,3.1%,Katy\n,9,Katy\n",
        )
        .unwrap();

        let mut store = DataStore::open_in_memory().unwrap();
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
        let files = vec![SourceFile::new(&path).with_category("investment-sentiment")];
        let result = import(&mut ctx, &files);

        assert_eq!(result.records_created, 2);
        assert_eq!(result.records_updated, 1);
        assert_eq!(result.records_failed, 1);
        assert_eq!(store.count(EntityKind::MarketIntelligence).unwrap(), 2);

        let rows = store.list::<MarketIntelligence>().unwrap();
        assert_eq!(rows[0].record.category, "investment-sentiment");
        assert_eq!(rows[0].record.numeric_value, Some(75.0));
        assert_eq!(rows[1].record.location, "Katy");
    }
}
