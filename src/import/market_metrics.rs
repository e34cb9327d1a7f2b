//! Import neighborhood market metrics from CSV
//!
//! Exports carry one row per area without a reporting window, so rows
//! without explicit dates are filed as a yearly period for the configured
//! market year.

use chrono::NaiveDate;

use crate::core::normalize::{
    lowercase_enum, parse_date, parse_money, parse_percent, safe_float, safe_int, safe_string,
};
use crate::core::reader::RowRecord;
use crate::entities::MarketMetrics;

use super::common::{for_each_row, require, ImportTally, RowError};
use super::properties::ZIP_ALIASES;
use super::{ImportContext, ImportResult, SourceFile};

const DEFAULT_PERIOD: &str = "yearly";

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), RowError> {
    let invalid = || RowError::InvalidValue {
        field: "market_year",
        value: year.to_string(),
    };
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    Ok((start, end))
}

pub fn metrics_from_row(row: &RowRecord, market_year: i32) -> Result<MarketMetrics, RowError> {
    let area_name = require(
        row,
        &["Neighborhood", "Area", "Area_Name", "Submarket", "Market"],
        "area_name",
    )?;

    let (start_date, end_date) = match parse_date(row.get(&["Start_Date", "Period_Start"])) {
        Some(start) => (start, parse_date(row.get(&["End_Date", "Period_End"]))),
        None => {
            let (start, end) = year_bounds(market_year)?;
            (start, Some(end))
        }
    };

    Ok(MarketMetrics {
        area_name,
        area_type: lowercase_enum(row.get(&["Area_Type", "Type"]))
            .or_else(|| Some("neighborhood".to_string())),
        zip_code: safe_string(row.get(ZIP_ALIASES)),
        period: lowercase_enum(row.get(&["Period"])).unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
        start_date,
        end_date,
        active_listings: safe_int(row.get(&["Inventory", "Active_Listings", "Active Listings"])),
        closed_sales: safe_int(row.get(&["Sales Volume", "Sales_Volume", "Closed_Sales", "Sales"])),
        inventory_months: safe_float(row.get(&["Months_Inventory", "Months of Inventory", "Inventory_Months"])),
        median_price: parse_money(row.get(&["Median Price", "Median_Price", "Median_Home_Price"])),
        average_price: parse_money(row.get(&["Average Price", "Average_Price", "Avg_Price"])),
        median_price_change: parse_percent(row.get(&[
            "Price Change",
            "Price_Change",
            "YoY_Change",
            "Median_Price_Change",
        ])),
        avg_days_on_market: safe_int(row.get(&["Days on Market", "Days_On_Market", "DOM"])),
        list_to_sale_ratio: parse_percent(row.get(&["List to Sale Ratio", "List_To_Sale_Ratio"])),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("market-metrics");
    let store = &*ctx.store;
    let market_year = ctx.market_year;

    for_each_row(&mut tally, files, |_, row| {
        let metrics = metrics_from_row(row, market_year)?;
        Ok(store.upsert(&metrics)?)
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

    const HEADER: &str = "Neighborhood,ZIP Code,Median Price,Price Change,Days on Market,Inventory,Sales Volume,List to Sale Ratio\n";

    fn run(store: &mut DataStore, csv: &str) -> ImportResult {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("neighborhoods.csv");
        fs::write(&path, csv).unwrap();
        let config = Config::from_yaml("market_year: 2024\n").unwrap();
        let mut ctx = ImportContext::new(store, tmp.path().to_path_buf(), &config);
        import(&mut ctx, &[SourceFile::new(path)])
    }

    #[test]
    fn test_row_is_filed_under_market_year() {
        let row = RowRecord::from_pairs(
            2,
            &[
                ("Neighborhood", "Montrose"),
                ("Median Price", "$485,000"),
                ("Price Change", "5.2%"),
                ("Days on Market", "32"),
            ],
        );
        let m = metrics_from_row(&row, 2024).unwrap();
        assert_eq!(m.period, "yearly");
        assert_eq!(m.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(m.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(m.median_price, Some(485_000.0));
        assert_eq!(m.median_price_change, Some(5.2));
        assert_eq!(m.avg_days_on_market, Some(32));
    }

    #[test]
    fn test_reimport_overwrites_numbers() {
        let mut store = DataStore::open_in_memory().unwrap();
        run(&mut store, &format!("{}Heights,77008,\"$500,000\",4.1%,28,120,80,98.5%\n", HEADER));
        let second = run(&mut store, &format!("{}Heights,77008,\"$520,000\",,30,,85,\n", HEADER));

        assert_eq!(second.records_updated, 1);
        assert_eq!(store.count(EntityKind::MarketMetrics).unwrap(), 1);

        let rows = store.list::<MarketMetrics>().unwrap();
        let m = &rows[0].record;
        assert_eq!(m.median_price, Some(520_000.0));
        assert_eq!(m.closed_sales, Some(85));
        // blanks overwrite too
        assert_eq!(m.median_price_change, None);
        assert_eq!(m.active_listings, None);
    }

    #[test]
    fn test_missing_area_is_row_error() {
        let mut store = DataStore::open_in_memory().unwrap();
        let result = run(&mut store, &format!("{},77008,$1,,,,,\n", HEADER));
        assert_eq!(result.records_failed, 1);
        assert!(result.errors[0].contains("area_name"));
    }
}
