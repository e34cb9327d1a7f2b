//! Market metrics - per-area listing and sales statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated market statistics for one area over one period.
///
/// Keyed by (area name, period, start date). A re-import overwrites every
/// numeric field with the incoming value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub area_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    /// Period granularity (yearly, quarterly, monthly)
    pub period: String,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_listings: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_sales: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_months: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,

    /// Year-over-year median price change, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_price_change: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_days_on_market: Option<i64>,

    /// List-to-sale ratio, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_to_sale_ratio: Option<f64>,
}

impl MarketMetrics {
    pub const FIELDS: &'static [&'static str] = &[
        "area_name",
        "area_type",
        "zip_code",
        "period",
        "start_date",
        "end_date",
        "active_listings",
        "closed_sales",
        "inventory_months",
        "median_price",
        "average_price",
        "median_price_change",
        "avg_days_on_market",
        "list_to_sale_ratio",
    ];
}
