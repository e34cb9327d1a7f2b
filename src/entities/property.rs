//! Property entity - individual listings and sales

use serde::{Deserialize, Serialize};

/// A property, keyed by (address, city, zip code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
}

impl Property {
    pub const FIELDS: &'static [&'static str] = &[
        "address",
        "city",
        "zip_code",
        "property_type",
        "list_price",
        "sold_price",
        "square_feet",
        "year_built",
        "bedrooms",
        "bathrooms",
        "neighborhood",
        "status",
        "developer_id",
    ];
}
