//! Permit entity - building permits from city exports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A building permit, keyed by permit number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permit {
    pub permit_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Permit {
    pub const FIELDS: &'static [&'static str] = &[
        "permit_number",
        "permit_type",
        "work_type",
        "address",
        "zip_code",
        "declared_value",
        "application_date",
        "status",
        "contractor_name",
        "owner_name",
        "description",
        "property_id",
        "project_id",
    ];
}

/// Derive a stable permit number for a row that lacks one.
///
/// The number is a digest of the identifying parts, so re-importing the same
/// row yields the same number and the upsert stays idempotent.
pub fn synthesize_permit_number(prefix: &str, parts: &[Option<&str>]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.unwrap_or_default().trim().to_lowercase().as_bytes());
        hasher.update([0x1f]);
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", prefix, &digest[..12].to_uppercase())
}
