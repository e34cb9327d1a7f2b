//! Import developers from CSV

use crate::core::normalize::{lowercase_enum, parse_money, safe_int, split_list};
use crate::core::reader::RowRecord;
use crate::entities::Developer;

use super::common::{for_each_row, require, ImportTally, RowError};
use super::{ImportContext, ImportResult, SourceFile};

/// Map one CSV row to a developer
pub fn developer_from_row(row: &RowRecord) -> Result<Developer, RowError> {
    let name = require(row, &["Developer", "Developer_Name", "Company", "Name"], "name")?;

    Ok(Developer {
        name,
        company_type: lowercase_enum(row.get(&["Type", "Company_Type", "Developer_Type"])),
        primary_focus: lowercase_enum(row.get(&[
            "Primary_Focus",
            "Focus",
            "Specialization",
            "Type",
        ])),
        active_projects: safe_int(row.get(&[
            "January 2025 Permits",
            "Active_Projects",
            "Active Projects",
            "Permits",
        ]))
        .unwrap_or(0),
        average_price: parse_money(row.get(&[
            "Average Home Value ($)",
            "Average_Price",
            "Avg_Price",
            "Average Home Value",
        ])),
        total_value: parse_money(row.get(&["Total_Value", "Portfolio_Value", "Total Value"])),
        primary_areas: split_list(row.get(&[
            "Primary_Areas",
            "Areas",
            "Markets",
            "Major Projects 2024",
        ])),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("developers");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |_, row| {
        let developer = developer_from_row(row)?;
        Ok(store.upsert(&developer)?)
    });

    tally.finish()
}
