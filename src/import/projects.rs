//! Import major development projects from CSV
//!
//! A project's developer is resolved by name and created on first
//! reference, so projects can be loaded before the developer roster.

use crate::core::normalize::{lowercase_enum, map_status_to_phase, parse_money, safe_string};
use crate::core::reader::RowRecord;
use crate::core::store::DataStore;
use crate::entities::{Developer, Project};

use super::common::{for_each_row, require, ImportTally, RowError};
use super::{ImportContext, ImportResult, SourceFile};

pub(crate) const DEVELOPER_ALIASES: &[&str] = &["Developer", "Developer_Name", "Builder"];

/// Resolve a developer name to its row id, creating a minimal developer
pub(crate) fn resolve_developer(
    store: &DataStore,
    name: Option<&str>,
) -> Result<Option<String>, RowError> {
    let Some(name) = safe_string(name) else {
        return Ok(None);
    };
    let resolution = store.resolve_or_create(&Developer::named(name))?;
    Ok(Some(resolution.id))
}

pub fn project_from_row(row: &RowRecord, developer_id: Option<String>) -> Result<Project, RowError> {
    let name = require(
        row,
        &["Project Name", "Project_Name", "Project", "Name", "Development"],
        "name",
    )?;

    Ok(Project {
        name,
        project_type: lowercase_enum(row.get(&["Type", "Project_Type", "Category"])),
        developer_id,
        area: safe_string(row.get(&["Area", "Location", "Neighborhood", "Submarket"])),
        total_value: parse_money(row.get(&[
            "Investment",
            "Total_Value",
            "Total Investment",
            "Estimated_Cost",
            "Budget",
            "Value",
        ])),
        phase: map_status_to_phase(row.get(&["Status", "Phase", "Project_Status"])),
        description: safe_string(row.get(&["Description", "Details", "Notes"])),
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("projects");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |_, row| {
        // validate the project before creating its developer
        let draft = project_from_row(row, None)?;
        let developer_id = resolve_developer(store, row.get(DEVELOPER_ALIASES))?;
        let project = Project {
            developer_id,
            ..draft
        };
        Ok(store.upsert(&project)?)
    });

    tally.finish()
}
