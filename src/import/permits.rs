//! Import building permits from CSV
//!
//! Permits link to properties and projects by lookup only; an unknown
//! address or project name leaves the reference empty. Re-importing a
//! permit fills in a link whose lookup now succeeds and keeps one that no
//! longer does.

use rusqlite::types::Value;

use crate::core::normalize::{lowercase_enum, parse_date, parse_money, safe_string};
use crate::core::reader::RowRecord;
use crate::core::store::DataStore;
use crate::entities::permit::synthesize_permit_number;
use crate::entities::{EntityKind, Permit};

use super::common::{for_each_row, ImportTally, RowError};
use super::properties::ZIP_ALIASES;
use super::{ImportContext, ImportResult, SourceFile};

const NUMBER_ALIASES: &[&str] = &["Permit Number", "Permit_Number", "Permit_No", "Permit #"];
const ADDRESS_ALIASES: &[&str] = &["Address", "Location", "Site_Address"];
const PROJECT_ALIASES: &[&str] = &["Project", "Project_Name", "Project Name"];

/// Map a row to a permit. Foreign keys are filled in by [`link`].
pub fn permit_from_row(row: &RowRecord) -> Result<Permit, RowError> {
    let address = safe_string(row.get(ADDRESS_ALIASES));
    let description = safe_string(row.get(&["Description", "Work_Description", "Scope"]));
    let issue_date_raw = row.get(&["Issue Date", "Issue_Date", "Application_Date", "Date"]);
    let permit_type = lowercase_enum(row.get(&["Type", "Permit_Type", "Permit Type"]));

    let permit_number = match safe_string(row.get(NUMBER_ALIASES)) {
        Some(n) => n,
        None if address.is_some() || description.is_some() => synthesize_permit_number(
            "AUTO",
            &[
                address.as_deref(),
                row.get(ZIP_ALIASES),
                permit_type.as_deref(),
                issue_date_raw,
                description.as_deref(),
            ],
        ),
        None => return Err(RowError::MissingField("permit_number")),
    };

    Ok(Permit {
        permit_number,
        permit_type,
        work_type: lowercase_enum(row.get(&["Work_Type", "Work Type", "Sub_Type"])),
        address,
        zip_code: safe_string(row.get(ZIP_ALIASES)),
        declared_value: parse_money(row.get(&["Value", "Declared_Value", "Valuation", "Estimated_Cost"])),
        application_date: parse_date(issue_date_raw),
        status: lowercase_enum(row.get(&["Status", "Permit_Status"])),
        contractor_name: safe_string(row.get(&["Contractor", "Contractor_Name"])),
        owner_name: safe_string(row.get(&["Owner", "Owner_Name"])),
        description,
        property_id: None,
        project_id: None,
    })
}

/// Attach property and project ids found by lookup
pub fn link(store: &DataStore, row: &RowRecord, permit: &mut Permit) -> Result<(), RowError> {
    if let Some(address) = permit.address.as_deref() {
        let mut key = vec![("address", Value::Text(address.to_string()))];
        if let Some(zip) = permit.zip_code.as_deref() {
            key.push(("zip_code", Value::Text(zip.to_string())));
        }
        permit.property_id = store.find_id(EntityKind::Property, &key)?;
    }
    if let Some(project) = safe_string(row.get(PROJECT_ALIASES)) {
        permit.project_id = store.find_id_by(EntityKind::Project, "name", &project)?;
    }
    Ok(())
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("permits");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |_, row| {
        let mut permit = permit_from_row(row)?;
        link(store, row, &mut permit)?;
        let outcome = store.upsert(&permit)?;
        if !outcome.is_created() {
            store.fill_links(
                EntityKind::Permit,
                outcome.id(),
                &[
                    ("property_id", permit.property_id.as_deref()),
                    ("project_id", permit.project_id.as_deref()),
                ],
            )?;
        }
        Ok(outcome)
    });

    tally.finish()
}
