//! Import property listings and sales from CSV

use crate::core::normalize::{lowercase_enum, parse_money, safe_float, safe_int, safe_string};
use crate::core::reader::RowRecord;
use crate::entities::Property;

use super::common::{for_each_row, require, ImportTally, RowError};
use super::projects::{resolve_developer, DEVELOPER_ALIASES};
use super::{ImportContext, ImportResult, SourceFile};

const DEFAULT_CITY: &str = "Houston";

pub(crate) const ZIP_ALIASES: &[&str] = &["ZIP Code", "ZIP_Code", "Zip", "ZipCode", "Zip_Code"];

pub fn property_from_row(row: &RowRecord, developer_id: Option<String>) -> Result<Property, RowError> {
    let address = require(
        row,
        &["Address", "Property_Address", "Street_Address", "Location"],
        "address",
    )?;

    Ok(Property {
        address,
        city: safe_string(row.get(&["City"])).or_else(|| Some(DEFAULT_CITY.to_string())),
        zip_code: safe_string(row.get(ZIP_ALIASES)),
        property_type: lowercase_enum(row.get(&["Property_Type", "Property Type", "Type"])),
        list_price: parse_money(row.get(&["List_Price", "List Price", "Price", "Listing_Price"])),
        sold_price: parse_money(row.get(&["Sold_Price", "Sold Price", "Sale_Price"])),
        square_feet: safe_int(row.get(&["Square_Feet", "Square Feet", "Sqft", "SF", "Living_Area"])),
        year_built: safe_int(row.get(&["Year_Built", "Year Built"])),
        bedrooms: safe_int(row.get(&["Bedrooms", "Beds"])),
        bathrooms: safe_float(row.get(&["Bathrooms", "Baths"])),
        neighborhood: safe_string(row.get(&["Neighborhood", "Subdivision", "Area"])),
        status: lowercase_enum(row.get(&["Status", "Listing_Status"])),
        developer_id,
    })
}

pub fn import(ctx: &mut ImportContext<'_>, files: &[SourceFile]) -> ImportResult {
    let mut tally = ImportTally::new("properties");
    let store = &*ctx.store;

    for_each_row(&mut tally, files, |_, row| {
        let draft = property_from_row(row, None)?;
        let developer_id = resolve_developer(store, row.get(DEVELOPER_ALIASES))?;
        Ok(store.upsert(&Property {
            developer_id,
            ..draft
        })?)
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
    fn test_composite_key_upsert() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("properties.csv");
        fs::write(
            &path,
            "Address,City,ZIP Code,List Price,Square Feet,Year Built,Builder\n\
             12 Elm St,Houston,77008,\"$450,000\",2100,2019,Perry Homes\n\
             12 Elm St,Houston,77009,\"$300,000\",1500,1955,\n\
             12 Elm St,Houston,77008,\"$440,000\",2100,2019,Perry Homes\n",
        )
        .unwrap();

        let mut store = DataStore::open_in_memory().unwrap();
        let mut ctx = ImportContext::new(&mut store, tmp.path().to_path_buf(), &Config::default());
        let result = import(&mut ctx, &[SourceFile::new(path)]);

        assert!(result.success);
        assert_eq!(result.records_created, 2);
        assert_eq!(result.records_updated, 1);
        assert_eq!(store.count(EntityKind::Property).unwrap(), 2);
        assert_eq!(store.count(EntityKind::Developer).unwrap(), 1);

        let props = store.list::<Property>().unwrap();
        assert_eq!(props[0].record.list_price, Some(440_000.0));
        assert!(props[0].record.developer_id.is_some());
        assert!(props[1].record.developer_id.is_none());
    }

    #[test]
    fn test_city_defaults_to_houston() {
        let row = RowRecord::from_pairs(2, &[("Address", "5 Main St"), ("Beds", "three")]);
        let prop = property_from_row(&row, None).unwrap();
        assert_eq!(prop.city.as_deref(), Some("Houston"));
        assert_eq!(prop.bedrooms, None);
    }
}
