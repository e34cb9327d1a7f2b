//! Mapping between entity structs and table rows
//!
//! Every entity that the store persists implements [`Record`]: its table,
//! natural key, the columns a re-import overwrites, and conversions to and
//! from SQLite values.

use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::entities::{
    AreaDemographics, ConstructionActivity, Developer, EntityKind, MarketIntelligence,
    MarketMetrics, Permit, PopulationProjection, Project, Property, QualityOfLife,
};

/// A column name paired with the value to write
pub type Column = (&'static str, Value);

/// An entity that maps onto one table
pub trait Record: Sized {
    const KIND: EntityKind;

    /// Natural-key columns identifying a logical record
    const KEY: &'static [&'static str];

    /// Columns overwritten when a row with the same natural key exists
    const UPDATE: &'static [&'static str];

    /// All data columns with their values, in table order
    fn columns(&self) -> Vec<Column>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn to_row(&self) -> RecordRow {
        RecordRow {
            kind: Self::KIND,
            columns: self.columns(),
        }
    }
}

/// Type-erased row, used where records of several kinds travel together
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub kind: EntityKind,
    pub columns: Vec<Column>,
}

const DATE_FMT: &str = "%Y-%m-%d";

fn text(v: &Option<String>) -> Value {
    v.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn real(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

fn int(v: Option<i64>) -> Value {
    v.map(Value::Integer).unwrap_or(Value::Null)
}

fn date(v: Option<NaiveDate>) -> Value {
    v.map(|d| Value::Text(d.format(DATE_FMT).to_string()))
        .unwrap_or(Value::Null)
}

fn json(v: &serde_json::Value) -> Value {
    Value::Text(v.to_string())
}

fn get_date(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FMT)
            .map(Some)
            .map_err(|e| {
                let idx = row.as_ref().column_index(col).unwrap_or_default();
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            }),
    }
}

fn get_required_date(row: &Row<'_>, col: &str) -> rusqlite::Result<NaiveDate> {
    get_date(row, col)?.ok_or_else(|| rusqlite::Error::InvalidColumnName(col.to_string()))
}

fn get_json(row: &Row<'_>, col: &str) -> rusqlite::Result<serde_json::Value> {
    let raw: Option<String> = row.get(col)?;
    Ok(raw
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default())
}

impl Record for Developer {
    const KIND: EntityKind = EntityKind::Developer;
    const KEY: &'static [&'static str] = &["name"];
    const UPDATE: &'static [&'static str] = &["active_projects", "average_price"];

    fn columns(&self) -> Vec<Column> {
        let areas = serde_json::to_string(&self.primary_areas).unwrap_or_else(|_| "[]".into());
        vec![
            ("name", Value::Text(self.name.clone())),
            ("company_type", text(&self.company_type)),
            ("primary_focus", text(&self.primary_focus)),
            ("active_projects", Value::Integer(self.active_projects)),
            ("average_price", real(self.average_price)),
            ("total_value", real(self.total_value)),
            ("primary_areas", Value::Text(areas)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let areas: Option<String> = row.get("primary_areas")?;
        Ok(Developer {
            name: row.get("name")?,
            company_type: row.get("company_type")?,
            primary_focus: row.get("primary_focus")?,
            active_projects: row.get("active_projects")?,
            average_price: row.get("average_price")?,
            total_value: row.get("total_value")?,
            primary_areas: areas
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
        })
    }
}

impl Record for Project {
    const KIND: EntityKind = EntityKind::Project;
    const KEY: &'static [&'static str] = &["name"];
    const UPDATE: &'static [&'static str] = &[
        "project_type",
        "developer_id",
        "area",
        "total_value",
        "phase",
        "description",
    ];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("name", Value::Text(self.name.clone())),
            ("project_type", text(&self.project_type)),
            ("developer_id", text(&self.developer_id)),
            ("area", text(&self.area)),
            ("total_value", real(self.total_value)),
            ("phase", Value::Text(self.phase.as_str().to_string())),
            ("description", text(&self.description)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let phase: String = row.get("phase")?;
        Ok(Project {
            name: row.get("name")?,
            project_type: row.get("project_type")?,
            developer_id: row.get("developer_id")?,
            area: row.get("area")?,
            total_value: row.get("total_value")?,
            phase: phase.parse().unwrap_or_default(),
            description: row.get("description")?,
        })
    }
}

impl Record for Property {
    const KIND: EntityKind = EntityKind::Property;
    const KEY: &'static [&'static str] = &["address", "city", "zip_code"];
    const UPDATE: &'static [&'static str] = &[
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

    fn columns(&self) -> Vec<Column> {
        vec![
            ("address", Value::Text(self.address.clone())),
            ("city", text(&self.city)),
            ("zip_code", text(&self.zip_code)),
            ("property_type", text(&self.property_type)),
            ("list_price", real(self.list_price)),
            ("sold_price", real(self.sold_price)),
            ("square_feet", int(self.square_feet)),
            ("year_built", int(self.year_built)),
            ("bedrooms", int(self.bedrooms)),
            ("bathrooms", real(self.bathrooms)),
            ("neighborhood", text(&self.neighborhood)),
            ("status", text(&self.status)),
            ("developer_id", text(&self.developer_id)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Property {
            address: row.get("address")?,
            city: row.get("city")?,
            zip_code: row.get("zip_code")?,
            property_type: row.get("property_type")?,
            list_price: row.get("list_price")?,
            sold_price: row.get("sold_price")?,
            square_feet: row.get("square_feet")?,
            year_built: row.get("year_built")?,
            bedrooms: row.get("bedrooms")?,
            bathrooms: row.get("bathrooms")?,
            neighborhood: row.get("neighborhood")?,
            status: row.get("status")?,
            developer_id: row.get("developer_id")?,
        })
    }
}

impl Record for Permit {
    const KIND: EntityKind = EntityKind::Permit;
    const KEY: &'static [&'static str] = &["permit_number"];
    const UPDATE: &'static [&'static str] = &["declared_value", "status"];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("permit_number", Value::Text(self.permit_number.clone())),
            ("permit_type", text(&self.permit_type)),
            ("work_type", text(&self.work_type)),
            ("address", text(&self.address)),
            ("zip_code", text(&self.zip_code)),
            ("declared_value", real(self.declared_value)),
            ("application_date", date(self.application_date)),
            ("status", text(&self.status)),
            ("contractor_name", text(&self.contractor_name)),
            ("owner_name", text(&self.owner_name)),
            ("description", text(&self.description)),
            ("property_id", text(&self.property_id)),
            ("project_id", text(&self.project_id)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Permit {
            permit_number: row.get("permit_number")?,
            permit_type: row.get("permit_type")?,
            work_type: row.get("work_type")?,
            address: row.get("address")?,
            zip_code: row.get("zip_code")?,
            declared_value: row.get("declared_value")?,
            application_date: get_date(row, "application_date")?,
            status: row.get("status")?,
            contractor_name: row.get("contractor_name")?,
            owner_name: row.get("owner_name")?,
            description: row.get("description")?,
            property_id: row.get("property_id")?,
            project_id: row.get("project_id")?,
        })
    }
}

impl Record for MarketMetrics {
    const KIND: EntityKind = EntityKind::MarketMetrics;
    const KEY: &'static [&'static str] = &["area_name", "period", "start_date"];
    const UPDATE: &'static [&'static str] = &[
        "area_type",
        "zip_code",
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

    fn columns(&self) -> Vec<Column> {
        vec![
            ("area_name", Value::Text(self.area_name.clone())),
            ("area_type", text(&self.area_type)),
            ("zip_code", text(&self.zip_code)),
            ("period", Value::Text(self.period.clone())),
            ("start_date", date(Some(self.start_date))),
            ("end_date", date(self.end_date)),
            ("active_listings", int(self.active_listings)),
            ("closed_sales", int(self.closed_sales)),
            ("inventory_months", real(self.inventory_months)),
            ("median_price", real(self.median_price)),
            ("average_price", real(self.average_price)),
            ("median_price_change", real(self.median_price_change)),
            ("avg_days_on_market", int(self.avg_days_on_market)),
            ("list_to_sale_ratio", real(self.list_to_sale_ratio)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MarketMetrics {
            area_name: row.get("area_name")?,
            area_type: row.get("area_type")?,
            zip_code: row.get("zip_code")?,
            period: row.get("period")?,
            start_date: get_required_date(row, "start_date")?,
            end_date: get_date(row, "end_date")?,
            active_listings: row.get("active_listings")?,
            closed_sales: row.get("closed_sales")?,
            inventory_months: row.get("inventory_months")?,
            median_price: row.get("median_price")?,
            average_price: row.get("average_price")?,
            median_price_change: row.get("median_price_change")?,
            avg_days_on_market: row.get("avg_days_on_market")?,
            list_to_sale_ratio: row.get("list_to_sale_ratio")?,
        })
    }
}

impl Record for ConstructionActivity {
    const KIND: EntityKind = EntityKind::ConstructionActivity;
    const KEY: &'static [&'static str] = &["permit_number"];
    const UPDATE: &'static [&'static str] = &[
        "permit_type",
        "sub_type",
        "address",
        "zip_code",
        "neighborhood",
        "project_name",
        "developer",
        "contractor",
        "estimated_cost",
        "square_footage",
        "units",
        "permit_date",
        "status",
        "source",
        "payload",
    ];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("permit_number", Value::Text(self.permit_number.clone())),
            ("permit_type", text(&self.permit_type)),
            ("sub_type", text(&self.sub_type)),
            ("address", text(&self.address)),
            ("zip_code", text(&self.zip_code)),
            ("neighborhood", text(&self.neighborhood)),
            ("project_name", text(&self.project_name)),
            ("developer", text(&self.developer)),
            ("contractor", text(&self.contractor)),
            ("estimated_cost", real(self.estimated_cost)),
            ("square_footage", int(self.square_footage)),
            ("units", int(self.units)),
            ("permit_date", date(self.permit_date)),
            ("status", text(&self.status)),
            ("source", Value::Text(self.source.clone())),
            ("payload", json(&self.payload)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ConstructionActivity {
            permit_number: row.get("permit_number")?,
            permit_type: row.get("permit_type")?,
            sub_type: row.get("sub_type")?,
            address: row.get("address")?,
            zip_code: row.get("zip_code")?,
            neighborhood: row.get("neighborhood")?,
            project_name: row.get("project_name")?,
            developer: row.get("developer")?,
            contractor: row.get("contractor")?,
            estimated_cost: row.get("estimated_cost")?,
            square_footage: row.get("square_footage")?,
            units: row.get("units")?,
            permit_date: get_date(row, "permit_date")?,
            status: row.get("status")?,
            source: row.get("source")?,
            payload: get_json(row, "payload")?,
        })
    }
}

impl Record for MarketIntelligence {
    const KIND: EntityKind = EntityKind::MarketIntelligence;
    const KEY: &'static [&'static str] = &["category", "data_point", "location", "source"];
    const UPDATE: &'static [&'static str] =
        &["value", "numeric_value", "zip_code", "data_date", "payload"];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("category", Value::Text(self.category.clone())),
            ("data_point", Value::Text(self.data_point.clone())),
            ("value", text(&self.value)),
            ("numeric_value", real(self.numeric_value)),
            ("location", Value::Text(self.location.clone())),
            ("zip_code", text(&self.zip_code)),
            ("data_date", date(self.data_date)),
            ("source", Value::Text(self.source.clone())),
            ("payload", json(&self.payload)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MarketIntelligence {
            category: row.get("category")?,
            data_point: row.get("data_point")?,
            value: row.get("value")?,
            numeric_value: row.get("numeric_value")?,
            location: row.get("location")?,
            zip_code: row.get("zip_code")?,
            data_date: get_date(row, "data_date")?,
            source: row.get("source")?,
            payload: get_json(row, "payload")?,
        })
    }
}

impl Record for QualityOfLife {
    const KIND: EntityKind = EntityKind::QualityOfLife;
    const KEY: &'static [&'static str] = &["zip_code", "data_date"];
    const UPDATE: &'static [&'static str] = &[
        "neighborhood",
        "crime_rate",
        "safety_score",
        "walk_score",
        "transit_score",
        "bike_score",
        "schools_count",
        "avg_school_rating",
        "parks_count",
        "source",
        "payload",
    ];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("zip_code", Value::Text(self.zip_code.clone())),
            ("neighborhood", text(&self.neighborhood)),
            ("data_date", date(Some(self.data_date))),
            ("crime_rate", real(self.crime_rate)),
            ("safety_score", real(self.safety_score)),
            ("walk_score", real(self.walk_score)),
            ("transit_score", real(self.transit_score)),
            ("bike_score", real(self.bike_score)),
            ("schools_count", int(self.schools_count)),
            ("avg_school_rating", real(self.avg_school_rating)),
            ("parks_count", int(self.parks_count)),
            ("source", Value::Text(self.source.clone())),
            ("payload", json(&self.payload)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(QualityOfLife {
            zip_code: row.get("zip_code")?,
            neighborhood: row.get("neighborhood")?,
            data_date: get_required_date(row, "data_date")?,
            crime_rate: row.get("crime_rate")?,
            safety_score: row.get("safety_score")?,
            walk_score: row.get("walk_score")?,
            transit_score: row.get("transit_score")?,
            bike_score: row.get("bike_score")?,
            schools_count: row.get("schools_count")?,
            avg_school_rating: row.get("avg_school_rating")?,
            parks_count: row.get("parks_count")?,
            source: row.get("source")?,
            payload: get_json(row, "payload")?,
        })
    }
}

impl Record for AreaDemographics {
    const KIND: EntityKind = EntityKind::AreaDemographics;
    const KEY: &'static [&'static str] = &["neighborhood", "report_year"];
    const UPDATE: &'static [&'static str] = &[
        "total_population",
        "median_income",
        "hispanic_percent",
        "asian_percent",
        "black_percent",
        "white_percent",
        "foreign_born_percent",
        "source",
    ];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("neighborhood", Value::Text(self.neighborhood.clone())),
            ("total_population", Value::Integer(self.total_population)),
            ("median_income", real(self.median_income)),
            ("hispanic_percent", real(self.hispanic_percent)),
            ("asian_percent", real(self.asian_percent)),
            ("black_percent", real(self.black_percent)),
            ("white_percent", real(self.white_percent)),
            ("foreign_born_percent", real(self.foreign_born_percent)),
            ("report_year", Value::Integer(self.report_year)),
            ("source", Value::Text(self.source.clone())),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AreaDemographics {
            neighborhood: row.get("neighborhood")?,
            total_population: row.get("total_population")?,
            median_income: row.get("median_income")?,
            hispanic_percent: row.get("hispanic_percent")?,
            asian_percent: row.get("asian_percent")?,
            black_percent: row.get("black_percent")?,
            white_percent: row.get("white_percent")?,
            foreign_born_percent: row.get("foreign_born_percent")?,
            report_year: row.get("report_year")?,
            source: row.get("source")?,
        })
    }
}

impl Record for PopulationProjection {
    const KIND: EntityKind = EntityKind::PopulationProjection;
    const KEY: &'static [&'static str] = &["area", "projection_year"];
    const UPDATE: &'static [&'static str] = &[
        "area_type",
        "projected_population",
        "growth_rate",
        "growth_absolute",
        "source",
    ];

    fn columns(&self) -> Vec<Column> {
        vec![
            ("area", Value::Text(self.area.clone())),
            ("area_type", Value::Text(self.area_type.clone())),
            ("projection_year", Value::Integer(self.projection_year)),
            ("projected_population", Value::Integer(self.projected_population)),
            ("growth_rate", real(self.growth_rate)),
            ("growth_absolute", int(self.growth_absolute)),
            ("source", Value::Text(self.source.clone())),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PopulationProjection {
            area: row.get("area")?,
            area_type: row.get("area_type")?,
            projection_year: row.get("projection_year")?,
            projected_population: row.get("projected_population")?,
            growth_rate: row.get("growth_rate")?,
            growth_absolute: row.get("growth_absolute")?,
            source: row.get("source")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[Column]) -> Vec<&'static str> {
        cols.iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn test_columns_match_entity_fields() {
        let dev = Developer::named("Hines");
        assert_eq!(names(&dev.columns()), Developer::FIELDS);

        let permit = Permit {
            permit_number: "P-1".into(),
            permit_type: None,
            work_type: None,
            address: None,
            zip_code: None,
            declared_value: None,
            application_date: None,
            status: None,
            contractor_name: None,
            owner_name: None,
            description: None,
            property_id: None,
            project_id: None,
        };
        assert_eq!(names(&permit.columns()), Permit::FIELDS);
    }

    #[test]
    fn test_key_and_update_columns_are_fields() {
        fn check<R: Record>(fields: &[&str]) {
            for col in R::KEY.iter().chain(R::UPDATE.iter()) {
                assert!(fields.contains(col), "{} not a field of {}", col, R::KIND);
            }
        }
        check::<Developer>(Developer::FIELDS);
        check::<Project>(Project::FIELDS);
        check::<Property>(Property::FIELDS);
        check::<Permit>(Permit::FIELDS);
        check::<MarketMetrics>(MarketMetrics::FIELDS);
        check::<ConstructionActivity>(ConstructionActivity::FIELDS);
        check::<MarketIntelligence>(MarketIntelligence::FIELDS);
        check::<QualityOfLife>(QualityOfLife::FIELDS);
        check::<AreaDemographics>(AreaDemographics::FIELDS);
        check::<PopulationProjection>(PopulationProjection::FIELDS);
    }
}
