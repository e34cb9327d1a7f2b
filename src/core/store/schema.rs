//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{DataStore, StoreError, SCHEMA_VERSION};

impl DataStore {
    /// Create tables if they do not exist yet and check the schema version
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS developers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                company_type TEXT,
                primary_focus TEXT,
                active_projects INTEGER NOT NULL DEFAULT 0,
                average_price REAL,
                total_value REAL,
                primary_areas TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_developers_name ON developers(name);

            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                project_type TEXT,
                developer_id TEXT,
                area TEXT,
                total_value REAL,
                phase TEXT NOT NULL DEFAULT 'planning',
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_name ON projects(name);
            CREATE INDEX IF NOT EXISTS idx_projects_developer ON projects(developer_id);

            CREATE TABLE IF NOT EXISTS properties (
                id TEXT PRIMARY KEY,
                address TEXT NOT NULL,
                city TEXT,
                zip_code TEXT,
                property_type TEXT,
                list_price REAL,
                sold_price REAL,
                square_feet INTEGER,
                year_built INTEGER,
                bedrooms INTEGER,
                bathrooms REAL,
                neighborhood TEXT,
                status TEXT,
                developer_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_properties_key ON properties(address, city, zip_code);
            CREATE INDEX IF NOT EXISTS idx_properties_developer ON properties(developer_id);

            CREATE TABLE IF NOT EXISTS permits (
                id TEXT PRIMARY KEY,
                permit_number TEXT NOT NULL,
                permit_type TEXT,
                work_type TEXT,
                address TEXT,
                zip_code TEXT,
                declared_value REAL,
                application_date TEXT,
                status TEXT,
                contractor_name TEXT,
                owner_name TEXT,
                description TEXT,
                property_id TEXT,
                project_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_permits_number ON permits(permit_number);

            CREATE TABLE IF NOT EXISTS market_metrics (
                id TEXT PRIMARY KEY,
                area_name TEXT NOT NULL,
                area_type TEXT,
                zip_code TEXT,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                active_listings INTEGER,
                closed_sales INTEGER,
                inventory_months REAL,
                median_price REAL,
                average_price REAL,
                median_price_change REAL,
                avg_days_on_market INTEGER,
                list_to_sale_ratio REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_market_metrics_key
                ON market_metrics(area_name, period, start_date);

            CREATE TABLE IF NOT EXISTS construction_activity (
                id TEXT PRIMARY KEY,
                permit_number TEXT NOT NULL,
                permit_type TEXT,
                sub_type TEXT,
                address TEXT,
                zip_code TEXT,
                neighborhood TEXT,
                project_name TEXT,
                developer TEXT,
                contractor TEXT,
                estimated_cost REAL,
                square_footage INTEGER,
                units INTEGER,
                permit_date TEXT,
                status TEXT,
                source TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_construction_number
                ON construction_activity(permit_number);

            CREATE TABLE IF NOT EXISTS market_intelligence (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                data_point TEXT NOT NULL,
                value TEXT,
                numeric_value REAL,
                location TEXT NOT NULL,
                zip_code TEXT,
                data_date TEXT,
                source TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_market_intelligence_key
                ON market_intelligence(category, data_point, location, source);

            CREATE TABLE IF NOT EXISTS quality_of_life (
                id TEXT PRIMARY KEY,
                zip_code TEXT NOT NULL,
                neighborhood TEXT,
                data_date TEXT NOT NULL,
                crime_rate REAL,
                safety_score REAL,
                walk_score REAL,
                transit_score REAL,
                bike_score REAL,
                schools_count INTEGER,
                avg_school_rating REAL,
                parks_count INTEGER,
                source TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quality_of_life_key
                ON quality_of_life(zip_code, data_date);

            CREATE TABLE IF NOT EXISTS area_demographics (
                id TEXT PRIMARY KEY,
                neighborhood TEXT NOT NULL,
                total_population INTEGER NOT NULL,
                median_income REAL,
                hispanic_percent REAL,
                asian_percent REAL,
                black_percent REAL,
                white_percent REAL,
                foreign_born_percent REAL,
                report_year INTEGER NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS population_projections (
                id TEXT PRIMARY KEY,
                area TEXT NOT NULL,
                area_type TEXT NOT NULL,
                projection_year INTEGER NOT NULL,
                projected_population INTEGER NOT NULL,
                growth_rate REAL,
                growth_absolute INTEGER,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        let found: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match found {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(v) if v != SCHEMA_VERSION => {
                return Err(StoreError::SchemaVersion {
                    found: v,
                    expected: SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }

        Ok(())
    }
}
