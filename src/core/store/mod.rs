//! SQLite-backed relational store for imported entities
//!
//! This module provides:
//! - Natural-key upserts (`upsert`) with last-write-wins on the mutable columns
//! - Explicit find-or-create for foreign-key resolution (`resolve_or_create`)
//! - Atomic full-table replacement (`replace_all`)
//! - Count, duplicate and relationship queries used by the auditor
//!
//! Natural keys are not UNIQUE constraints. Uniqueness is maintained by the
//! upsert path so that duplicates loaded by other tools can still be audited.

mod queries;
mod records;
mod schema;
mod types;

pub use records::{Column, Record, RecordRow};
pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;

use crate::entities::EntityKind;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Errors raised by the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database schema version {found} does not match expected {expected}; re-create the database")]
    SchemaVersion { found: i32, expected: i32 },

    #[error("{kind} record has an empty natural key")]
    EmptyKey { kind: EntityKind },
}

/// The relational store backed by SQLite
pub struct DataStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl DataStore {
    /// Open or create a database file, creating parent directories as needed
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        debug!(path = %path.display(), "opened data store");
        Ok(store)
    }

    /// In-memory database, for tests and dry runs
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert or update by natural key.
    ///
    /// When a row with the same key exists, only the record's `UPDATE`
    /// columns (and `updated_at`) are overwritten.
    pub fn upsert<R: Record>(&self, record: &R) -> Result<UpsertOutcome, StoreError> {
        let columns = record.columns();
        let key = key_columns(R::KIND, R::KEY, &columns)?;

        match self.find_id(R::KIND, &key)? {
            Some(id) => {
                let updates: Vec<&Column> = columns
                    .iter()
                    .filter(|(name, _)| R::UPDATE.contains(name))
                    .collect();
                update_row(&self.conn, R::KIND, &id, &updates)?;
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                let id = insert_row(&self.conn, R::KIND, &columns)?;
                Ok(UpsertOutcome::Created(id))
            }
        }
    }

    /// Like [`upsert`](Self::upsert), but NULL incoming values leave the
    /// stored column as it was. Used where several feeds fill in different
    /// columns of the same keyed row.
    pub fn upsert_merge<R: Record>(&self, record: &R) -> Result<UpsertOutcome, StoreError> {
        let columns = record.columns();
        let key = key_columns(R::KIND, R::KEY, &columns)?;

        match self.find_id(R::KIND, &key)? {
            Some(id) => {
                let updates: Vec<&Column> = columns
                    .iter()
                    .filter(|(name, value)| R::UPDATE.contains(name) && *value != Value::Null)
                    .collect();
                update_row(&self.conn, R::KIND, &id, &updates)?;
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                let id = insert_row(&self.conn, R::KIND, &columns)?;
                Ok(UpsertOutcome::Created(id))
            }
        }
    }

    /// Find a record by natural key, or insert the given default.
    ///
    /// An existing row is returned untouched.
    pub fn resolve_or_create<R: Record>(&self, record: &R) -> Result<Resolution, StoreError> {
        let columns = record.columns();
        let key = key_columns(R::KIND, R::KEY, &columns)?;

        if let Some(id) = self.find_id(R::KIND, &key)? {
            return Ok(Resolution { id, created: false });
        }
        let id = insert_row(&self.conn, R::KIND, &columns)?;
        debug!(kind = %R::KIND, id = %id, "created referenced record");
        Ok(Resolution { id, created: true })
    }

    /// Look up a row id by column values. NULL matches NULL.
    pub fn find_id(
        &self,
        kind: EntityKind,
        key: &[(&str, Value)],
    ) -> Result<Option<String>, StoreError> {
        if key.is_empty() {
            return Ok(None);
        }
        let clause = key
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} IS ?{}", col, i + 1))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT id FROM {} WHERE {} ORDER BY rowid LIMIT 1",
            kind.table(),
            clause
        );
        let id: Option<String> = self
            .conn
            .query_row(&sql, params_from_iter(key.iter().map(|(_, v)| v)), |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Look up a row id by a single text column
    pub fn find_id_by(
        &self,
        kind: EntityKind,
        column: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError> {
        self.find_id(kind, &[(column, Value::Text(value.to_string()))])
    }

    /// Set reference columns on an existing row. `None` keeps the stored value.
    pub fn fill_links(
        &self,
        kind: EntityKind,
        id: &str,
        links: &[(&'static str, Option<&str>)],
    ) -> Result<(), StoreError> {
        let columns: Vec<Column> = links
            .iter()
            .filter_map(|(name, target)| target.map(|t| (*name, Value::Text(t.to_string()))))
            .collect();
        if columns.is_empty() {
            return Ok(());
        }
        let refs: Vec<&Column> = columns.iter().collect();
        update_row(&self.conn, kind, id, &refs)
    }

    /// Insert without a natural-key check
    pub fn insert<R: Record>(&self, record: &R) -> Result<String, StoreError> {
        insert_row(&self.conn, R::KIND, &record.columns())
    }

    /// Delete every row of the given tables and insert `rows`, atomically.
    ///
    /// Returns the number of rows inserted.
    pub fn replace_all(
        &mut self,
        kinds: &[EntityKind],
        rows: &[RecordRow],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        for kind in kinds {
            let removed = tx.execute(&format!("DELETE FROM {}", kind.table()), [])?;
            debug!(kind = %kind, removed, "cleared table");
        }
        for row in rows {
            insert_row(&tx, row.kind, &row.columns)?;
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

fn key_columns(
    kind: EntityKind,
    key: &[&str],
    columns: &[Column],
) -> Result<Vec<(&'static str, Value)>, StoreError> {
    let values: Vec<(&'static str, Value)> = columns
        .iter()
        .filter(|(name, _)| key.contains(name))
        .cloned()
        .collect();

    let all_blank = values.iter().all(|(_, v)| match v {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        _ => false,
    });
    if all_blank {
        return Err(StoreError::EmptyKey { kind });
    }
    Ok(values)
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn insert_row(conn: &Connection, kind: EntityKind, columns: &[Column]) -> Result<String, StoreError> {
    let id = Ulid::new().to_string();
    let ts = now();

    let mut names: Vec<&str> = vec!["id", "created_at", "updated_at"];
    names.extend(columns.iter().map(|(n, _)| *n));
    let placeholders = (1..=names.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        kind.table(),
        names.join(", "),
        placeholders
    );

    let mut values: Vec<Value> = vec![Value::Text(id.clone()), Value::Text(ts.clone()), Value::Text(ts)];
    values.extend(columns.iter().map(|(_, v)| v.clone()));
    conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(id)
}

fn update_row(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
    columns: &[&Column],
) -> Result<(), StoreError> {
    let mut sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{} = ?{}", name, i + 1))
        .collect();
    sets.push(format!("updated_at = ?{}", columns.len() + 1));
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        kind.table(),
        sets.join(", "),
        columns.len() + 2
    );

    let mut values: Vec<Value> = columns.iter().map(|(_, v)| v.clone()).collect();
    values.push(Value::Text(now()));
    values.push(Value::Text(id.to_string()));
    conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AreaDemographics, Developer, PopulationProjection, Project, ProjectPhase,
    };
    use tempfile::tempdir;

    fn project(name: &str, value: Option<f64>, phase: ProjectPhase) -> Project {
        Project {
            name: name.to_string(),
            project_type: Some("mixed-use".to_string()),
            developer_id: None,
            area: None,
            total_value: value,
            phase,
            description: None,
        }
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/dir/data.db");
        let store = DataStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));

        // re-opening an initialized database is fine
        drop(store);
        DataStore::open(&path).unwrap();
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let store = DataStore::open_in_memory().unwrap();

        let first = store
            .upsert(&project("Post Houston", Some(100.0), ProjectPhase::Planning))
            .unwrap();
        assert!(first.is_created());

        let second = store
            .upsert(&project("Post Houston", Some(250.0), ProjectPhase::Completed))
            .unwrap();
        assert_eq!(second, UpsertOutcome::Updated(first.id().to_string()));
        assert_eq!(store.count(EntityKind::Project).unwrap(), 1);

        let stored = store.list::<Project>().unwrap();
        assert_eq!(stored[0].record.total_value, Some(250.0));
        assert_eq!(stored[0].record.phase, ProjectPhase::Completed);
    }

    #[test]
    fn test_upsert_leaves_non_update_columns() {
        let store = DataStore::open_in_memory().unwrap();
        let mut dev = Developer::named("Perry Homes");
        dev.company_type = Some("builder".to_string());
        dev.active_projects = 3;
        store.upsert(&dev).unwrap();

        let mut again = Developer::named("Perry Homes");
        again.company_type = Some("reit".to_string());
        again.active_projects = 5;
        store.upsert(&again).unwrap();

        let stored = store.list::<Developer>().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.active_projects, 5);
        assert_eq!(stored[0].record.company_type.as_deref(), Some("builder"));
    }

    #[test]
    fn test_upsert_merge_keeps_stored_values_for_nulls() {
        let store = DataStore::open_in_memory().unwrap();
        store
            .upsert_merge(&project("Post Houston", Some(100.0), ProjectPhase::Planning))
            .unwrap();
        let mut later = project("Post Houston", None, ProjectPhase::Completed);
        later.project_type = None;
        store.upsert_merge(&later).unwrap();

        let stored = store.list::<Project>().unwrap();
        assert_eq!(stored[0].record.total_value, Some(100.0));
        assert_eq!(stored[0].record.project_type.as_deref(), Some("mixed-use"));
        assert_eq!(stored[0].record.phase, ProjectPhase::Completed);
    }

    #[test]
    fn test_fill_links_sets_only_found_targets() {
        let store = DataStore::open_in_memory().unwrap();
        let dev = store.upsert(&Developer::named("Hines")).unwrap();
        let project = store
            .upsert(&project("Post Houston", None, ProjectPhase::Planning))
            .unwrap();

        store
            .fill_links(EntityKind::Project, project.id(), &[("developer_id", Some(dev.id()))])
            .unwrap();
        store
            .fill_links(EntityKind::Project, project.id(), &[("developer_id", None)])
            .unwrap();

        let stored = store.list::<Project>().unwrap();
        assert_eq!(stored[0].record.developer_id.as_deref(), Some(dev.id()));
    }

    #[test]
    fn test_resolve_or_create() {
        let store = DataStore::open_in_memory().unwrap();
        let mut dev = Developer::named("Hines");
        dev.active_projects = 9;
        let existing = store.upsert(&dev).unwrap();

        let found = store.resolve_or_create(&Developer::named("Hines")).unwrap();
        assert_eq!(found.id, existing.id());
        assert!(!found.created);
        // untouched
        assert_eq!(store.list::<Developer>().unwrap()[0].record.active_projects, 9);

        let made = store.resolve_or_create(&Developer::named("Howard Hughes")).unwrap();
        assert!(made.created);
        assert_eq!(store.count(EntityKind::Developer).unwrap(), 2);
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let store = DataStore::open_in_memory().unwrap();
        let err = store.upsert(&Developer::named("  ")).unwrap_err();
        assert!(matches!(err, StoreError::EmptyKey { .. }));
        assert_eq!(store.count(EntityKind::Developer).unwrap(), 0);
    }

    #[test]
    fn test_find_id_matches_null() {
        let store = DataStore::open_in_memory().unwrap();
        let id = store.insert(&project("Levy Park", None, ProjectPhase::Planning)).unwrap();
        let found = store
            .find_id(
                EntityKind::Project,
                &[("name", Value::Text("Levy Park".into())), ("area", Value::Null)],
            )
            .unwrap();
        assert_eq!(found, Some(id));
        assert_eq!(
            store.find_id_by(EntityKind::Project, "name", "Nowhere").unwrap(),
            None
        );
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let mut store = DataStore::open_in_memory().unwrap();
        let demo = |n: &str| AreaDemographics {
            neighborhood: n.to_string(),
            total_population: 1000,
            median_income: None,
            hispanic_percent: None,
            asian_percent: None,
            black_percent: None,
            white_percent: None,
            foreign_born_percent: None,
            report_year: 2025,
            source: "test".to_string(),
        };
        let proj = PopulationProjection::against_base("Houston", "city", 2030, 10, None, "test");
        let kinds = [EntityKind::AreaDemographics, EntityKind::PopulationProjection];

        store
            .replace_all(&kinds, &[demo("Midtown").to_row(), demo("Heights").to_row(), proj.to_row()])
            .unwrap();
        assert_eq!(store.count(EntityKind::AreaDemographics).unwrap(), 2);

        let inserted = store.replace_all(&kinds, &[demo("Montrose").to_row()]).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count(EntityKind::AreaDemographics).unwrap(), 1);
        assert_eq!(store.count(EntityKind::PopulationProjection).unwrap(), 0);
    }
}
