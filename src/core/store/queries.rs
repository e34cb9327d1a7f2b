//! Read-side queries used by the auditor and the status command

use rusqlite::params;

use super::{DataStore, DuplicateGroup, Record, Stored, StoreError, TableCount};
use crate::entities::EntityKind;

impl DataStore {
    /// Row count of one table
    pub fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
        let n = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Row counts for every table, in dependency order
    pub fn counts(&self) -> Result<Vec<TableCount>, StoreError> {
        EntityKind::all()
            .iter()
            .map(|&kind| {
                Ok(TableCount {
                    kind,
                    rows: self.count(kind)?,
                })
            })
            .collect()
    }

    /// Every stored record of one entity type, in insertion order
    pub fn list<R: Record>(&self) -> Result<Vec<Stored<R>>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY rowid",
            R::KIND.table()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(Stored {
                id: row.get("id")?,
                record: R::from_row(row)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Number of key values shared by more than one row
    pub fn duplicate_group_count(
        &self,
        kind: EntityKind,
        key: &[&str],
    ) -> Result<i64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT 1 FROM {} GROUP BY {} HAVING COUNT(*) > 1)",
            kind.table(),
            key.join(", ")
        );
        let n = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }

    /// The largest duplicate groups, most rows first
    pub fn duplicate_groups(
        &self,
        kind: EntityKind,
        key: &[&str],
        limit: usize,
    ) -> Result<Vec<DuplicateGroup>, StoreError> {
        let joined = key
            .iter()
            .map(|col| format!("COALESCE(CAST({} AS TEXT), '')", col))
            .collect::<Vec<_>>()
            .join(" || ' | ' || ");
        let sql = format!(
            "SELECT {joined} AS k, COUNT(*) AS n FROM {table} GROUP BY {cols} \
             HAVING COUNT(*) > 1 ORDER BY n DESC, k LIMIT ?1",
            joined = joined,
            table = kind.table(),
            cols = key.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(DuplicateGroup {
                key: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Rows whose column holds a non-empty value
    pub fn count_populated(&self, kind: EntityKind, column: &str) -> Result<i64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {col} IS NOT NULL AND {col} != ''",
            kind.table(),
            col = column
        );
        let n = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }
}
