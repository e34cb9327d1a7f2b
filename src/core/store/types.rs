//! Store result types

use serde::Serialize;

use crate::entities::EntityKind;

/// What an upsert did with the incoming record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Result of a find-or-create lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: String,
    pub created: bool,
}

/// A persisted record with its row id
#[derive(Debug, Clone)]
pub struct Stored<R> {
    pub id: String,
    pub record: R,
}

/// One natural-key value shared by more than one row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    /// Key column values joined with " | "
    pub key: String,
    pub count: i64,
}

/// Row count for a single table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub kind: EntityKind,
    pub rows: i64,
}
