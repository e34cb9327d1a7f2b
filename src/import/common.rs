//! Common utilities for CSV import

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::normalize::safe_string;
use crate::core::reader::{CsvSource, ReadError, RowRecord};
use crate::core::store::{StoreError, UpsertOutcome};

use super::ImportResult;

/// Why a single row was skipped
#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An input file, optionally tagged with the category its rows belong to
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub category: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// File name used in error messages and as a record source tag
    pub fn name(&self) -> String {
        file_label(&self.path)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Running counts for one importer
#[derive(Debug)]
pub struct ImportTally {
    data_type: &'static str,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub files_read: usize,
    pub errors: Vec<String>,
}

impl ImportTally {
    pub fn new(data_type: &'static str) -> Self {
        Self {
            data_type,
            created: 0,
            updated: 0,
            failed: 0,
            files_read: 0,
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created(_) => self.created += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
        }
    }

    /// Log a skipped row and keep its message for the result
    pub fn row_failed(&mut self, file: &Path, line: usize, err: RowError) {
        warn!(
            importer = self.data_type,
            file = %file.display(),
            line,
            error = %err,
            "row skipped"
        );
        self.failed += 1;
        self.errors
            .push(format!("{} row {}: {}", file_label(file), line, err));
    }

    /// A source that exists but could not be opened
    pub fn file_failed(&mut self, file: &Path, err: ReadError) {
        warn!(importer = self.data_type, file = %file.display(), error = %err, "source unreadable");
        self.errors.push(format!("{}: {}", file_label(file), err));
    }

    pub fn finish(self) -> ImportResult {
        ImportResult {
            data_type: self.data_type.to_string(),
            success: self.errors.is_empty(),
            records_imported: self.created + self.updated,
            records_created: self.created,
            records_updated: self.updated,
            records_failed: self.failed,
            files_read: self.files_read,
            errors: self.errors,
        }
    }
}

/// Open a source, treating a missing file as zero rows
pub fn open_source(tally: &mut ImportTally, file: &SourceFile) -> Option<CsvSource> {
    match CsvSource::open_optional(&file.path) {
        Ok(Some(source)) => {
            tally.files_read += 1;
            debug!(file = %file.path.display(), "reading source");
            Some(source)
        }
        Ok(None) => {
            debug!(file = %file.path.display(), "source not found, skipping");
            None
        }
        Err(e) => {
            tally.file_failed(&file.path, e);
            None
        }
    }
}

/// Drive every row of every source through `handle`, recording outcomes.
///
/// A failing row is logged and counted; the batch continues.
pub fn for_each_row<F>(tally: &mut ImportTally, files: &[SourceFile], mut handle: F)
where
    F: FnMut(&SourceFile, &RowRecord) -> Result<UpsertOutcome, RowError>,
{
    for file in files {
        let Some(source) = open_source(tally, file) else {
            continue;
        };

        let mut line = 1;
        for result in source {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    line += 1;
                    tally.row_failed(&file.path, line, e.into());
                    continue;
                }
            };
            line = row.line();

            match handle(file, &row) {
                Ok(outcome) => tally.record(&outcome),
                Err(e) => tally.row_failed(&file.path, row.line(), e),
            }
        }
    }
}

/// First non-blank value along the alias chain, or a missing-field error
pub fn require(row: &RowRecord, aliases: &[&str], field: &'static str) -> Result<String, RowError> {
    safe_string(row.get(aliases)).ok_or(RowError::MissingField(field))
}
