//! Streaming CSV reader producing header-keyed row records

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use thiserror::Error;

/// Errors raised while opening or decoding a CSV source
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Normalize a header name so spelling variants compare equal.
///
/// `"Project Name"`, `"Project_Name"` and `"project-name"` all become
/// `"project_name"`.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// One data row, addressable by header name
#[derive(Debug, Clone)]
pub struct RowRecord {
    /// 1-based line number in the source, counting the header as line 1
    line: usize,
    index: Arc<HashMap<String, usize>>,
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl RowRecord {
    /// Build a record directly from header/value pairs
    pub fn from_pairs(line: usize, pairs: &[(&str, &str)]) -> Self {
        let headers: Vec<String> = pairs.iter().map(|(h, _)| h.trim().to_string()).collect();
        let values = pairs.iter().map(|(_, v)| v.to_string()).collect();
        Self {
            line,
            index: Arc::new(build_header_index(&headers)),
            headers: Arc::new(headers),
            values,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// First non-blank value along a fallback chain of header spellings
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            self.index
                .get(&normalize_header(alias))
                .and_then(|&idx| self.values.get(idx))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        })
    }

    /// Header → value pairs in source column order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .zip(self.values.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// The row as a JSON object, used for loosely structured payloads
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .pairs()
            .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::Value::Object(map)
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

fn build_header_index(headers: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        // first occurrence wins on duplicate headers
        index.entry(normalize_header(h)).or_insert(i);
    }
    index
}

/// Lazy, one-shot sequence of rows from a CSV file
pub struct CsvSource {
    path: PathBuf,
    headers: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    records: StringRecordsIntoIter<BufReader<File>>,
    line: usize,
}

impl CsvSource {
    /// Open a CSV file; a missing path is `ReadError::NotFound`
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        if !path.exists() {
            return Err(ReadError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|source| ReadError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            index: Arc::new(build_header_index(&headers)),
            headers: Arc::new(headers),
            records: rdr.into_records(),
            line: 1,
        })
    }

    /// Open a CSV file, treating a missing path as "no rows"
    pub fn open_optional(path: &Path) -> Result<Option<Self>, ReadError> {
        match Self::open(path) {
            Ok(source) => Ok(Some(source)),
            Err(ReadError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for CsvSource {
    type Item = Result<RowRecord, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.records.next()?;
            let record = match result {
                Ok(r) => r,
                Err(source) => {
                    self.line += 1;
                    return Some(Err(ReadError::Csv {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(self.line + 1);

            let row = RowRecord {
                line: self.line,
                index: Arc::clone(&self.index),
                headers: Arc::clone(&self.headers),
                values: record.iter().map(str::to_string).collect(),
            };

            // rows made only of delimiters count as empty lines
            if row.is_blank() {
                continue;
            }
            return Some(Ok(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let tmp = tempdir().unwrap();
        let err = CsvSource::open(&tmp.path().join("nope.csv")).err().unwrap();
        assert!(matches!(err, ReadError::NotFound(_)));
    }

    #[test]
    fn test_open_optional_missing_file_is_none() {
        let tmp = tempdir().unwrap();
        let source = CsvSource::open_optional(&tmp.path().join("nope.csv")).unwrap();
        assert!(source.is_none());
    }

    #[test]
    fn test_rows_keyed_by_trimmed_header() {
        let tmp = tempdir().unwrap();
        let path = write_csv(
            tmp.path(),
            "devs.csv",
            " Developer , Type \nHines, Commercial\n\nPerry Homes,Builder\n",
        );

        let rows: Vec<RowRecord> = CsvSource::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(&["Developer"]), Some("Hines"));
        assert_eq!(rows[0].get(&["Type"]), Some("Commercial"));
        assert_eq!(rows[1].get(&["developer"]), Some("Perry Homes"));
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[1].line(), 4);
    }

    #[test]
    fn test_alias_chain_skips_blank_values() {
        let row = RowRecord::from_pairs(
            2,
            &[("Project_Name", ""), ("project name", "  "), ("name", "Ion District")],
        );
        assert_eq!(row.get(&["Project_Name", "name"]), Some("Ion District"));
        assert_eq!(row.get(&["missing"]), None);
    }

    #[test]
    fn test_header_normalization() {
        assert_eq!(normalize_header(" ZIP Code "), "zip_code");
        assert_eq!(normalize_header("Zip-Code"), "zip_code");
        assert_eq!(normalize_header("\u{feff}Permit Number"), "permit_number");
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let tmp = tempdir().unwrap();
        let path = write_csv(tmp.path(), "ragged.csv", "a,b,c\n1,2\n4,5,6\n");

        let rows: Vec<RowRecord> = CsvSource::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(&["c"]), None);
        assert_eq!(rows[1].get(&["c"]), Some("6"));
    }

    #[test]
    fn test_row_to_json() {
        let row = RowRecord::from_pairs(2, &[("Metric", "Cap Rate"), ("Houston", "6.1%")]);
        let json = row.to_json();
        assert_eq!(json["Metric"], "Cap Rate");
        assert_eq!(json["Houston"], "6.1%");
    }
}
