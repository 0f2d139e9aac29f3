//! Lazily loaded, cached GTFS tables.
//!
//! Each table is read from `<dir>/<name>` the first time it is asked for
//! and kept for the life of the store. Concurrent first requests for the
//! same table share a single read.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use super::error::GtfsError;

/// A parsed delimited table: a header row and its records.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: HashMap<String, usize>,
    records: Vec<csv::StringRecord>,
}

impl Table {
    /// An empty table, used when the backing file does not exist.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Parse a table from any reader.
    pub fn from_reader<R: std::io::Read>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, GtfsError> {
        let name = name.into();
        let csv_err = |source| GtfsError::Csv {
            table: name.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // GTFS exports frequently start with a UTF-8 byte order mark
        let columns = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').to_string(), i))
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        Ok(Self {
            name,
            columns,
            records,
        })
    }

    /// The file name this table was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            table: self,
            record,
        })
    }
}

/// A single record with by-name column access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    record: &'a csv::StringRecord,
}

impl<'a> Row<'a> {
    /// The value of `column`, or `""` when the column or the cell is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.table
            .columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
    }

    /// The value of `column` if present and non-empty.
    pub fn get_opt(&self, column: &str) -> Option<&'a str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }

    /// Parse `column`, falling back to `default` when it is absent or empty.
    ///
    /// A value that is present but does not parse is an error.
    pub fn parse_or<T: FromStr>(&self, column: &'static str, default: T) -> Result<T, GtfsError> {
        Ok(self.parse_opt(column)?.unwrap_or(default))
    }

    /// Parse `column` if it is present and non-empty.
    pub fn parse_opt<T: FromStr>(&self, column: &'static str) -> Result<Option<T>, GtfsError> {
        self.get_opt(column)
            .map(|raw| raw.parse().map_err(|_| self.invalid(column, "not a number")))
            .transpose()
    }

    /// 1-based line number of this record in its file.
    pub fn line(&self) -> u64 {
        self.record.position().map_or(0, |p| p.line())
    }

    /// Build an `InvalidField` error for `column` of this row.
    pub fn invalid(&self, column: &'static str, reason: &'static str) -> GtfsError {
        GtfsError::InvalidField {
            table: self.table.name.clone(),
            line: self.line(),
            column,
            value: self.get(column).to_string(),
            reason,
        }
    }
}

/// Read-only, load-once store of the tables in a GTFS directory.
#[derive(Clone)]
pub struct TableStore {
    dir: PathBuf,
    tables: Cache<String, Arc<Table>>,
}

impl TableStore {
    /// Create a store over `dir`. Nothing is read until a table is requested.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: Cache::builder().build(),
        }
    }

    /// The directory tables are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load `name` (e.g. `"stops.txt"`), reading the file only on first use.
    ///
    /// A missing file yields an empty table. Failed reads are not cached.
    pub fn load(&self, name: &str) -> Result<Arc<Table>, GtfsError> {
        self.tables
            .try_get_with(name.to_string(), || read_table(&self.dir, name).map(Arc::new))
            .map_err(|shared| Arc::try_unwrap(shared).unwrap_or_else(GtfsError::Shared))
    }

    /// Whether `name` has already been loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop the cached copy of `name`. A later `load` reads the file again.
    pub fn evict(&self, name: &str) {
        self.tables.invalidate(name);
    }
}

fn read_table(dir: &Path, name: &str) -> Result<Table, GtfsError> {
    let path = dir.join(name);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(table = name, path = %path.display(), "table missing, treating as empty");
            return Ok(Table::empty(name));
        }
        Err(source) => {
            return Err(GtfsError::Io {
                table: name.to_string(),
                source,
            });
        }
    };

    let table = Table::from_reader(name, BufReader::new(file))?;
    debug!(table = name, rows = table.len(), "loaded table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = TableStore::new(dir.path());

        let table = store.load("routes.txt").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.name(), "routes.txt");
    }

    #[test]
    fn second_load_uses_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.txt");
        std::fs::write(&path, "stop_id,stop_name\nS1,Saddar\n").unwrap();

        let store = TableStore::new(dir.path());
        let first = store.load("stops.txt").unwrap();
        assert!(store.is_loaded("stops.txt"));

        // Changes on disk after the first load are not observed
        std::fs::remove_file(&path).unwrap();
        let second = store.load("stops.txt").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn evicted_table_is_read_again() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.txt");
        std::fs::write(&path, "stop_id,stop_name\nS1,Saddar\n").unwrap();

        let store = TableStore::new(dir.path());
        assert_eq!(store.dir(), dir.path());
        assert_eq!(store.load("stops.txt").unwrap().len(), 1);

        store.evict("stops.txt");
        assert!(!store.is_loaded("stops.txt"));

        std::fs::write(&path, "stop_id,stop_name\nS1,Saddar\nS2,Tower\n").unwrap();
        assert_eq!(store.load("stops.txt").unwrap().len(), 2);
    }

    #[test]
    fn column_access_by_header() {
        let table = Table::from_reader(
            "stops.txt",
            "stop_id,stop_name,stop_lat\nS1, Saddar ,24.86\n".as_bytes(),
        )
        .unwrap();

        let row = table.rows().next().unwrap();
        assert_eq!(row.get("stop_id"), "S1");
        assert_eq!(row.get("stop_name"), "Saddar");
        assert_eq!(row.parse_or("stop_lat", 0.0).unwrap(), 24.86);
        assert_eq!(row.line(), 2);
    }

    #[test]
    fn missing_columns_use_defaults() {
        let table =
            Table::from_reader("stops.txt", "stop_id,stop_name,stop_lat\nS1\n".as_bytes()).unwrap();

        let row = table.rows().next().unwrap();
        assert_eq!(row.get("stop_name"), "");
        assert_eq!(row.get("stop_desc"), "");
        assert_eq!(row.get_opt("stop_desc"), None);
        assert_eq!(row.parse_or("stop_lat", 0.0).unwrap(), 0.0);
        assert_eq!(row.parse_opt::<u32>("direction_id").unwrap(), None);
    }

    #[test]
    fn malformed_number_is_reported() {
        let table = Table::from_reader(
            "routes.txt",
            "route_id,route_type\nR1,3\nR2,bus\n".as_bytes(),
        )
        .unwrap();

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].parse_or("route_type", 3u16).unwrap(), 3);

        match rows[1].parse_or("route_type", 3u16) {
            Err(GtfsError::InvalidField {
                table,
                line,
                column,
                value,
                ..
            }) => {
                assert_eq!(table, "routes.txt");
                assert_eq!(line, 3);
                assert_eq!(column, "route_type");
                assert_eq!(value, "bus");
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn strips_byte_order_mark() {
        let table =
            Table::from_reader("trips.txt", "\u{feff}trip_id,route_id\nT1,R1\n".as_bytes()).unwrap();

        assert!(table.columns.contains_key("trip_id"));
        assert_eq!(table.rows().next().unwrap().get("trip_id"), "T1");
    }
}
