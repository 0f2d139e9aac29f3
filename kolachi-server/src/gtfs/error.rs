//! GTFS data error types.

/// Errors raised while loading or interpreting the GTFS tables.
///
/// A missing table file is not an error; it loads as an empty table.
#[derive(Debug, thiserror::Error)]
pub enum GtfsError {
    /// The table file exists but could not be read
    #[error("failed to read {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },

    /// The table is not well-formed delimited text
    #[error("malformed {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    /// A field is present but does not hold a valid value
    #[error("invalid {column} {value:?} in {table} line {line}: {reason}")]
    InvalidField {
        table: String,
        line: u64,
        column: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A load failure observed by more than one concurrent caller
    #[error(transparent)]
    Shared(std::sync::Arc<GtfsError>),
}
