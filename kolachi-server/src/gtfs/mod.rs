//! Static GTFS reference data.
//!
//! Loads `routes.txt`, `stops.txt`, `trips.txt` and `stop_times.txt` from a
//! directory on first use and answers read-only queries over them:
//! entity lookup, route → stops joins and stop-name search.
//!
//! The dataset is treated as an immutable snapshot for the life of the
//! process. Missing files load as empty tables.

mod catalog;
mod error;
mod index;
mod model;
mod table;

pub use catalog::{
    CatalogSummary, ROUTES_FILE, STOP_TIMES_FILE, STOPS_FILE, TRIPS_FILE, TransitCatalog,
};
pub use error::GtfsError;
pub use index::RouteIndex;
pub use model::{Route, RouteType, Stop, StopTime, Trip};
pub use table::{Row, Table, TableStore};
