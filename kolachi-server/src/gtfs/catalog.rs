//! Read-only query layer over a GTFS directory.

use std::collections::HashMap;

use tokio::sync::OnceCell;
use tracing::debug;

use super::error::GtfsError;
use super::index::RouteIndex;
use super::model::{Route, Stop, StopTime, Trip};
use super::table::{Row, TableStore};

pub const ROUTES_FILE: &str = "routes.txt";
pub const STOPS_FILE: &str = "stops.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";

/// Entities in file order plus an id lookup. The first row with a given id wins.
#[derive(Debug)]
struct Keyed<T> {
    items: Vec<T>,
    by_id: HashMap<String, usize>,
}

impl<T> Keyed<T> {
    fn new(items: Vec<T>, key: impl Fn(&T) -> &str) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            by_id.entry(key(item).to_string()).or_insert(i);
        }
        Self { items, by_id }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }
}

/// Entity counts of a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub routes: usize,
    pub stops: usize,
    pub trips: usize,
    pub stop_times: usize,
}

/// Transit catalog: routes, stops, trips and stop times of one GTFS dataset.
///
/// Each collection is built from its table on first use and then kept as an
/// immutable snapshot; concurrent first callers wait for a single build.
/// The raw table is dropped from the store once its collection is built.
/// A build that fails is retried by the next caller.
pub struct TransitCatalog {
    tables: TableStore,
    routes: OnceCell<Keyed<Route>>,
    stops: OnceCell<Keyed<Stop>>,
    trips: OnceCell<Keyed<Trip>>,
    stop_times: OnceCell<Vec<StopTime>>,
    index: OnceCell<RouteIndex>,
}

impl TransitCatalog {
    /// Create a catalog over a table store. Nothing is loaded yet.
    pub fn new(tables: TableStore) -> Self {
        Self {
            tables,
            routes: OnceCell::new(),
            stops: OnceCell::new(),
            trips: OnceCell::new(),
            stop_times: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    /// Create a catalog reading tables from `dir`.
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(TableStore::new(dir))
    }

    /// The directory the dataset is read from.
    pub fn dir(&self) -> &std::path::Path {
        self.tables.dir()
    }

    /// All routes, in file order.
    pub async fn list_routes(&self) -> Result<&[Route], GtfsError> {
        Ok(&self.routes().await?.items)
    }

    /// Look up a route by id.
    pub async fn get_route(&self, route_id: &str) -> Result<Option<&Route>, GtfsError> {
        Ok(self.routes().await?.get(route_id))
    }

    /// Stops, optionally restricted to those served by a route.
    ///
    /// With a route filter, returns the distinct stops visited by any trip
    /// of that route, in stops.txt order. An unknown route yields no stops.
    pub async fn list_stops(&self, route_id: Option<&str>) -> Result<Vec<&Stop>, GtfsError> {
        let stops = &self.stops().await?.items;

        let Some(route_id) = route_id else {
            return Ok(stops.iter().collect());
        };

        let index = self.index().await?;
        let Some(served) = index.stops_for_route(route_id) else {
            return Ok(Vec::new());
        };

        Ok(stops
            .iter()
            .filter(|s| served.contains(&s.stop_id))
            .collect())
    }

    /// Look up a stop by id.
    pub async fn get_stop(&self, stop_id: &str) -> Result<Option<&Stop>, GtfsError> {
        Ok(self.stops().await?.get(stop_id))
    }

    /// Stops whose name contains `query`, ignoring case, in file order.
    pub async fn search_stops(&self, query: &str) -> Result<Vec<&Stop>, GtfsError> {
        let needle = query.to_lowercase();
        Ok(self
            .stops()
            .await?
            .items
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Trips, optionally restricted to one route, in file order.
    pub async fn list_trips(&self, route_id: Option<&str>) -> Result<Vec<&Trip>, GtfsError> {
        let trips = &self.trips().await?.items;

        let Some(route_id) = route_id else {
            return Ok(trips.iter().collect());
        };

        let index = self.index().await?;
        Ok(index
            .trips_for_route(route_id)
            .iter()
            .map(|&i| &trips[i])
            .collect())
    }

    /// Look up a trip by id.
    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<&Trip>, GtfsError> {
        Ok(self.trips().await?.get(trip_id))
    }

    /// Stop times of a trip, ascending by stop sequence.
    pub async fn list_stop_times_for_trip(
        &self,
        trip_id: &str,
    ) -> Result<Vec<&StopTime>, GtfsError> {
        let stop_times = self.stop_times().await?;
        let index = self.index().await?;

        Ok(index
            .stop_times_for_trip(trip_id)
            .iter()
            .map(|&i| &stop_times[i])
            .collect())
    }

    /// Entity counts, loading every collection if needed.
    pub async fn summary(&self) -> Result<CatalogSummary, GtfsError> {
        Ok(CatalogSummary {
            routes: self.routes().await?.items.len(),
            stops: self.stops().await?.items.len(),
            trips: self.trips().await?.items.len(),
            stop_times: self.stop_times().await?.len(),
        })
    }

    /// Build every collection and the route index now.
    pub async fn warm(&self) -> Result<CatalogSummary, GtfsError> {
        self.index().await?;
        self.summary().await
    }

    async fn routes(&self) -> Result<&Keyed<Route>, GtfsError> {
        self.routes
            .get_or_try_init(|| async {
                let items = self.build(ROUTES_FILE, Route::from_row)?;
                Ok::<_, GtfsError>(Keyed::new(items, |r| r.route_id.as_str()))
            })
            .await
    }

    async fn stops(&self) -> Result<&Keyed<Stop>, GtfsError> {
        self.stops
            .get_or_try_init(|| async {
                let items = self.build(STOPS_FILE, Stop::from_row)?;
                Ok::<_, GtfsError>(Keyed::new(items, |s| s.stop_id.as_str()))
            })
            .await
    }

    async fn trips(&self) -> Result<&Keyed<Trip>, GtfsError> {
        self.trips
            .get_or_try_init(|| async {
                let items = self.build(TRIPS_FILE, Trip::from_row)?;
                Ok::<_, GtfsError>(Keyed::new(items, |t| t.trip_id.as_str()))
            })
            .await
    }

    async fn stop_times(&self) -> Result<&Vec<StopTime>, GtfsError> {
        self.stop_times
            .get_or_try_init(|| async { self.build(STOP_TIMES_FILE, StopTime::from_row) })
            .await
    }

    async fn index(&self) -> Result<&RouteIndex, GtfsError> {
        self.index
            .get_or_try_init(|| async {
                let trips = &self.trips().await?.items;
                let stop_times = self.stop_times().await?;
                let index = RouteIndex::build(trips, stop_times);
                debug!("built route index");
                Ok::<_, GtfsError>(index)
            })
            .await
    }

    fn build<T>(
        &self,
        file: &str,
        parse: impl Fn(&Row<'_>) -> Result<T, GtfsError>,
    ) -> Result<Vec<T>, GtfsError> {
        let table = self.tables.load(file)?;
        let items = table
            .rows()
            .map(|row| parse(&row))
            .collect::<Result<Vec<_>, _>>();

        // The typed collection replaces the raw records
        self.tables.evict(file);

        let items = items?;
        debug!(table = file, count = items.len(), "built collection");
        Ok(items)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
