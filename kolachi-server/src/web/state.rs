//! Application state for the web layer.

use std::sync::Arc;

use crate::gtfs::TransitCatalog;
use crate::valhalla::ValhallaClient;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Static GTFS dataset
    pub catalog: Arc<TransitCatalog>,

    /// Routing engine client
    pub valhalla: ValhallaClient,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalog: TransitCatalog, valhalla: ValhallaClient) -> Self {
        Self {
            catalog: Arc::new(catalog),
            valhalla,
        }
    }
}
