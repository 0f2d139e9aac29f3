//! Routing engine gateway.
//!
//! Shapes route and isochrone requests for a Valhalla-compatible engine,
//! filling in per-mode default costing where the caller gave none, and
//! forwards them over HTTP. Response bodies are returned as received; this
//! module never interprets them.
//!
//! Engine endpoints used:
//! - `POST /route`
//! - `POST /isochrone`
//! - `GET /status` (liveness)

mod client;
pub mod costing;
mod error;
mod request;

#[cfg(test)]
mod client_tests;

pub use client::{ValhallaClient, ValhallaConfig};
pub use error::ValhallaError;
pub use request::{
    Contour, DirectionsOptions, IsochroneRequest, Location, RouteRequest, shape_isochrone,
    shape_route,
};
