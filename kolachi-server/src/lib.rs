//! Transit routing server for Karachi public transport.
//!
//! Serves a static GTFS dataset over HTTP and fronts a Valhalla routing
//! engine for route and isochrone queries.

pub mod config;
pub mod gtfs;
pub mod valhalla;
pub mod web;
