//! Request bodies for the routing engine.
//!
//! Shaping is pure: callers hand over points, a costing mode and optional
//! tuning, and get back the JSON body the engine expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::costing;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Output units and narrative language for directions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsOptions {
    pub units: &'static str,
    pub language: &'static str,
}

impl Default for DirectionsOptions {
    fn default() -> Self {
        Self {
            units: "kilometers",
            language: "en-US",
        }
    }
}

/// Body of `POST /route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    /// Origin then destination.
    pub locations: Vec<Location>,
    pub costing: String,
    pub directions_options: DirectionsOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costing_options: Option<Value>,
}

/// A reachability contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contour {
    /// Minutes.
    pub time: u32,
}

/// Body of `POST /isochrone`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsochroneRequest {
    pub locations: Vec<Location>,
    pub costing: String,
    pub contours: Vec<Contour>,
    /// Polygons when true, linestrings otherwise.
    pub polygons: bool,
}

/// Shape a route request.
///
/// Caller options are forwarded untouched. Without them (`None`, `null` or
/// an empty object) the mode's default options are used, if it has any.
pub fn shape_route(
    origin: Location,
    destination: Location,
    costing: impl Into<String>,
    options: Option<Value>,
) -> RouteRequest {
    let costing = costing.into();
    let costing_options = options
        .filter(is_supplied)
        .or_else(|| costing::default_options(&costing));

    RouteRequest {
        locations: vec![origin, destination],
        costing,
        directions_options: DirectionsOptions::default(),
        costing_options,
    }
}

/// Shape an isochrone request with one contour per entry of `minutes`.
pub fn shape_isochrone(
    location: Location,
    costing: impl Into<String>,
    minutes: &[u32],
    polygons: bool,
) -> IsochroneRequest {
    IsochroneRequest {
        locations: vec![location],
        costing: costing.into(),
        contours: minutes.iter().map(|&time| Contour { time }).collect(),
        polygons,
    }
}

fn is_supplied(options: &Value) -> bool {
    match options {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
