//! Data transfer objects for web requests and responses.
//!
//! Response field names follow the GTFS column names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gtfs::{CatalogSummary, Route, Stop, StopTime, Trip};
use crate::valhalla::{Location, costing};

/// Body of `POST /api/v1/route`.
#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub origin: Location,
    pub destination: Location,

    /// Costing model: auto, bicycle, pedestrian, multimodal, transit, bus
    #[serde(default = "default_route_costing")]
    pub costing: String,

    /// Costing options forwarded to the engine as given
    #[serde(default)]
    pub options: Option<Value>,
}

impl RouteBody {
    /// Check coordinate ranges.
    pub fn validate(&self) -> Result<(), String> {
        validate_location("origin", &self.origin)?;
        validate_location("destination", &self.destination)
    }
}

/// Body of `POST /api/v1/isochrone`.
#[derive(Debug, Deserialize)]
pub struct IsochroneBody {
    pub location: Location,

    #[serde(default = "default_isochrone_costing")]
    pub costing: String,

    /// Contour times in minutes
    #[serde(default = "default_contours")]
    pub contours: Vec<u32>,

    /// Polygons rather than linestrings
    #[serde(default = "default_polygons")]
    pub polygons: bool,
}

impl IsochroneBody {
    /// Check the location and contour times.
    pub fn validate(&self) -> Result<(), String> {
        validate_location("location", &self.location)?;

        if self.contours.is_empty() {
            return Err("contours must not be empty".to_string());
        }
        if self.contours.contains(&0) {
            return Err("contour times must be at least 1 minute".to_string());
        }
        Ok(())
    }
}

fn default_route_costing() -> String {
    costing::MULTIMODAL.to_string()
}

fn default_isochrone_costing() -> String {
    costing::PEDESTRIAN.to_string()
}

fn default_contours() -> Vec<u32> {
    vec![5, 10, 15]
}

fn default_polygons() -> bool {
    true
}

fn validate_location(field: &str, location: &Location) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&location.lat) {
        return Err(format!("{field}.lat must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&location.lon) {
        return Err(format!("{field}.lon must be between -180 and 180"));
    }
    Ok(())
}

/// Query for `GET /api/v1/stops`.
#[derive(Debug, Default, Deserialize)]
pub struct StopsQuery {
    /// Only stops served by this route
    pub route_id: Option<String>,

    /// Only stops whose name contains this; takes precedence over `route_id`
    pub search: Option<String>,
}

/// Query for `GET /api/v1/trips`.
#[derive(Debug, Default, Deserialize)]
pub struct TripsQuery {
    pub route_id: Option<String>,
}

/// A route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: i64,
    pub route_type_name: &'static str,
    pub route_color: String,
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            route_id: route.route_id.clone(),
            route_short_name: route.short_name.clone(),
            route_long_name: route.long_name.clone(),
            route_type: route.route_type.code(),
            route_type_name: route.route_type.name(),
            route_color: route.color.clone(),
        }
    }
}

/// A stop.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub stop_desc: String,
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            stop_id: stop.stop_id.clone(),
            stop_name: stop.name.clone(),
            stop_lat: stop.lat,
            stop_lon: stop.lon,
            stop_desc: stop.description.clone(),
        }
    }
}

/// A trip.
#[derive(Debug, Serialize)]
pub struct TripResult {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub trip_headsign: String,
    pub direction_id: Option<u8>,
}

impl TripResult {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            trip_id: trip.trip_id.clone(),
            route_id: trip.route_id.clone(),
            service_id: trip.service_id.clone(),
            trip_headsign: trip.headsign.clone(),
            direction_id: trip.direction_id,
        }
    }
}

/// A stop time.
#[derive(Debug, Serialize)]
pub struct StopTimeResult {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
}

impl StopTimeResult {
    pub fn from_stop_time(st: &StopTime) -> Self {
        Self {
            trip_id: st.trip_id.clone(),
            stop_id: st.stop_id.clone(),
            stop_sequence: st.stop_sequence,
            arrival_time: st.arrival_time.clone(),
            departure_time: st.departure_time.clone(),
        }
    }
}

/// Response for `GET /api/v1/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,
    pub api: &'static str,
    /// "healthy" or "unavailable"
    pub valhalla: &'static str,
    pub message: &'static str,
}

impl HealthResponse {
    pub fn from_probe(valhalla_up: bool) -> Self {
        if valhalla_up {
            Self {
                status: "healthy",
                api: "healthy",
                valhalla: "healthy",
                message: "All services operational",
            }
        } else {
            Self {
                status: "degraded",
                api: "healthy",
                valhalla: "unavailable",
                message: "Valhalla service unavailable",
            }
        }
    }
}

/// Dataset counts shown on the index endpoint.
#[derive(Debug, Serialize)]
pub struct DatasetResult {
    pub routes: usize,
    pub stops: usize,
    pub trips: usize,
    pub stop_times: usize,
}

impl From<CatalogSummary> for DatasetResult {
    fn from(s: CatalogSummary) -> Self {
        Self {
            routes: s.routes,
            stops: s.stops,
            trips: s.trips,
            stop_times: s.stop_times,
        }
    }
}

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub health: &'static str,
    /// Absent when the dataset failed to load
    pub dataset: Option<DatasetResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::RouteType;

    #[test]
    fn route_body_defaults() {
        let body: RouteBody = serde_json::from_str(
            r#"{"origin":{"lat":24.87,"lon":67.02},"destination":{"lat":24.86,"lon":67.01}}"#,
        )
        .unwrap();

        assert_eq!(body.costing, "multimodal");
        assert!(body.options.is_none());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn route_body_rejects_bad_coordinates() {
        let body: RouteBody = serde_json::from_str(
            r#"{"origin":{"lat":91.0,"lon":67.02},"destination":{"lat":24.86,"lon":67.01}}"#,
        )
        .unwrap();
        assert_eq!(
            body.validate().unwrap_err(),
            "origin.lat must be between -90 and 90"
        );

        let body: RouteBody = serde_json::from_str(
            r#"{"origin":{"lat":24.87,"lon":67.02},"destination":{"lat":24.86,"lon":-181}}"#,
        )
        .unwrap();
        assert_eq!(
            body.validate().unwrap_err(),
            "destination.lon must be between -180 and 180"
        );
    }

    #[test]
    fn isochrone_body_defaults() {
        let body: IsochroneBody =
            serde_json::from_str(r#"{"location":{"lat":24.86,"lon":67.01}}"#).unwrap();

        assert_eq!(body.costing, "pedestrian");
        assert_eq!(body.contours, vec![5, 10, 15]);
        assert!(body.polygons);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn isochrone_body_rejects_bad_contours() {
        let body: IsochroneBody = serde_json::from_str(
            r#"{"location":{"lat":24.86,"lon":67.01},"contours":[]}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());

        let body: IsochroneBody = serde_json::from_str(
            r#"{"location":{"lat":24.86,"lon":67.01},"contours":[10,0]}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());

        // Negative minutes never deserialize
        assert!(
            serde_json::from_str::<IsochroneBody>(
                r#"{"location":{"lat":24.86,"lon":67.01},"contours":[-5]}"#
            )
            .is_err()
        );
    }

    #[test]
    fn route_result_fields() {
        let route = Route {
            route_id: "R1".into(),
            short_name: "10".into(),
            long_name: "Numaish–Saddar".into(),
            route_type: RouteType::from_code(3),
            color: "FFFFFF".into(),
        };

        let json = serde_json::to_value(RouteResult::from_route(&route)).unwrap();
        assert_eq!(json["route_id"], "R1");
        assert_eq!(json["route_short_name"], "10");
        assert_eq!(json["route_type"], 3);
        assert_eq!(json["route_type_name"], "Bus");
        assert_eq!(json["route_color"], "FFFFFF");
    }

    #[test]
    fn health_from_probe() {
        let up = HealthResponse::from_probe(true);
        assert_eq!(up.status, "healthy");
        assert_eq!(up.valhalla, "healthy");

        let down = HealthResponse::from_probe(false);
        assert_eq!(down.status, "degraded");
        assert_eq!(down.api, "healthy");
        assert_eq!(down.valhalla, "unavailable");
    }
}
