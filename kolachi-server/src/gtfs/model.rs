//! GTFS entity types.
//!
//! Entities are built from table rows once and never mutated afterwards.
//! Absent optional columns take the defaults documented on each field;
//! present but malformed numeric columns are rejected.

use std::fmt;

use super::error::GtfsError;
use super::table::Row;

/// GTFS `route_type` code.
///
/// Codes outside the basic GTFS set are kept as `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    Unknown(i64),
}

impl RouteType {
    /// Map a numeric code to a route type.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => RouteType::Tram,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableCar,
            6 => RouteType::Gondola,
            7 => RouteType::Funicular,
            other => RouteType::Unknown(other),
        }
    }

    /// The numeric code, as it appeared in the feed.
    pub fn code(self) -> i64 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
            RouteType::Unknown(code) => code,
        }
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            RouteType::Tram => "Tram",
            RouteType::Subway => "Subway",
            RouteType::Rail => "Rail",
            RouteType::Bus => "Bus",
            RouteType::Ferry => "Ferry",
            RouteType::CableCar => "Cable Car",
            RouteType::Gondola => "Gondola",
            RouteType::Funicular => "Funicular",
            RouteType::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A transit route (routes.txt).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
    /// Defaults to `Bus` when the column is absent. Any integer is accepted.
    pub route_type: RouteType,
    /// Hex colour without `#`; defaults to `FFFFFF`.
    pub color: String,
}

impl Route {
    pub fn from_row(row: &Row<'_>) -> Result<Self, GtfsError> {
        let code = row.parse_or("route_type", 3i64)?;

        Ok(Self {
            route_id: row.get("route_id").to_string(),
            short_name: row.get("route_short_name").to_string(),
            long_name: row.get("route_long_name").to_string(),
            route_type: RouteType::from_code(code),
            color: row.get_opt("route_color").unwrap_or("FFFFFF").to_string(),
        })
    }
}

/// A stop or station (stops.txt).
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_id: String,
    pub name: String,
    /// Degrees in [-90, 90]; 0.0 when absent.
    pub lat: f64,
    /// Degrees in [-180, 180]; 0.0 when absent.
    pub lon: f64,
    pub description: String,
}

impl Stop {
    pub fn from_row(row: &Row<'_>) -> Result<Self, GtfsError> {
        let lat: f64 = row.parse_or("stop_lat", 0.0)?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(row.invalid("stop_lat", "latitude out of range"));
        }

        let lon: f64 = row.parse_or("stop_lon", 0.0)?;
        if !(-180.0..=180.0).contains(&lon) {
            return Err(row.invalid("stop_lon", "longitude out of range"));
        }

        Ok(Self {
            stop_id: row.get("stop_id").to_string(),
            name: row.get("stop_name").to_string(),
            lat,
            lon,
            description: row.get("stop_desc").to_string(),
        })
    }
}

/// A scheduled trip along a route (trips.txt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub headsign: String,
    pub direction_id: Option<u8>,
}

impl Trip {
    pub fn from_row(row: &Row<'_>) -> Result<Self, GtfsError> {
        Ok(Self {
            trip_id: row.get("trip_id").to_string(),
            route_id: row.get("route_id").to_string(),
            service_id: row.get("service_id").to_string(),
            headsign: row.get("trip_headsign").to_string(),
            direction_id: row.parse_opt("direction_id")?,
        })
    }
}

/// A visit of a trip to a stop (stop_times.txt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    /// Position within the trip. Only comparable between stop times of one trip.
    pub stop_sequence: u32,
    /// `HH:MM:SS`, may exceed 24:00:00; empty when absent.
    pub arrival_time: String,
    pub departure_time: String,
}

impl StopTime {
    pub fn from_row(row: &Row<'_>) -> Result<Self, GtfsError> {
        Ok(Self {
            trip_id: row.get("trip_id").to_string(),
            stop_id: row.get("stop_id").to_string(),
            stop_sequence: row.parse_or("stop_sequence", 0)?,
            arrival_time: row.get("arrival_time").to_string(),
            departure_time: row.get("departure_time").to_string(),
        })
    }
}
