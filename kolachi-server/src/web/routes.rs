//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::{API_DESCRIPTION, API_TITLE, API_VERSION, CorsOrigins};
use crate::gtfs::GtfsError;
use crate::valhalla::{ValhallaError, shape_isochrone, shape_route};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, cors: &CorsOrigins) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/route", post(plan_route))
        .route("/isochrone", post(isochrone))
        .route("/routes", get(list_routes))
        .route("/routes/:route_id", get(get_route))
        .route("/stops", get(list_stops))
        .route("/stops/:stop_id", get(get_stop))
        .route("/trips", get(list_trips))
        .route("/trips/:trip_id/stop_times", get(list_stop_times));

    Router::new()
        .route("/", get(index))
        .nest("/api/v1", api)
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|_| warn!(origin = %o, "ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// API metadata and dataset size.
async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    let dataset = match state.catalog.summary().await {
        Ok(summary) => Some(summary.into()),
        Err(e) => {
            error!(error = %e, "failed to load GTFS dataset");
            None
        }
    };

    Json(IndexResponse {
        name: API_TITLE,
        version: API_VERSION,
        description: API_DESCRIPTION,
        health: "/api/v1/health",
        dataset,
    })
}

/// API and routing engine health.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let valhalla_up = state.valhalla.probe().await;
    Json(HealthResponse::from_probe(valhalla_up))
}

/// Route between two points via the routing engine.
async fn plan_route(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: RouteBody = parse_json(&body)?;
    req.validate()
        .map_err(|message| AppError::BadRequest { message })?;

    let request = shape_route(req.origin, req.destination, req.costing, req.options);
    let response = state.valhalla.route(&request).await?;

    Ok(raw_json(response))
}

/// Reachability from a point via the routing engine.
async fn isochrone(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: IsochroneBody = parse_json(&body)?;
    req.validate()
        .map_err(|message| AppError::BadRequest { message })?;

    let request = shape_isochrone(req.location, req.costing, &req.contours, req.polygons);
    let response = state.valhalla.isochrone(&request).await?;

    Ok(raw_json(response))
}

/// All routes.
async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<RouteResult>>, AppError> {
    let routes = state.catalog.list_routes().await?;
    Ok(Json(routes.iter().map(RouteResult::from_route).collect()))
}

/// One route by id.
async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteResult>, AppError> {
    let route = state
        .catalog
        .get_route(&route_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: "Route not found".to_string(),
        })?;

    Ok(Json(RouteResult::from_route(route)))
}

/// Stops, optionally searched by name or filtered by route.
async fn list_stops(
    State(state): State<AppState>,
    Query(query): Query<StopsQuery>,
) -> Result<Json<Vec<StopResult>>, AppError> {
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let route_id = query.route_id.as_deref().filter(|r| !r.is_empty());

    let stops = match search {
        Some(q) => state.catalog.search_stops(q).await?,
        None => state.catalog.list_stops(route_id).await?,
    };

    Ok(Json(stops.into_iter().map(StopResult::from_stop).collect()))
}

/// One stop by id.
async fn get_stop(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Json<StopResult>, AppError> {
    let stop = state
        .catalog
        .get_stop(&stop_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: "Stop not found".to_string(),
        })?;

    Ok(Json(StopResult::from_stop(stop)))
}

/// Trips, optionally filtered by route.
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripsQuery>,
) -> Result<Json<Vec<TripResult>>, AppError> {
    let route_id = query.route_id.as_deref().filter(|r| !r.is_empty());
    let trips = state.catalog.list_trips(route_id).await?;

    Ok(Json(trips.into_iter().map(TripResult::from_trip).collect()))
}

/// Stop times of a trip in visiting order.
async fn list_stop_times(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<StopTimeResult>>, AppError> {
    let stop_times = state.catalog.list_stop_times_for_trip(&trip_id).await?;

    Ok(Json(
        stop_times
            .into_iter()
            .map(StopTimeResult::from_stop_time)
            .collect(),
    ))
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Respond with an engine body as-is.
fn raw_json(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
    BadGateway { message: String },
    GatewayTimeout { message: String },
}

impl From<GtfsError> for AppError {
    fn from(e: GtfsError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<ValhallaError> for AppError {
    fn from(e: ValhallaError) -> Self {
        let message = e.to_string();
        if e.is_timeout() {
            AppError::GatewayTimeout { message }
        } else {
            AppError::BadGateway { message }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::GatewayTimeout { message } => (StatusCode::GATEWAY_TIMEOUT, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "request failed");
        } else {
            warn!(status = status.as_u16(), %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
