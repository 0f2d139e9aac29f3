//! HTTP API.
//!
//! Exposes the GTFS catalog and the routing engine gateway under `/api/v1`.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
