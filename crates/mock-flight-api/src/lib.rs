//! Mock booking service.
//!
//! Serves the flight endpoint the skybook client talks to, backed by an
//! in-memory [`FlightStore`]:
//!
//! | Request | Answer |
//! |---------|--------|
//! | `GET /api/flight?from=..&to=..` | JSON array of matching flights |
//! | `GET /api/flight?id=..` | one flight, `404` when unknown |
//! | `POST /api/flight` | the stored record (new ids are assigned) |

pub mod config;
pub mod error;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use skybook_models::Flight;
use tracing::info;

pub use config::MockConfig;
pub use error::ApiError;
pub use store::{service_date, FlightStore};

/// Path of the flight endpoint.
pub const FLIGHT_PATH: &str = "/api/flight";

/// State shared across all handlers.
struct AppState {
    store: FlightStore,
    latency: Duration,
}

/// Query string of `GET /api/flight`.
#[derive(Debug, Deserialize)]
struct FlightQuery {
    id: Option<i64>,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

/// Router with no artificial latency.
pub fn router(store: FlightStore) -> Router {
    router_with_latency(store, Duration::ZERO)
}

/// Router that delays every answer by `latency`.
pub fn router_with_latency(store: FlightStore, latency: Duration) -> Router {
    let state = Arc::new(AppState { store, latency });
    Router::new()
        .route(FLIGHT_PATH, get(get_flights).post(save_flight))
        .with_state(state)
}

/// `GET /api/flight`: search by route, or look up one flight by id.
async fn get_flights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlightQuery>,
) -> Result<Response, ApiError> {
    tokio::time::sleep(state.latency).await;

    if let Some(id) = query.id {
        let flight = state
            .store
            .get(id)
            .await
            .ok_or(ApiError::UnknownFlight(id))?;
        info!(id, "flight looked up");
        return Ok(Json(flight).into_response());
    }

    let flights = state.store.find(&query.from, &query.to).await;
    info!(from = %query.from, to = %query.to, count = flights.len(), "flights searched");
    Ok(Json(flights).into_response())
}

/// `POST /api/flight`: create or replace a flight.
async fn save_flight(
    State(state): State<Arc<AppState>>,
    Json(flight): Json<Flight>,
) -> Result<Json<Flight>, ApiError> {
    tokio::time::sleep(state.latency).await;

    let saved = state.store.upsert(flight).await?;
    info!(id = saved.id, delayed = saved.delayed, "flight saved");
    Ok(Json(saved))
}
