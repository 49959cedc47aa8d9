//! In-memory flight table.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use skybook_models::{Flight, CITIES};
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Shared, cloneable handle to the flight table.
///
/// Records keep insertion order; searches return matches in that order.
#[derive(Clone, Debug, Default)]
pub struct FlightStore {
    flights: Arc<RwLock<Vec<Flight>>>,
}

impl FlightStore {
    /// Create a store holding exactly `flights`.
    pub fn new(flights: Vec<Flight>) -> Self {
        Self {
            flights: Arc::new(RwLock::new(flights)),
        }
    }

    /// Create a store with one flight per ordered pair of known cities,
    /// departing on consecutive days from `start`.
    pub fn seeded(start: DateTime<Utc>) -> Self {
        let mut flights = Vec::new();
        for from in CITIES {
            for to in CITIES {
                if from == to {
                    continue;
                }
                let id = flights.len() as i64 + 1;
                let departure = start + Duration::days(id) + Duration::hours(id % 12);
                flights.push(Flight {
                    id,
                    from: from.to_string(),
                    to: to.to_string(),
                    date: service_date(departure),
                    delayed: id % 5 == 0,
                });
            }
        }
        Self::new(flights)
    }

    /// Flights matching both criteria.
    ///
    /// Matching is exact and case-insensitive; an empty criterion matches
    /// every city.
    pub async fn find(&self, from: &str, to: &str) -> Vec<Flight> {
        self.flights
            .read()
            .await
            .iter()
            .filter(|f| matches_city(&f.from, from) && matches_city(&f.to, to))
            .cloned()
            .collect()
    }

    /// The flight with this id, if any.
    pub async fn get(&self, id: i64) -> Option<Flight> {
        self.flights.read().await.iter().find(|f| f.id == id).cloned()
    }

    /// Insert a new record (id `0`) or replace an existing one.
    ///
    /// New records get the next free id. Returns the stored record.
    pub async fn upsert(&self, mut flight: Flight) -> Result<Flight, ApiError> {
        if flight.from.trim().is_empty() || flight.to.trim().is_empty() {
            return Err(ApiError::InvalidFlight(
                "from and to must not be empty".into(),
            ));
        }

        let mut flights = self.flights.write().await;
        if flight.id == 0 {
            flight.id = flights.iter().map(|f| f.id).max().unwrap_or(0) + 1;
            flights.push(flight.clone());
            return Ok(flight);
        }

        let slot = flights
            .iter_mut()
            .find(|f| f.id == flight.id)
            .ok_or(ApiError::UnknownFlight(flight.id))?;
        *slot = flight.clone();
        Ok(flight)
    }

    /// Number of stored flights.
    pub async fn len(&self) -> usize {
        self.flights.read().await.len()
    }

    /// Return `true` if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.flights.read().await.is_empty()
    }
}

fn matches_city(actual: &str, wanted: &str) -> bool {
    let wanted = wanted.trim();
    wanted.is_empty() || actual.eq_ignore_ascii_case(wanted)
}

/// Format a timestamp the way the booking service does:
/// seven fractional-second digits and an explicit `+00:00` offset.
pub fn service_date(at: DateTime<Utc>) -> String {
    format!(
        "{}.{:07}+00:00",
        at.format("%Y-%m-%dT%H:%M:%S"),
        at.timestamp_subsec_nanos() / 100
    )
}
