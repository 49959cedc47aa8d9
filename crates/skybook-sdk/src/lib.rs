//! # Skybook SDK
//!
//! Client-side SDK for the **skybook** flight booking service.
//!
//! The SDK provides:
//!
//! * [`FlightClient`]: HTTP transport for searching, loading and saving
//!   flights.
//! * [`FlightTransport`]: the seam the orchestrators talk through, so
//!   they can run against any implementation.
//! * [`FlightSearch`]: search view state (criteria, results, selection,
//!   delay toggling and save).
//! * [`FlightEditor`]: edit form state (load by id, field validation,
//!   a service-backed city check and submit).
//! * [`StatusMessage`]: the user-facing outcome of the latest load or
//!   save.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use skybook_sdk::{ClientConfig, FlightClient, FlightSearch, SearchOptions};
//!
//! # async fn run() -> Result<(), skybook_sdk::TransportError> {
//! let config = ClientConfig::from_env();
//! let client = FlightClient::from_config(&config)?;
//! let search = FlightSearch::new(client, SearchOptions { validate: true, log: config.log });
//!
//! if let Some(task) = search.search() {
//!     task.await.ok();
//! }
//! for flight in search.results() {
//!     println!("{flight}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod changes;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod search;
pub mod status;
pub mod teardown;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::FlightClient;
pub use config::{ClientConfig, LogConfig};
pub use editor::FlightEditor;
pub use error::TransportError;
pub use search::{FlightSearch, SearchOptions};
pub use status::StatusMessage;
pub use teardown::Teardown;
pub use transport::FlightTransport;

// Re-export the record type for ergonomic usage.
pub use skybook_models::Flight;
