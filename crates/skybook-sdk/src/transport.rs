//! The seam between the orchestrators and the booking service.

use std::future::Future;

use skybook_models::Flight;

use crate::error::TransportError;

/// Asynchronous access to the booking service.
///
/// Every call is single-shot: it resolves once, with the service's answer
/// or a [`TransportError`]. Implementations hold no state beyond their
/// configuration and never retry.
pub trait FlightTransport: Send + Sync + 'static {
    /// Flights from `from` to `to`, in the order the service returns them.
    fn find(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<Vec<Flight>, TransportError>> + Send;

    /// A single flight by id.
    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Flight, TransportError>> + Send;

    /// Persist `flight` (new or existing) and return the service's version.
    fn save(&self, flight: &Flight) -> impl Future<Output = Result<Flight, TransportError>> + Send;
}
