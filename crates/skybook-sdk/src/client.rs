//! HTTP client for the booking service.
//!
//! [`FlightClient`] talks to exactly one endpoint with a fixed
//! `Accept: application/json` header. There is no authentication, no
//! pagination and no retry.
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use skybook_sdk::{FlightClient, FlightTransport};
//!
//! # async fn run() -> Result<(), skybook_sdk::TransportError> {
//! let client = FlightClient::new("http://localhost:3000/api/flight")?;
//! for flight in client.find("Graz", "Hamburg").await? {
//!     println!("{flight}");
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use skybook_models::Flight;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::FlightTransport;

/// Client bound to one booking service endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct FlightClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FlightClient {
    /// Create a client for the given endpoint.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url)
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Check the status, then decode the body.
    ///
    /// The body is read in full first so a non-success answer can carry it
    /// into the error for diagnostics.
    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, TransportError> {
        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl FlightTransport for FlightClient {
    async fn find(&self, from: &str, to: &str) -> Result<Vec<Flight>, TransportError> {
        debug!(%from, %to, url = %self.base_url, "GET flights");
        let res = self
            .http
            .get(self.base_url.clone())
            .query(&[("from", from), ("to", to)])
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Flight, TransportError> {
        debug!(id, url = %self.base_url, "GET flight by id");
        let res = self
            .http
            .get(self.base_url.clone())
            .query(&[("id", id)])
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn save(&self, flight: &Flight) -> Result<Flight, TransportError> {
        debug!(id = flight.id, url = %self.base_url, "POST flight");
        let res = self
            .http
            .post(self.base_url.clone())
            .json(flight)
            .send()
            .await?;
        Self::decode(res).await
    }
}
