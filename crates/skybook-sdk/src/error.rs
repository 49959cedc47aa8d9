//! SDK error types.
//!
//! [`TransportError`] is the single error type returned by every call to
//! the booking service. The orchestrators never surface it to their
//! callers; they log it and switch to an error status message instead.

/// Failure to complete one HTTP exchange with the booking service.
///
/// Always terminal for the call that produced it: nothing in the SDK
/// retries.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Invalid client configuration (e.g. an unparsable base URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be sent or the response not received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status of the response.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
