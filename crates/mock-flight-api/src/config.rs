//! Mock service configuration, built from environment variables.

use std::time::Duration;

/// Settings for one mock service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Port to listen on (default `3000`).
    pub listen_port: u16,
    /// Artificial delay added to every response, to make in-flight
    /// requests observable from a client (default none).
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            listen_port: 3000,
            latency: Duration::ZERO,
        }
    }
}

impl MockConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                  | Default | Description                 |
    /// |---------------------------|---------|-----------------------------|
    /// | `MOCK_FLIGHT_PORT`        | `3000`  | HTTP listen port            |
    /// | `MOCK_FLIGHT_LATENCY_MS`  | `0`     | Delay added to each answer  |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let listen_port = std::env::var("MOCK_FLIGHT_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_port);
        let latency = std::env::var("MOCK_FLIGHT_LATENCY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.latency);

        Self {
            listen_port,
            latency,
        }
    }

    /// Configured latency in whole milliseconds, saturating at `u64::MAX`.
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}
