//! Client configuration.
//!
//! Built from environment variables at startup and handed to the client
//! and orchestrators explicitly; nothing in the SDK reads global state.

/// Default booking service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://www.angular.at/api/flight";

/// Verbosity switch passed to each orchestrator at construction.
///
/// Failures are always logged. With `debug` set, orchestrators also trace
/// every settled form value and every applied or discarded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Emit verbose traces.
    pub debug: bool,
}

impl LogConfig {
    /// Verbose logging.
    pub fn debug() -> Self {
        Self { debug: true }
    }
}

/// Connection settings for the booking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint used for searches, lookups and saves.
    pub base_url: String,
    /// Logging switch for the orchestrators.
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable         | Default                            | Description              |
    /// |------------------|------------------------------------|--------------------------|
    /// | `FLIGHT_API_URL` | `http://www.angular.at/api/flight` | Booking service endpoint |
    /// | `FLIGHT_DEBUG`   | unset                              | `1`/`true`/`yes` enables verbose traces |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("FLIGHT_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let debug = lookup("FLIGHT_DEBUG").is_some_and(|v| is_truthy(&v));

        Self {
            base_url,
            log: LogConfig { debug },
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
