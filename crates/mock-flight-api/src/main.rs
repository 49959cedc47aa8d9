//! Mock booking service: serves seeded in-memory flights over HTTP.

use chrono::Utc;
use mock_flight_api::{router_with_latency, FlightStore, MockConfig, FLIGHT_PATH};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MockConfig::from_env();
    let store = FlightStore::seeded(Utc::now());
    info!(
        flights = store.len().await,
        latency_ms = config.latency_ms(),
        "flight store seeded"
    );

    let app = router_with_latency(store, config.latency);

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, path = FLIGHT_PATH, "mock flight service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
