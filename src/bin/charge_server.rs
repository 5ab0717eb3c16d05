//! Charge server: the endpoint the probe is pointed at.
//!
//! Listens on `0.0.0.0:8080`. Set `ENDPOINT` (and optionally `PORT`) to keep
//! the balance in redis instead of memory.

use charge_probe::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    match &config.ledger {
        LedgerConfig::Memory => tracing::info!("Using in-memory ledger"),
        LedgerConfig::Redis(url) => tracing::info!("Using redis ledger at {}", url),
    }

    let server = ChargeServer::new(config)?;

    tracing::info!("Try: curl -X POST http://localhost:8080/reset");
    tracing::info!(
        "Try: curl -X POST -d '{{\"serviceType\":\"voice\",\"unit\":3}}' http://localhost:8080/charge"
    );

    server.run().await
}
