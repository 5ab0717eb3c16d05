//! Charge probe: posts the fixed voice charge payload 100 times and reports
//! each outcome on stdout.

use charge_probe::prelude::*;
use tracing_subscriber::EnvFilter;

/// Replace with the actual charge endpoint URL.
const URL: &str = "https://example.com/api/endpoint";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Logs go to stderr; stdout is reserved for outcome reports
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ProbeConfig::new().url(URL).iterations(100);
    let transport = HttpTransport::new(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    RequestLoop::new(config, transport).run(&mut out).await?;

    Ok(())
}
