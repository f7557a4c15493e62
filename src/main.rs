//! HTTP logging sidecar.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 PROXY SIDECAR                 │
//!                      │                                               │
//!  Client Request      │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!  ────────────────────┼─▶│ listener│───▶│  /proxy  │───▶│  sink   │──┼──▶ app.log
//!                      │  │ (tokio) │    │ handler  │    │ rotate/ │  │    app.log.1..5
//!  Client Response     │  └─────────┘    └────┬─────┘    │ flush   │  │
//!  ◀───────────────────┼──── "OK" / 500 ◀─────┘          └─────────┘  │
//!                      │                                               │
//!                      │  config · diagnostics · metrics · lifecycle   │
//!                      └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use proxy_sidecar::config::Cli;
use proxy_sidecar::lifecycle;
use proxy_sidecar::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability);

    tracing::info!("proxy-sidecar v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
