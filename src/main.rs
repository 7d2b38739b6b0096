//! Typing race server - Entry Point
//!
//! Parses the configuration, starts the TCP listener and serves races.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use typerace::{serve, RaceManager, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=typerace=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typerace=info")),
        )
        .init();

    let config = ServerConfig::parse();

    let listener = TcpListener::bind(&config.addr).await?;
    let manager = Arc::new(RaceManager::new());

    serve(listener, manager, Arc::new(config.session())).await?;
    Ok(())
}
