use dotenvy::dotenv;

mod api;
mod config;
mod middleware;
mod setup;

use config::app_config::AppConfig;
use setup::{dependency_injection::DependencyContainer, server::Server};

/// Storefront web front-end entry point
///
/// Initializes logging, validates configuration, wires dependencies and
/// serves pages, the JSON API and product image forwarding.
/// - config/: environment-driven settings, validated before anything starts
/// - middleware/: request pipeline stages
/// - api/: pages, JSON API and the image forwarder
/// - setup/: dependency wiring, pipeline assembly and the server loop
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing with RUST_LOG env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // 2. Load environment variables
    dotenv().ok();

    // 3. Load and validate configuration
    let config = AppConfig::from_env().inspect_err(|err| {
        tracing::error!(error = %err, "Invalid configuration, refusing to start");
    })?;

    // 4. Wire dependencies
    let container = DependencyContainer::new(&config)?;

    // 5. Run server
    Server::run(config, container).await?;

    Ok(())
}
