mod api;
mod config;

use clap::Parser;
use pedalsafe_core::create_bike_network;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::{Cli, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli)?;

    let network_config = config.network.clone();
    let network =
        tokio::task::spawn_blocking(move || create_bike_network(&network_config)).await??;
    tracing::info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        lanes = %config.network.lanes_path.display(),
        "Bike network ready"
    );

    let app = api::app(AppState::new(network), &config);
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
