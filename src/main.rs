use anyhow::Result;
use tracing::info;

use parkpool_site::{config::Config, delivery, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parkpool_site=info".parse()?),
        )
        .init();

    info!("Starting ParkPool site backend");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Wire up the delivery strategy selected by configuration
    let strategy = delivery::from_config(&config)?;
    info!("Delivery strategy: {:?}", config.delivery_strategy);

    let app = server::build_router(strategy);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
