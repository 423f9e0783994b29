//! `uponor-api`: serves the REST facade for one Smatrix Pulse gateway.

use tracing::info;
use tracing_subscriber::EnvFilter;
use uponor_jnap::api::{self, AppState};
use uponor_jnap::config::Config;
use uponor_jnap::UponorClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let mut builder = UponorClient::builder(&config.uponor_host);
    if let Some((mode, path)) = &config.message_log {
        builder = builder.message_log(*mode, path.clone());
    }
    let client = builder.build()?;

    let app = api::router(AppState::new(client));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, uponor_host = %config.uponor_host, "uponor-api listening");
    for (method, path, what) in api::ENDPOINTS {
        info!("  {method:<4} {path} - {what}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
