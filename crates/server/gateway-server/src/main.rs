use anyhow::{Context, Result};
use gateway_server::{AppState, GatewayConfig, build_router, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = GatewayConfig::load().context("Invalid gateway configuration")?;
    telemetry::init_tracing(&config)?;

    if config.server.dev {
        info!("Development mode: session cookies are sent without HttpOnly and Secure");
    }

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Gateway listening on http://{}", addr);
    info!("Forwarding to {}", config.downstream.api_url);

    axum::serve(listener, app).await?;

    Ok(())
}
