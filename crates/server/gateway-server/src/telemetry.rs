use crate::config::GatewayConfig;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber in the configured format.
pub fn init_tracing(config: &GatewayConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_filter()).context("Invalid log filter")?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {}", e))
}
