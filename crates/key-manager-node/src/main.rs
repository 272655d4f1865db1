//! `key-manager-node` - Pix key manager service.

use anyhow::{Context, Result};
use tracing::{info, warn};

use key_manager_node::container::NodeConfig;
use key_manager_node::logging::init_logging;
use key_manager_node::wiring::build_orchestrator;
use pk_02_api_gateway::ApiGatewayService;

fn load_config() -> Result<NodeConfig> {
    let config = NodeConfig::from_env().context("failed to read configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = ?config.storage.backend,
        "Starting Pix key manager"
    );

    let orchestrator = build_orchestrator(&config).context("failed to wire components")?;
    let gateway = ApiGatewayService::new(config.gateway.clone(), orchestrator)
        .context("failed to build HTTP gateway")?;

    gateway.serve(shutdown_signal()).await?;

    info!("Pix key manager stopped");
    Ok(())
}
