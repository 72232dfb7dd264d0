use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentdna_core::{CoreConfig, DashboardService, HttpChainClient, JsonFileNameCache};
use api_rest::{AppState, router};

/// Main entry point for the AgentDNA dashboard
///
/// Serves the REST API (agent overview, agent profiles, email search, word diffs and payload
/// inspection) together with its Swagger UI.
///
/// # Environment Variables
/// - `DASHBOARD_HOST`: bind address (default: "0.0.0.0")
/// - `DASHBOARD_SERVER_PORT`: bind port (default: 2345)
/// - `DASHBOARD_ALLOWED_HOSTS`: comma-separated `Host` values to answer to (default: any)
/// - `CHAIN_CONNECTOR_URL`: chain connector base URL
/// - `CHAIN_REQUEST_TIMEOUT_SECS`: per-request timeout for the chain connector (default: 10)
/// - `AGENT_NAME_CACHE_PATH`: JSON file holding cached agent names (default: "agent_names.json")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentdna=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let addr = cfg.server_addr();

    tracing::info!("++ Starting AgentDNA dashboard on {}", addr);
    tracing::info!("++ Chain connector at {}", cfg.chain_connector_url());

    let chain = HttpChainClient::new(&cfg)?;
    let names = JsonFileNameCache::open(cfg.name_cache_path());
    let dashboard = DashboardService::new(Arc::new(chain), Arc::new(names));

    let app = router(AppState::new(dashboard, cfg.allowed_hosts().to_vec()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
