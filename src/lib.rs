pub mod api; // HTTP surface
pub mod config;
pub mod core_state; // Shared connection + engine config
pub mod db;
pub mod models;
pub mod safety; // Allergy, interaction and safety scoring
pub mod store;
pub mod suggestions; // Ranking ensemble

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Start the service: logging, database, HTTP API. Returns after Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("ClinIRx starting v{}", config::APP_VERSION);

    let db_path = config::database_path();
    let core = core_state::CoreState::open(&db_path, config::EngineConfig::default())
        .map_err(|e| format!("Cannot open database {}: {e}", db_path.display()))?;
    let server = api::start_api_server(Arc::new(core), config::bind_addr()?).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.stop().await;
    tracing::info!("ClinIRx stopped");
    Ok(())
}
