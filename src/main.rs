use export_monitor::{
    api::Server,
    config::Config,
    report::JsonReportRenderer,
    store::SqliteTaskStore,
    ExportMonitor,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configuration file path
const CONFIG_ENV: &str = "EXPORT_MONITOR_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the export monitor.
///
/// Loads the configuration, initializes logging, opens the task store and
/// serves the batch report endpoint.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Export monitor starting with config from {}: {:?}", config_path, config);

    let store = SqliteTaskStore::connect(&config.database).await?;
    let monitor = ExportMonitor::new(Arc::new(store), config.query.default_limit);

    let server = Server::new(config, monitor, Arc::new(JsonReportRenderer::new()));
    server.start().await?;

    Ok(())
}
