use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use attendance_api::{app, config, middleware};
use persistence::rest::{RestStore, RestStoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics();

    info!("Starting Attendance Portal API v{}", env!("CARGO_PKG_VERSION"));

    // Connect the two row stores
    let primary: Arc<dyn persistence::store::RowStore> = Arc::new(RestStore::new(
        &RestStoreConfig {
            url: config.stores.primary.url.clone(),
            api_key: config.stores.primary.api_key.clone(),
            timeout_secs: config.stores.primary.timeout_secs,
        },
    )?);
    let secondary: Arc<dyn persistence::store::RowStore> = Arc::new(RestStore::new(
        &RestStoreConfig {
            url: config.stores.secondary.url.clone(),
            api_key: config.stores.secondary.api_key.clone(),
            timeout_secs: config.stores.secondary.timeout_secs,
        },
    )?);

    if config.stores.dual_sync {
        info!("Dual-store user sync is enabled");
    } else {
        info!("Dual-store user sync is disabled; secondary store used read-only");
    }

    // Build application
    let app = app::create_app(config.clone(), primary, secondary);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
