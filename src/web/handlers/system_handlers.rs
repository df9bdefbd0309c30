// src/web/handlers/system_handlers.rs
use rocket::State;
use tracing::info;

use crate::store::ConnectionStore;
use crate::web::types::ServerConfig;

pub async fn health_handler(
    config: &State<ServerConfig>,
    connections: &State<ConnectionStore>,
) -> &'static str {
    let stored = connections.all().await.map(|rows| rows.len()).unwrap_or(0);
    info!(
        "Health check ({} environment, {} stored connection(s), data in {})",
        config.environment,
        stored,
        config.data_dir.display()
    );
    "OK"
}
