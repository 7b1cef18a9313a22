use std::sync::Arc;

use pmodeezer::api::proxy_router;
use pmodeezer::DeezerProxy;
use pmoserver::{LoggingOptions, Server};
use tracing::info;
use utoipa::OpenApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Infrastructure ==========

    let config = pmoconfig::get_config();
    let mut server = Server::new_configured();
    server
        .init_logging(LoggingOptions::from_config(&config))
        .await;

    info!("Configuration loaded from {}", config.config_dir());

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "PMODiscover",
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    // ========== PHASE 2 : Catalogue ==========

    info!("🎵 Registering Deezer catalog proxy...");
    let proxy = Arc::new(DeezerProxy::from_config(&config)?);
    info!("✅ Relaying catalog requests to {}", proxy.api_base());
    server
        .add_openapi(
            proxy_router(proxy),
            pmodeezer::ApiDoc::openapi(),
            "deezer",
        )
        .await;

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    let addr = server.start().await?;

    info!("✅ PMODiscover is ready on port {}!", addr.port());
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
