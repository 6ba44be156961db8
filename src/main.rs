use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use imgbed::analytics::{GeoResolver, VisitRecorder};
use imgbed::api::{self, AppState};
use imgbed::auth::AuthService;
use imgbed::config::Config;
use imgbed::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("imgbed=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let store = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    let resolver = GeoResolver::from_config(&config.geo)?;
    let recorder = Arc::new(
        VisitRecorder::new(resolver, Arc::clone(&store))
            .with_ip_anonymization(config.client_ip.ip_anonymization),
    );

    let auth_service = Arc::new(AuthService::new(config.admin.api_keys.clone()));
    if auth_service.is_enabled() {
        info!("🔐 Admin panel requires an API key");
    } else {
        info!("🔓 Admin panel is open - set ADMIN_API_KEYS to protect it");
    }

    if let Some(ref image_path) = config.asset.image_path {
        info!("🖼️ Serving image from file: {}", image_path);
    } else {
        info!("🖼️ Serving embedded image");
    }

    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        recorder,
        trusted_proxy_mode: config.client_ip.trusted_proxy_mode,
        image_path: config.asset.image_path.clone(),
    });

    let app = api::create_router(state, auth_service).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Tracked image at http://{}{}", addr, api::routes::IMAGE_ROUTE);
    info!("   - Admin panel at http://{}/adminpanel", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down, closing database pool");
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
