// src/bin/api_server.rs

use anyhow::Context;
use model_store::infra::{config, logging};
use model_store::transport;
use model_store::{Database, StoreConfig};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // --- Database Initialization ---
    let store_config = StoreConfig::from_env().context("invalid database configuration")?;
    tracing::info!(
        dialect = ?store_config.dialect,
        storage = ?store_config.storage,
        "initializing database"
    );
    let db = Arc::new(
        Database::open(&store_config)
            .await
            .context("failed to open database")?,
    );
    if !db.connect().await {
        // The pool reconnects lazily, so keep serving and let /health report it.
        tracing::warn!("starting without a verified database connection");
    }

    // --- API Server Initialization ---
    let app_state = transport::http::AppState { db: db.clone() };
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let bind_addr = config::api_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("API server listening on http://{}", bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, closing database");
        }
    }

    db.close().await;
    tracing::info!("graceful shutdown complete");
    Ok(())
}
