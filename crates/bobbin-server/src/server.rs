//! HTTP server implementation using Axum.

use crate::handlers::{maintenance, models, series};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use bobbin_core::{config::StorageConfig, CatalogApi};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    /// Core catalog API
    pub api: CatalogApi,
}

/// Build the REST router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(maintenance::handle_health))
        .route(
            "/api/models/:category",
            post(models::create_model).get(models::list_models),
        )
        .route("/api/models/:category/schema", get(models::get_schema_fields))
        .route(
            "/api/models/:category/:id",
            get(models::get_model)
                .put(models::update_model)
                .delete(models::delete_model),
        )
        .route(
            "/api/models/:category/:id/image",
            put(models::update_model_image),
        )
        .route(
            "/api/series",
            post(series::create_series).get(series::list_series),
        )
        .route(
            "/api/series/:id",
            get(series::get_series)
                .put(series::update_series)
                .delete(series::delete_series),
        )
        .route(
            "/api/maintenance/reconcile",
            post(maintenance::handle_reconcile),
        )
        // The default 2 MB body limit is below the image cap; allow the
        // configured maximum plus room for the other form fields.
        .layer(DefaultBodyLimit::max(StorageConfig::MAX_IMAGE_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(api: CatalogApi, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState { api });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    Ok(actual_addr)
}
