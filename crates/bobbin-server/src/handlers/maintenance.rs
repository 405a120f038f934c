//! Health and maintenance handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::server::AppState;

/// `GET /health`
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// `POST /api/maintenance/reconcile` — run the full attach + prune sweep.
///
/// The sweeps already run after every write; this endpoint exists for
/// operators, matching the legacy standalone cleanup script.
pub async fn handle_reconcile(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.api.reconcile().await?;
    info!(
        "Manual reconcile: {} series scanned, {} attached, {} pruned, {} skipped",
        report.series_scanned, report.models_attached, report.refs_pruned, report.series_skipped
    );
    Ok(Json(json!({
        "message": "Reconciliation completed",
        "report": report
    })))
}
