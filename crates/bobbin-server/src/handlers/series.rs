//! Series CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bobbin_core::{BobbinError, Series};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{bad_request, ApiError};
use crate::server::AppState;

/// `POST /api/series`
pub async fn create_series(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let series: Series = serde_json::from_value(body)
        .map_err(|e| bad_request(format!("Invalid series document: {e}")))?;

    let stored = state.api.create_series(series).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Series created successfully",
            "series": stored
        })),
    ))
}

/// `GET /api/series`
pub async fn list_series(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let all = state.api.list_series().await?;
    Ok(Json(all))
}

/// `GET /api/series/{id}`
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = state
        .api
        .get_series(&id)
        .await?
        .ok_or(BobbinError::SeriesNotFound { series_id: id })?;
    Ok(Json(stored))
}

/// `PUT /api/series/{id}` — partial JSON update.
pub async fn update_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = body
        .as_object()
        .ok_or_else(|| bad_request("Update body must be a JSON object"))?;

    let stored = state.api.update_series(&id, patch).await?;
    Ok(Json(json!({
        "message": "Series updated successfully",
        "series": stored
    })))
}

/// `DELETE /api/series/{id}`
pub async fn delete_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.api.delete_series(&id).await?;
    Ok(Json(json!({ "message": "Series deleted successfully" })))
}
