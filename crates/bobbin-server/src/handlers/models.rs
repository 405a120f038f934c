//! Machine model CRUD handlers.
//!
//! One generic handler set serves all eleven categories; the category comes
//! from the URL slug. Create accepts either a JSON document or a
//! multipart/form-data submission (the form every spec field arrives in as
//! text, with an optional `image` file part).

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, RequestExt};
use bobbin_core::models::schema::{self, FieldType};
use bobbin_core::{CatalogApi, Category, ModelDocument};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::{bad_request, ApiError};
use crate::server::AppState;

fn parse_category(slug: &str) -> Result<Category, ApiError> {
    Ok(Category::from_slug(slug)?)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Coerce a form text value by the schema field type: every multipart value
/// arrives as a string, but booleans come as `"true"`/`"false"`, numbers as
/// decimal text and `subModels` as embedded JSON.
fn coerce_form_value(field: &str, text: &str) -> Value {
    match schema::field_type(field) {
        Some(FieldType::Boolean) => Value::Bool(text == "true"),
        Some(FieldType::Number) => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| json!(0.0)),
        Some(FieldType::Array) => serde_json::from_str(text).unwrap_or_else(|_| json!([])),
        _ => Value::String(text.to_string()),
    }
}

async fn document_from_multipart(
    api: &CatalogApi,
    mut multipart: Multipart,
) -> Result<ModelDocument, ApiError> {
    let mut object = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|f| !f.is_empty())
            .map(String::from);

        if let Some(file_name) = file_name {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read file part: {e}")))?;
            let rel_path = api.save_upload(&name, &file_name, &bytes)?;
            object.insert(name, Value::String(rel_path));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| bad_request(format!("Failed to read form field: {e}")))?;
            object.insert(name.clone(), coerce_form_value(&name, &text));
        }
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| bad_request(format!("Invalid model document: {e}")))
}

/// `POST /api/models/{category}` — create a model from JSON or a form.
pub async fn create_model(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;

    let document = if is_multipart(request.headers()) {
        let multipart = request
            .extract::<Multipart, _>()
            .await
            .map_err(|e| bad_request(format!("Malformed multipart body: {e}")))?;
        document_from_multipart(&state.api, multipart).await?
    } else {
        let Json(value) = request
            .extract::<Json<Value>, _>()
            .await
            .map_err(|e| bad_request(format!("Invalid JSON body: {e}")))?;
        serde_json::from_value(value)
            .map_err(|e| bad_request(format!("Invalid model document: {e}")))?
    };

    let stored = state.api.create_model(category, document).await?;
    debug!("Created {} model {}", category, stored.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Model created successfully",
            "model": stored
        })),
    ))
}

/// `GET /api/models/{category}` — list all models in the category.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;
    let models = state.api.list_models(category).await?;
    Ok(Json(models))
}

/// `GET /api/models/{category}/{id}`
pub async fn get_model(
    State(state): State<Arc<AppState>>,
    Path((category, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;
    let stored = state
        .api
        .get_model(category, &id)
        .await?
        .ok_or(bobbin_core::BobbinError::ModelNotFound { model_id: id })?;
    Ok(Json(stored))
}

/// `PUT /api/models/{category}/{id}` — partial JSON update.
pub async fn update_model(
    State(state): State<Arc<AppState>>,
    Path((category, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;
    let patch = body
        .as_object()
        .ok_or_else(|| bad_request("Update body must be a JSON object"))?;

    let stored = state.api.update_model(category, &id, patch).await?;
    Ok(Json(json!({
        "message": "Model updated successfully",
        "model": stored
    })))
}

/// `PUT /api/models/{category}/{id}/image` — replace the model's image.
///
/// Expects a multipart body with an `image` file part; without one the
/// request is rejected with 400, matching the legacy update handler.
pub async fn update_model_image(
    State(state): State<Arc<AppState>>,
    Path((category, id)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|f| !f.is_empty())
            .map(String::from);

        if name == "image" {
            if let Some(file_name) = file_name {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file part: {e}")))?;
                let stored = state
                    .api
                    .set_model_image(category, &id, &file_name, &bytes)
                    .await?;
                return Ok(Json(json!({
                    "message": "Model updated successfully",
                    "model": stored
                })));
            }
        }
    }

    Err(bad_request("No image file uploaded"))
}

/// `DELETE /api/models/{category}/{id}`
pub async fn delete_model(
    State(state): State<Arc<AppState>>,
    Path((category, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&category)?;
    state.api.delete_model(category, &id).await?;
    Ok(Json(json!({ "message": "Model deleted successfully" })))
}

/// `GET /api/models/{category}/schema` — field name → wire type map.
pub async fn get_schema_fields(
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    parse_category(&category)?;
    let fields: Map<String, Value> = schema::schema_fields()
        .iter()
        .map(|(name, ty)| (name.to_string(), Value::String(ty.type_name().to_string())))
        .collect();
    Ok(Json(Value::Object(fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_booleans_and_numbers() {
        assert_eq!(coerce_form_value("oil", "true"), json!(true));
        assert_eq!(coerce_form_value("oil", "false"), json!(false));
        assert_eq!(coerce_form_value("speedInRPM", "4500"), json!(4500.0));
        assert_eq!(coerce_form_value("speedInRPM", "not a number"), json!(0.0));
    }

    #[test]
    fn test_coerce_sub_models_json() {
        let value = coerce_form_value("subModels", r#"[{"model":"A-1"}]"#);
        assert_eq!(value, json!([{"model": "A-1"}]));
        assert_eq!(coerce_form_value("subModels", "garbage"), json!([]));
    }

    #[test]
    fn test_unknown_fields_stay_strings() {
        assert_eq!(
            coerce_form_value("somethingElse", "42"),
            json!("42")
        );
    }

    #[test]
    fn test_is_multipart() {
        let mut headers = HeaderMap::new();
        assert!(!is_multipart(&headers));
        headers.insert(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=xyz".parse().unwrap(),
        );
        assert!(is_multipart(&headers));
    }
}
