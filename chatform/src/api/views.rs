//! Per-form view counters, recorded from the public fill page.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use chatform_core::{error::CoreError, model::ViewCounter};

use super::{parse_id, ApiError, AppState};

#[derive(Serialize)]
pub struct ViewResponse {
    success: bool,
    data: ViewCounter,
}

pub async fn record(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<ViewResponse>, ApiError> {
    let form_id = parse_id(&form_id, "formId")?;
    let mut store = state.store.write().await;
    let counter = store.record_view(form_id).map_err(CoreError::Store)?;
    Ok(Json(ViewResponse {
        success: true,
        data: counter,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<ViewResponse>, ApiError> {
    let form_id = parse_id(&form_id, "formId")?;
    let store = state.store.read().await;
    let counter = store
        .view(form_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Form not found.".to_string()))?;
    Ok(Json(ViewResponse {
        success: true,
        data: counter,
    }))
}
