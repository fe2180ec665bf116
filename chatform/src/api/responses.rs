//! Filled forms: respondent sessions created from the public fill
//! page. Partial submissions merge by element id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use chatform_core::{
    error::CoreError,
    model::{FilledForm, ResponseEntry},
};

use super::{parse_id, ApiError, AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFilledRequest {
    form_id: String,
    responses: Vec<ResponseEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledResponse {
    message: String,
    filled_form: FilledForm,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateFilledRequest>,
) -> Result<(StatusCode, Json<FilledResponse>), ApiError> {
    let form_id = parse_id(&req.form_id, "formId")?;
    let filled = FilledForm::new(form_id, req.responses);
    let mut store = state.store.write().await;
    store.put_filled(filled.clone()).map_err(CoreError::Store)?;
    Ok((
        StatusCode::CREATED,
        Json(FilledResponse {
            message: "Form created successfully!".to_string(),
            filled_form: filled,
        }),
    ))
}

#[derive(Deserialize)]
pub struct UpdateFilledRequest {
    responses: Vec<ResponseEntry>,
    completed: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFilledRequest>,
) -> Result<Json<FilledResponse>, ApiError> {
    let id = parse_id(&id, "id")?;
    let mut store = state.store.write().await;
    let mut filled = store
        .filled(id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Filled form not found.".to_string()))?;

    filled.merge_responses(req.responses);
    if let Some(completed) = req.completed {
        filled.completed = completed;
    }
    store.put_filled(filled.clone()).map_err(CoreError::Store)?;
    Ok(Json(FilledResponse {
        message: "Form updated successfully!".to_string(),
        filled_form: filled,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledListResponse {
    message: String,
    filled_forms: Vec<FilledForm>,
}

pub async fn list_for_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<FilledListResponse>, ApiError> {
    let form_id = parse_id(&form_id, "formId")?;
    let store = state.store.read().await;
    Ok(Json(FilledListResponse {
        message: "Form retrieved successfully!".to_string(),
        filled_forms: store.filled_for_form(form_id),
    }))
}
