//! Form design documents: the bubble/input element sequence behind a
//! form, plus the public fill-side fetch and the fill-link derivation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use chatform_core::{
    design::{Element, FormDesign},
    error::CoreError,
};

use super::{parse_id, ApiError, AppState, AuthContext};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDesignRequest {
    form_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Serialize)]
pub struct DesignResponse {
    message: String,
    form: FormDesign,
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<CreateDesignRequest>,
) -> Result<(StatusCode, Json<DesignResponse>), ApiError> {
    let form_id = parse_id(&req.form_id, "formId")?;
    let design = FormDesign::new(form_id, req.name, req.elements)?;
    let mut store = state.store.write().await;
    store.put_design(design.clone()).map_err(CoreError::Store)?;
    Ok((
        StatusCode::CREATED,
        Json(DesignResponse {
            message: "Form created successfully!".to_string(),
            form: design,
        }),
    ))
}

pub async fn get_by_form(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(form_id): Path<String>,
) -> Result<Json<DesignResponse>, ApiError> {
    let form_id = parse_id(&form_id, "formId")?;
    let store = state.store.read().await;
    let design = store
        .design_by_form(form_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Form not found.".to_string()))?;
    Ok(Json(DesignResponse {
        message: "Form fetched successfully!".to_string(),
        form: design,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillLinkResponse {
    message: String,
    form_link: String,
}

/// Derives the respondent-facing link for a form's design.
pub async fn fill_link(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(form_id): Path<String>,
) -> Result<Json<FillLinkResponse>, ApiError> {
    let form_id = parse_id(&form_id, "formId")?;
    let store = state.store.read().await;
    let design = store
        .design_by_form(form_id)
        .ok_or_else(|| CoreError::NotFound("Form not found.".to_string()))?;
    let form_link = format!(
        "{}/fill/form/{}/{}",
        state.frontend_url, form_id, design.id
    );
    Ok(Json(FillLinkResponse {
        message: "Form link generated successfully!".to_string(),
        form_link,
    }))
}

/// Public fetch by design id, used by the fill page. No authentication.
pub async fn get_for_fill(
    State(state): State<AppState>,
    Path(design_id): Path<String>,
) -> Result<Json<DesignResponse>, ApiError> {
    let design_id = parse_id(&design_id, "formId")?;
    let store = state.store.read().await;
    let design = store
        .design(design_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Form not found.".to_string()))?;
    Ok(Json(DesignResponse {
        message: "Fill Form fetched successfully!".to_string(),
        form: design,
    }))
}
