//! Form CRUD. Forms are unique by name per owner and optionally sit
//! inside a folder; listing without a folder filter returns root-level
//! forms only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatform_core::{error::CoreError, model::Form};

use super::{parse_id, ApiError, AppState, AuthContext};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    #[serde(default)]
    name: String,
    folder_id: Option<String>,
}

#[derive(Serialize)]
pub struct FormResponse {
    message: String,
    form: Form,
}

#[derive(Serialize)]
pub struct FormListResponse {
    message: String,
    forms: Vec<Form>,
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<String>,
    Json(req): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<FormResponse>), ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    if req.name.is_empty() {
        return Err(CoreError::InvalidArgument("Name is required".to_string()).into());
    }
    let folder_id = match &req.folder_id {
        Some(raw) => Some(parse_id(raw, "folderId")?),
        None => None,
    };

    let mut store = state.store.write().await;
    if store.form_by_name(user_id, &req.name).is_some() {
        return Err(CoreError::Conflict(format!(
            "Form with the name \"{}\" already exists.",
            req.name
        ))
        .into());
    }

    let form = Form {
        id: Uuid::new_v4(),
        name: req.name,
        user_id,
        folder_id,
    };
    store.put_form(form.clone()).map_err(CoreError::Store)?;
    Ok((
        StatusCode::CREATED,
        Json(FormResponse {
            message: "Form created successfully".to_string(),
            form,
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    folder_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<FormListResponse>, ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    let folder_id = match &params.folder_id {
        Some(raw) => Some(parse_id(raw, "folderId")?),
        None => None,
    };
    let store = state.store.read().await;
    Ok(Json(FormListResponse {
        message: "Forms fetched successfully".to_string(),
        forms: store.forms_for_user(user_id, folder_id),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path((user_id, form_id)): Path<(String, String)>,
) -> Result<Json<FormResponse>, ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    let form_id = parse_id(&form_id, "formId")?;
    let mut store = state.store.write().await;
    let form = store
        .delete_form(user_id, form_id)
        .map_err(CoreError::Store)?
        .ok_or_else(|| {
            CoreError::NotFound("No form found with the specified userId and formId".to_string())
        })?;
    Ok(Json(FormResponse {
        message: "Form deleted successfully".to_string(),
        form,
    }))
}
