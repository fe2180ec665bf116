//! Folder CRUD. Creation and listing are keyed by the owning user id
//! in the path; deletion takes the folder id and cascades to the
//! folder's forms.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatform_core::{error::CoreError, model::Folder};

use super::{parse_id, ApiError, AppState, AuthContext};

#[derive(Deserialize)]
pub struct CreateFolderRequest {
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
pub struct FolderResponse {
    message: String,
    folder: Folder,
}

#[derive(Serialize)]
pub struct FolderListResponse {
    message: String,
    folders: Vec<Folder>,
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<String>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderResponse>), ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    if req.name.is_empty() {
        return Err(CoreError::InvalidArgument("Folder name is required.".to_string()).into());
    }

    let mut store = state.store.write().await;
    if store.folder_by_name(user_id, &req.name).is_some() {
        return Err(CoreError::Conflict(format!(
            "Folder with the name \"{}\" already exists.",
            req.name
        ))
        .into());
    }

    let folder = Folder {
        id: Uuid::new_v4(),
        name: req.name,
        user_id,
    };
    store.put_folder(folder.clone()).map_err(CoreError::Store)?;
    Ok((
        StatusCode::CREATED,
        Json(FolderResponse {
            message: "Folder created successfully".to_string(),
            folder,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<String>,
) -> Result<Json<FolderListResponse>, ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    let store = state.store.read().await;
    Ok(Json(FolderListResponse {
        message: "Folders fetched successfully".to_string(),
        folders: store.folders_for_user(user_id),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(folder_id): Path<String>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder_id = parse_id(&folder_id, "folderId")?;
    let mut store = state.store.write().await;
    let folder = store
        .delete_folder(folder_id)
        .map_err(CoreError::Store)?
        .ok_or_else(|| CoreError::NotFound("Folder not found".to_string()))?;
    Ok(Json(FolderResponse {
        message: "Folder deleted successfully".to_string(),
        folder,
    }))
}
