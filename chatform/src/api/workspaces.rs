//! HTTP shim over the workspace sharing core
//! (`chatform_core::workspace`). Handlers parse and validate the wire
//! shapes, then delegate the state transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatform_core::{
    error::CoreError,
    workspace::{
        self, GrantStatus, Permission, ShareOrigin, ShareTarget, UpsertStatus, Workspace,
        WorkspaceView,
    },
};

use super::{parse_id, ApiError, AppState, AuthContext};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    #[serde(default)]
    owner: String,
    #[serde(default)]
    folders: Vec<String>,
    #[serde(default)]
    forms: Vec<String>,
    shared_by: Option<String>,
    #[serde(default)]
    shared_with: Vec<ShareTargetRequest>,
}

#[derive(Deserialize)]
pub struct ShareTargetRequest {
    email: String,
    permission: String,
}

#[derive(Serialize)]
pub struct WorkspaceResponse {
    success: bool,
    message: String,
    workspace: Workspace,
}

fn parse_refs(raw: &[String], message: &str) -> Result<Vec<Uuid>, CoreError> {
    raw.iter()
        .map(|id| {
            Uuid::parse_str(id).map_err(|_| CoreError::InvalidArgument(message.to_string()))
        })
        .collect()
}

pub async fn upsert(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<UpsertRequest>,
) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiError> {
    if req.owner.is_empty() {
        return Err(CoreError::InvalidArgument("Owner is required.".to_string()).into());
    }
    let owner = Uuid::parse_str(&req.owner)
        .map_err(|_| CoreError::InvalidArgument("Invalid owner ID.".to_string()))?;
    let folders = parse_refs(&req.folders, "Folders must be an array of valid IDs.")?;
    let forms = parse_refs(&req.forms, "Forms must be an array of valid IDs.")?;
    let shared_by = match &req.shared_by {
        Some(raw) => Some(raw.parse::<ShareOrigin>()?),
        None => None,
    };
    let mut targets = Vec::with_capacity(req.shared_with.len());
    for target in &req.shared_with {
        let permission = target.permission.parse::<Permission>().map_err(|_| {
            CoreError::InvalidArgument(
                "Each sharedWith entry must include a valid permission (\"view\" or \"edit\")."
                    .to_string(),
            )
        })?;
        targets.push(ShareTarget {
            email: target.email.clone(),
            permission,
        });
    }

    let mut store = state.store.write().await;
    let (status, workspace) =
        workspace::upsert_workspace(&mut store, owner, &folders, &forms, shared_by, &targets)?;
    let (code, message) = match status {
        UpsertStatus::Created => (StatusCode::CREATED, "Workspace created successfully."),
        UpsertStatus::Updated => (StatusCode::OK, "Workspace updated successfully."),
    };
    Ok((
        code,
        Json(WorkspaceResponse {
            success: true,
            message: message.to_string(),
            workspace,
        }),
    ))
}

#[derive(Serialize)]
pub struct WorkspaceListResponse {
    success: bool,
    message: String,
    workspaces: Vec<WorkspaceView>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<String>,
) -> Result<Json<WorkspaceListResponse>, ApiError> {
    let user_id = parse_id(&user_id, "userId")?;
    let store = state.store.read().await;
    Ok(Json(WorkspaceListResponse {
        success: true,
        message: "Workspaces fetched successfully.".to_string(),
        workspaces: workspace::workspaces_for_user(&store, user_id),
    }))
}

pub async fn remove_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let invalid = || CoreError::InvalidArgument("Invalid workspace or item ID.".to_string());
    let owner = Uuid::parse_str(&user_id).map_err(|_| invalid())?;
    let item = Uuid::parse_str(&item_id).map_err(|_| invalid())?;

    let mut store = state.store.write().await;
    let workspace = workspace::remove_item(&mut store, owner, item)?;
    Ok(Json(WorkspaceResponse {
        success: true,
        message: "Item deleted successfully from the workspace.".to_string(),
        workspace,
    }))
}

#[derive(Deserialize)]
pub struct GrantParams {
    mode: Option<String>,
}

/// Grants the authenticated requester access to a workspace. Exposed
/// as GET because share links are opened straight from a browser.
pub async fn grant_share(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<GrantParams>,
) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiError> {
    let workspace_id = parse_id(&workspace_id, "workspaceId")?;
    let mode = params
        .mode
        .as_deref()
        .unwrap_or_default()
        .parse::<Permission>()?;

    let mut store = state.store.write().await;
    let (status, workspace) = workspace::grant_share(&mut store, workspace_id, auth.user_id, mode)?;
    let (code, message) = match status {
        GrantStatus::Granted => (
            StatusCode::CREATED,
            format!("Access granted with '{mode}' permission to the workspace."),
        ),
        GrantStatus::Updated => (
            StatusCode::OK,
            format!("Permission updated to '{mode}' for the workspace."),
        ),
        GrantStatus::Already => (
            StatusCode::OK,
            format!("You already have '{mode}' access to this workspace."),
        ),
    };
    Ok((
        code,
        Json(WorkspaceResponse {
            success: true,
            message,
            workspace,
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkResponse {
    message: String,
    shareable_link: String,
}

pub async fn shareable_link(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(mode): Path<String>,
) -> Result<Json<ShareLinkResponse>, ApiError> {
    let mode = mode.parse::<Permission>()?;
    let store = state.store.read().await;
    let workspace = store
        .workspace_by_owner(auth.user_id)
        .ok_or_else(|| CoreError::NotFound("Workspace not found.".to_string()))?;
    let link = workspace::shareable_link(&state.frontend_url, workspace.id, mode);
    Ok(Json(ShareLinkResponse {
        message: "Shareable link created".to_string(),
        shareable_link: link,
    }))
}
