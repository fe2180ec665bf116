use axum::{body::Body, http::Request, Router};
use chatform::api::{self, AppState};
use chatform_core::{
    auth::{Hs256Tokens, TokenVerifier},
    store::Store,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::util::ServiceExt;

const FRONTEND: &str = "http://frontend.test";

fn test_app(dir: &Path) -> Router {
    let store = Store::open(dir).unwrap();
    let tokens = Arc::new(Hs256Tokens::new("test-secret"));
    let verifier: Arc<dyn TokenVerifier> = tokens.clone();
    api::router(AppState {
        store: Arc::new(RwLock::new(store)),
        tokens,
        verifier,
        frontend_url: FRONTEND.to_string(),
    })
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn signup(app: &Router, name: &str, email: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "Passw0rd!",
            "confirmPassword": "Passw0rd!"
        })),
    )
    .await;
    assert_eq!(status, 200, "signup failed: {body}");
    (
        body["data"]["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_folder(app: &Router, user_id: &str, token: &str, name: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        &format!("/folder/{user_id}"),
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    body["folder"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn upsert_creates_then_merges() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;
    signup(&app, "anna", "anna@example.com").await;

    let folder_a = create_folder(&app, &owner_id, &owner_token, "alpha").await;
    let folder_b = create_folder(&app, &owner_id, &owner_token, "beta").await;

    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({
            "owner": owner_id,
            "folders": [folder_a],
            "sharedBy": "email",
            "sharedWith": [{"email": "anna@example.com", "permission": "view"}]
        })),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["message"], "Workspace created successfully.");
    assert_eq!(body["workspace"]["sharedWith"].as_array().unwrap().len(), 1);
    assert_eq!(body["workspace"]["sharedBy"], "email");

    // a second upsert merges folders and upgrades the existing grant
    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({
            "owner": owner_id,
            "folders": [folder_a, folder_b],
            "sharedWith": [{"email": "anna@example.com", "permission": "edit"}]
        })),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["message"], "Workspace updated successfully.");
    let folders = body["workspace"]["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 2);
    let grants = body["workspace"]["sharedWith"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["permission"], "edit");
}

#[tokio::test]
async fn upsert_validation_failures() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;

    // malformed folder reference
    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({"owner": owner_id, "folders": ["not-a-uuid"]})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Folders must be an array of valid IDs.");

    // unknown share-target email
    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({
            "owner": owner_id,
            "sharedWith": [{"email": "ghost@example.com", "permission": "view"}]
        })),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User with email ghost@example.com not found.");

    // sharing with the owner's own email
    let (status, _) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({
            "owner": owner_id,
            "sharedWith": [{"email": "owner@example.com", "permission": "edit"}]
        })),
    )
    .await;
    assert_eq!(status, 400);

    // nothing was persisted: the owner still has no workspace
    let (status, body) = request(&app, "GET", "/share/dashboard/view", Some(&owner_token), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Workspace not found.");

    // unknown owner
    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({"owner": uuid::Uuid::new_v4().to_string()})),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Owner not found.");
}

#[tokio::test]
async fn grant_share_upgrade_and_noop() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;
    let (_, anna_token) = signup(&app, "anna", "anna@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({"owner": owner_id})),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    let workspace_id = body["workspace"]["id"].as_str().unwrap().to_string();

    let grant_uri = |mode: &str| format!("/share/workspace/{workspace_id}?mode={mode}");

    let (status, body) = request(&app, "GET", &grant_uri("view"), Some(&anna_token), None).await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(
        body["message"],
        "Access granted with 'view' permission to the workspace."
    );

    let (status, body) = request(&app, "GET", &grant_uri("edit"), Some(&anna_token), None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["message"],
        "Permission updated to 'edit' for the workspace."
    );

    let (status, body) = request(&app, "GET", &grant_uri("edit"), Some(&anna_token), None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["message"],
        "You already have 'edit' access to this workspace."
    );
    assert_eq!(body["workspace"]["sharedWith"].as_array().unwrap().len(), 1);

    // owners cannot grant themselves access
    let (status, body) = request(&app, "GET", &grant_uri("view"), Some(&owner_token), None).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["message"],
        "You cannot share the workspace with yourself."
    );

    // bad mode and unknown workspace
    let (status, _) = request(&app, "GET", &grant_uri("admin"), Some(&anna_token), None).await;
    assert_eq!(status, 400);
    let (status, _) = request(
        &app,
        "GET",
        &format!("/share/workspace/{}?mode=view", uuid::Uuid::new_v4()),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn shared_workspaces_resolve_for_the_grantee() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;
    let (anna_id, anna_token) = signup(&app, "anna", "anna@example.com").await;

    let folder = create_folder(&app, &owner_id, &owner_token, "shared").await;
    let dangling = uuid::Uuid::new_v4().to_string();

    let (status, _) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({
            "owner": owner_id,
            "folders": [folder, dangling],
            "sharedWith": [{"email": "anna@example.com", "permission": "view"}]
        })),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/workspaces/{anna_id}"),
        Some(&anna_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    let workspaces = body["workspaces"].as_array().unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0]["name"], "owner");
    // the dangling reference is dropped from the resolved view
    assert_eq!(workspaces[0]["folders"].as_array().unwrap().len(), 1);
    assert_eq!(workspaces[0]["folders"][0]["id"], folder.as_str());
    assert_eq!(workspaces[0]["sharedWith"][0]["user"]["name"], "anna");

    // the owner does not appear in their own grant list
    let (status, body) = request(
        &app,
        "GET",
        &format!("/workspaces/{owner_id}"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["workspaces"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn remove_item_prunes_references_only() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;

    let folder = create_folder(&app, &owner_id, &owner_token, "pruned").await;
    let (status, _) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({"owner": owner_id, "folders": [folder]})),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/workspaces/{owner_id}/items/{folder}"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert!(body["workspace"]["folders"].as_array().unwrap().is_empty());

    // the folder document itself survives
    let (status, body) = request(
        &app,
        "GET",
        &format!("/folder/{owner_id}"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["folders"].as_array().unwrap().len(), 1);

    // removing it again is not found
    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/workspaces/{owner_id}/items/{folder}"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Item not found in workspace.");

    // malformed ids share one message
    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/workspaces/{owner_id}/items/not-a-uuid"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Invalid workspace or item ID.");
}

#[tokio::test]
async fn shareable_link_embeds_workspace_and_mode() {
    let tempdir = tempfile::tempdir().unwrap();
    let app = test_app(tempdir.path());
    let (owner_id, owner_token) = signup(&app, "owner", "owner@example.com").await;

    // no workspace yet
    let (status, body) = request(&app, "GET", "/share/dashboard/view", Some(&owner_token), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Workspace not found.");

    let (status, body) = request(
        &app,
        "POST",
        "/workspaces",
        Some(&owner_token),
        Some(json!({"owner": owner_id})),
    )
    .await;
    assert_eq!(status, 201);
    let workspace_id = body["workspace"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(&app, "GET", "/share/dashboard/edit", Some(&owner_token), None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["shareableLink"],
        format!("{FRONTEND}/share/dashboard/{workspace_id}?mode=edit")
    );

    let (status, _) = request(&app, "GET", "/share/dashboard/admin", Some(&owner_token), None).await;
    assert_eq!(status, 400);
}
