//! Signup, signin and self-service profile updates.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatform_core::{
    auth,
    error::CoreError,
    model::{self, User},
};

use super::{ApiError, AppState, AuthContext};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

#[derive(Serialize)]
pub struct UserData {
    id: Uuid,
    name: String,
    email: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    message: String,
    data: UserData,
    token: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.name.is_empty()
        || req.email.is_empty()
        || req.password.is_empty()
        || req.confirm_password.is_empty()
    {
        return Err(CoreError::InvalidArgument("All fields are required".to_string()).into());
    }
    model::validate_name(&req.name)?;
    let email = model::normalize_email(&req.email);
    model::validate_email(&email)?;
    model::validate_password(&req.password)?;
    if req.password != req.confirm_password {
        return Err(
            CoreError::InvalidArgument("enter same password in both fields".to_string()).into(),
        );
    }

    let mut store = state.store.write().await;
    if store.user_by_email(&email).is_some() {
        return Err(CoreError::Conflict("Email already taken".to_string()).into());
    }

    let password_hash = auth::hash_password(&req.password).map_err(CoreError::Store)?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: req.name,
        email,
        password_hash,
        created_at: now,
        updated_at: now,
    };
    let token = state.tokens.issue(&user).map_err(CoreError::Store)?;
    let data = UserData::from(&user);
    store.put_user(user).map_err(CoreError::Store)?;

    tracing::info!(user = %data.id, "user signed up");
    Ok(Json(AuthResponse {
        message: "Sign up successfully".to_string(),
        data,
        token,
    }))
}

#[derive(Deserialize)]
pub struct SigninRequest {
    email: String,
    password: String,
}

fn invalid_credentials() -> CoreError {
    // Deliberately the same message for unknown email and bad password.
    CoreError::InvalidArgument("invalid email or password".to_string())
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = model::normalize_email(&req.email);
    let store = state.store.read().await;
    let user = store.user_by_email(&email).ok_or_else(invalid_credentials)?;
    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(invalid_credentials().into());
    }
    let token = state.tokens.issue(user).map_err(CoreError::Store)?;
    Ok(Json(AuthResponse {
        message: "Logged in successfully".to_string(),
        data: user.into(),
        token,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    name: Option<String>,
    email: Option<String>,
    old_password: Option<String>,
    new_password: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    auth_ctx: AuthContext,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.name.is_none()
        && req.email.is_none()
        && req.old_password.is_none()
        && req.new_password.is_none()
    {
        return Err(CoreError::InvalidArgument(
            "Please provide at least one field to update.".to_string(),
        )
        .into());
    }
    if req.old_password.is_some() != req.new_password.is_some() {
        return Err(CoreError::InvalidArgument(
            "Both old password and new password are required.".to_string(),
        )
        .into());
    }

    let mut store = state.store.write().await;
    let mut user = store
        .user(auth_ctx.user_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("User not found.".to_string()))?;

    if let Some(name) = req.name {
        model::validate_name(&name)?;
        user.name = name;
    }
    if let Some(email) = req.email {
        let email = model::normalize_email(&email);
        model::validate_email(&email)?;
        if let Some(existing) = store.user_by_email(&email) {
            if existing.id != user.id {
                return Err(CoreError::Conflict("Email already in use.".to_string()).into());
            }
        }
        user.email = email;
    }
    if let (Some(old), Some(new)) = (&req.old_password, &req.new_password) {
        if !auth::verify_password(old, &user.password_hash) {
            return Err(
                CoreError::InvalidArgument("Incorrect previous password.".to_string()).into(),
            );
        }
        model::validate_password(new)?;
        user.password_hash = auth::hash_password(new).map_err(CoreError::Store)?;
    }

    user.updated_at = Utc::now();
    let token = state.tokens.issue(&user).map_err(CoreError::Store)?;
    let data = UserData::from(&user);
    store.put_user(user).map_err(CoreError::Store)?;

    Ok(Json(AuthResponse {
        message: "Your data updated successfully.".to_string(),
        data,
        token,
    }))
}
