//! HTTP API layer: shared state, the bearer-token extractor, error
//! mapping and the route table. Handlers live in one module per route
//! family.

pub mod designs;
pub mod folders;
pub mod forms;
pub mod responses;
pub mod users;
pub mod views;
pub mod workspaces;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use chatform_core::{
    auth::{Hs256Tokens, TokenVerifier},
    error::CoreError,
    store::Store,
};

/// Shared application state; the store handle is constructed in `main`
/// and passed in, never reached through a global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub tokens: Arc<Hs256Tokens>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub frontend_url: String,
}

/// Authenticated user resolved from the `Authorization: Bearer` header.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let Some(token) = token else {
            return Err(CoreError::Unauthenticated.into());
        };
        match state.verifier.verify(token).await {
            Some(claims) => Ok(Self {
                user_id: claims.sub,
                email: claims.email,
            }),
            None => Err(CoreError::Unauthenticated.into()),
        }
    }
}

/// Wire form of a [`CoreError`]: JSON `{"message": ...}` body with the
/// matching status code.
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::InvalidArgument(_) | CoreError::Conflict(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(serde_json::json!({ "message": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Parse a caller-supplied id, surfacing malformed references as
/// InvalidArgument rather than a bare 400.
pub(crate) fn parse_id(value: &str, what: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(value)
        .map_err(|_| CoreError::InvalidArgument(format!("Invalid {what} format.")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/signin", post(users::signin))
        .route("/user/update", post(users::update))
        .route(
            "/folder/{id}",
            post(folders::create)
                .get(folders::list)
                .delete(folders::remove),
        )
        .route("/form/{user_id}", post(forms::create).get(forms::list))
        .route("/form/{user_id}/{form_id}", delete(forms::remove))
        .route("/create/forms", post(designs::create))
        .route("/create/forms/{form_id}", get(designs::get_by_form))
        .route("/create/forms/{form_id}/link", get(designs::fill_link))
        .route("/fill/forms/{design_id}", get(designs::get_for_fill))
        .route("/filled/forms", post(responses::create))
        .route(
            "/filled/forms/{id}",
            patch(responses::update).get(responses::list_for_form),
        )
        .route("/form/view/{form_id}", post(views::record).get(views::get))
        .route("/workspaces", post(workspaces::upsert))
        .route("/workspaces/{user_id}", get(workspaces::list_for_user))
        .route(
            "/workspaces/{user_id}/items/{item_id}",
            delete(workspaces::remove_item),
        )
        .route("/share/workspace/{workspace_id}", get(workspaces::grant_share))
        .route("/share/dashboard/{mode}", get(workspaces::shareable_link))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
