use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{instrument, warn};

use super::dto::UserResponse;
use crate::{auth::AuthUser, error::UserError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(store).put(update))
}

/// POST /users { name, email, password }
#[instrument(skip(state, payload))]
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserResponse>, UserError> {
    let Json(payload) = payload.map_err(reject_body)?;
    state.users.register(&payload).await.map(Json)
}

/// PUT /users { name?, email?, oldPassword?, password?, confirmPassword? }
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserResponse>, UserError> {
    let Json(payload) = payload.map_err(reject_body)?;
    state.users.update(user_id, &payload).await.map(Json)
}

fn reject_body(e: JsonRejection) -> UserError {
    warn!(error = %e, "unreadable request body");
    UserError::Validation(Vec::new())
}
