//! Error taxonomy for the account endpoints.
//!
//! Every variant maps to a fixed status and a single-field `{"error": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::users::repo::StoreError;
use crate::validation::Violation;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Payload did not satisfy the schema.
    #[error("Validation fails")]
    Validation(Vec<Violation>),

    /// Another account already holds the email.
    #[error("User already exists")]
    Conflict,

    /// Submitted old password does not verify against the stored hash.
    #[error("Password does not match")]
    PasswordMismatch,

    /// The authenticated caller's account no longer exists.
    #[error("User not found")]
    NotFound,

    /// Missing or unusable bearer token.
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) | UserError::Conflict => StatusCode::BAD_REQUEST,
            UserError::PasswordMismatch | UserError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken => UserError::Conflict,
            StoreError::NotFound => UserError::NotFound,
            StoreError::Other(e) => UserError::Internal(e),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        if let UserError::Internal(e) = &self {
            tracing::error!(error = %e, "internal error");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: UserError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bodies_carry_the_literal_messages() {
        let (status, body) = render(UserError::Validation(vec![])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Validation fails" }));

        let (status, body) = render(UserError::Conflict).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "User already exists" }));

        let (status, body) = render(UserError::PasswordMismatch).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "error": "Password does not match" }));

        let (status, body) = render(UserError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "User not found" }));
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let (status, body) = render(UserError::Internal(anyhow::anyhow!("pool timed out"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn store_errors_map_onto_api_errors() {
        assert!(matches!(UserError::from(StoreError::EmailTaken), UserError::Conflict));
        assert!(matches!(UserError::from(StoreError::NotFound), UserError::NotFound));
        assert!(matches!(
            UserError::from(StoreError::Other(anyhow::anyhow!("boom"))),
            UserError::Internal(_)
        ));
    }
}
