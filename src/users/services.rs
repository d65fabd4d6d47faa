use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{RegisterInput, UpdateInput, UserResponse};
use super::password::hash_password;
use super::repo::UserStore;
use super::repo_types::{NewUser, UserChanges};
use crate::error::UserError;

/// Registration and profile update pipelines over an injected store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, payload: &Value) -> Result<UserResponse, UserError> {
        let input = RegisterInput::parse(payload).inspect_err(log_rejected)?;

        if self.store.find_by_email(&input.email).await?.is_some() {
            warn!(email = %input.email, "email already registered");
            return Err(UserError::Conflict);
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .store
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                provider: false,
            })
            .await
            .inspect_err(|e| warn!(error = %e, "create user rejected"))?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            provider: user.provider,
        })
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, user_id: Uuid, payload: &Value) -> Result<UserResponse, UserError> {
        let input = UpdateInput::parse(payload).inspect_err(log_rejected)?;

        let user = self.store.find_by_id(user_id).await?.ok_or_else(|| {
            warn!(%user_id, "authenticated user not found");
            UserError::NotFound
        })?;

        if let Some(email) = input.email.as_deref() {
            if email != user.email && self.store.find_by_email(email).await?.is_some() {
                warn!(%user_id, email, "email already in use");
                return Err(UserError::Conflict);
            }
        }

        if let Some(old) = input.old_password.as_deref() {
            if !user.check_password(old)? {
                warn!(%user_id, "old password does not match");
                return Err(UserError::PasswordMismatch);
            }
        }

        let password_hash = input.password.as_deref().map(hash_password).transpose()?;
        let updated = self
            .store
            .update(
                user.id,
                UserChanges {
                    name: input.name,
                    email: input.email.clone(),
                    password_hash,
                },
            )
            .await
            .inspect_err(|e| warn!(error = %e, %user_id, "update user rejected"))?;

        info!(%user_id, "user updated");
        Ok(UserResponse {
            id: updated.id,
            name: updated.name,
            // echo what the caller submitted; fall back to the stored email
            email: input.email.unwrap_or(user.email),
            provider: updated.provider,
        })
    }
}

fn log_rejected(e: &UserError) {
    if let UserError::Validation(violations) = e {
        warn!(?violations, "validation failed");
    }
}
