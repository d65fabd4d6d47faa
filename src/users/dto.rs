use serde::Serialize;
use uuid::Uuid;

use crate::error::UserError;
use crate::validation::{Validated, REGISTER_SCHEMA, UPDATE_SCHEMA};

/// Validated registration payload.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated profile update payload. `confirmPassword` is only checked, never kept.
#[derive(Debug, Default)]
pub struct UpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub old_password: Option<String>,
    pub password: Option<String>,
}

impl RegisterInput {
    pub fn parse(payload: &serde_json::Value) -> Result<Self, UserError> {
        let mut v = REGISTER_SCHEMA.validate(payload).map_err(UserError::Validation)?;
        Ok(Self {
            name: required(&mut v, "name")?,
            email: required(&mut v, "email")?,
            password: required(&mut v, "password")?,
        })
    }
}

impl UpdateInput {
    pub fn parse(payload: &serde_json::Value) -> Result<Self, UserError> {
        let mut v = UPDATE_SCHEMA.validate(payload).map_err(UserError::Validation)?;
        Ok(Self {
            name: v.take("name"),
            email: v.take("email"),
            old_password: v.take("oldPassword"),
            password: v.take("password"),
        })
    }
}

fn required(v: &mut Validated, field: &'static str) -> Result<String, UserError> {
    v.take(field).ok_or_else(|| {
        UserError::Internal(anyhow::anyhow!("validated payload lacks required field {field}"))
    })
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub provider: bool,
}
