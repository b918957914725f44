//! User Model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

/// User entity (one row of `sys_user`)
///
/// `password` holds the argon2 PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub nickname: String,
    pub phone: String,
    pub email: String,
    /// Single role; 0 = superuser (sees every menu)
    pub role_id: i64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<i64>,
}

fn default_true() -> bool {
    true
}

/// An empty email means "no email" and is always accepted
fn email_or_empty(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("email is invalid".into()))
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6-128 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 64, message = "nickname must be at most 64 characters"))]
    pub nickname: String,
    #[serde(default)]
    #[validate(length(max = 32, message = "phone must be at most 32 characters"))]
    pub phone: String,
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Update user payload
///
/// Omitted fields keep their value. An omitted **or empty** `password` keeps
/// the stored hash, while an empty `email` clears the stored address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 128, message = "password must be at most 128 characters"))]
    pub password: Option<String>,
    #[validate(length(max = 64, message = "nickname must be at most 64 characters"))]
    pub nickname: Option<String>,
    #[validate(length(max = 32, message = "phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
    pub role_id: Option<i64>,
    pub active: Option<bool>,
}

impl UserUpdate {
    /// The new plaintext password, if the caller actually supplied one
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// User list filters (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// Substring match
    pub username: Option<String>,
    /// Substring match
    pub nickname: Option<String>,
    /// Substring match
    pub phone: Option<String>,
    /// Substring match
    pub email: Option<String>,
    pub role_id: Option<i64>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refreshToken is required"))]
    pub refresh_token: String,
}

/// Change own password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "oldPassword is required"))]
    pub old_password: String,
    #[validate(length(min = 6, max = 128, message = "newPassword must be 6-128 characters"))]
    pub new_password: String,
}

/// Administrative password reset
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, max = 128, message = "password must be 6-128 characters"))]
    pub password: String,
}
