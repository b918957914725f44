//! Error types and the unified response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with structured error code
///
/// This is the primary error type for the admin console, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - A human-readable message that ends up in the envelope's `msg`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource.into()))
    }

    /// Create a not authenticated error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create a permission denied error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an invalid credentials error
    ///
    /// Used for both unknown usernames and wrong passwords.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Render this error with an explicit transport status.
    ///
    /// Only the authentication middleware uses a non-200 status.
    pub fn into_response_with_status(self, status: StatusCode) -> axum::response::Response {
        use axum::response::IntoResponse;
        (status, axum::Json(ApiResponse::<()>::from(self))).into_response()
    }
}

/// Unified API response envelope
///
/// Every response body, success or failure, has exactly three fields:
///
/// ```json
/// { "code": 0, "data": { ... }, "msg": "success" }
/// ```
///
/// `code == 0` signals success; on error `data` is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (0 for success, non-zero for errors)
    pub code: u16,
    /// Response payload, `null` on error
    pub data: Option<T>,
    /// Human-readable message
    pub msg: String,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            data: Some(data),
            msg: ErrorCode::Success.message().to_string(),
        }
    }

    /// Create a success response with custom message and data
    pub fn success_with_message(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            data: Some(data),
            msg: msg.into(),
        }
    }

    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success.code()
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self {
            code: ErrorCode::Success.code(),
            data: None,
            msg: ErrorCode::Success.message().to_string(),
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            data: None,
            msg: err.message.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code.code(),
            data: None,
            msg: err.message,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Log system errors
        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        // Errors travel in the envelope, never in the transport status
        self.into_response_with_status(StatusCode::OK)
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::RoleNotFound);
        assert_eq!(err.code, ErrorCode::RoleNotFound);
        assert_eq!(err.message, "role not found");
    }

    #[test]
    fn test_app_error_with_message() {
        let err = AppError::with_message(ErrorCode::ValidationFailed, "username is required");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        assert_eq!(AppError::not_found("User").message, "User not found");
        assert_eq!(AppError::unauthorized().code, ErrorCode::NotAuthenticated);
        assert_eq!(AppError::token_expired().code, ErrorCode::TokenExpired);
        assert_eq!(AppError::forbidden("no").code, ErrorCode::PermissionDenied);
        assert_eq!(AppError::internal("boom").code, ErrorCode::InternalError);
        assert_eq!(AppError::database("down").code, ErrorCode::DatabaseError);
        assert_eq!(
            AppError::invalid_credentials().message,
            "invalid username or password"
        );
    }

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success(42);
        assert_eq!(response.code, 0);
        assert_eq!(response.data, Some(42));
        assert!(response.is_success());
    }

    #[test]
    fn test_api_response_error_has_null_data() {
        let err = AppError::new(ErrorCode::MenuHasChildren);
        let response = ApiResponse::<()>::error(&err);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": 5004,
                "data": null,
                "msg": "cannot delete menu with child menus"
            })
        );
    }

    #[test]
    fn test_envelope_has_exactly_three_fields() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("code"));
        assert!(obj.contains_key("data"));
        assert!(obj.contains_key("msg"));
    }

    #[test]
    fn test_ok_serializes_null_data() {
        let json = serde_json::to_string(&ApiResponse::<()>::ok()).unwrap();
        assert_eq!(json, r#"{"code":0,"data":null,"msg":"success"}"#);
    }

    #[test]
    fn test_error_transport_status_is_ok() {
        let response = AppError::new(ErrorCode::UserNotFound).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_explicit_status_for_auth() {
        let response = AppError::unauthorized().into_response_with_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
