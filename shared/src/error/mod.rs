//! Unified error system for the admin console
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type carrying a code and a message
//! - [`ApiResponse`]: The `{code, data, msg}` envelope every endpoint returns
//!
//! # Error Code Ranges
//!
//! - 0..500: General errors
//! - 500, 501: System errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: User errors
//! - 4xxx: Role errors
//! - 5xxx: Menu errors
//! - 6xxx: Tool errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::RoleInUse);
//! assert_eq!(err.message, "cannot delete role with associated users");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, 4003);
//! assert!(response.data.is_none());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
