//! Unified error codes for the admin console
//!
//! This module defines every code the API can put in the `code` field of the
//! response envelope. Error codes are organized by category:
//! - 0xxx: General errors (500/501 are reserved for system failures)
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: User errors
//! - 4xxx: Role errors
//! - 5xxx: Menu errors
//! - 6xxx: Tool (DB inspector / code generator) errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== System ====================
    /// Internal server error (also produced by panic recovery)
    InternalError = 500,
    /// Database error
    DatabaseError = 501,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Old password does not match
    OldPasswordIncorrect = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: User ====================
    /// User not found
    UserNotFound = 3001,
    /// Username already taken
    UsernameExists = 3002,

    // ==================== 4xxx: Role ====================
    /// Role not found
    RoleNotFound = 4001,
    /// Role key already taken
    RoleKeyExists = 4002,
    /// Role still referenced by users
    RoleInUse = 4003,

    // ==================== 5xxx: Menu ====================
    /// Menu not found
    MenuNotFound = 5001,
    /// Parent menu not found
    ParentMenuNotFound = 5002,
    /// Menu set as its own parent
    MenuSelfParent = 5003,
    /// Menu still has children
    MenuHasChildren = 5004,
    /// Menu moved under one of its descendants
    MenuCycle = 5005,

    // ==================== 6xxx: Tools ====================
    /// Table not found
    TableNotFound = 6001,
    /// SQL statement contains a blocked keyword
    SqlForbidden = 6002,
    /// SQL statement is empty or malformed
    SqlInvalid = 6003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    ///
    /// Domain messages are fixed strings the front end matches on.
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "success",
            ErrorCode::Unknown => "unknown error",
            ErrorCode::ValidationFailed => "validation failed",
            ErrorCode::NotFound => "resource not found",
            ErrorCode::AlreadyExists => "resource already exists",
            ErrorCode::InvalidRequest => "invalid request",

            // System
            ErrorCode::InternalError => "internal server error",
            ErrorCode::DatabaseError => "database error",

            // Auth
            ErrorCode::NotAuthenticated => "authentication required",
            ErrorCode::InvalidCredentials => "invalid username or password",
            ErrorCode::TokenExpired => "token expired",
            ErrorCode::TokenInvalid => "invalid token",
            ErrorCode::AccountDisabled => "user account is disabled",
            ErrorCode::OldPasswordIncorrect => "old password is incorrect",

            // Permission
            ErrorCode::PermissionDenied => "permission denied",

            // User
            ErrorCode::UserNotFound => "user not found",
            ErrorCode::UsernameExists => "username already exists",

            // Role
            ErrorCode::RoleNotFound => "role not found",
            ErrorCode::RoleKeyExists => "role key already exists",
            ErrorCode::RoleInUse => "cannot delete role with associated users",

            // Menu
            ErrorCode::MenuNotFound => "menu not found",
            ErrorCode::ParentMenuNotFound => "parent menu not found",
            ErrorCode::MenuSelfParent => "cannot set self as parent menu",
            ErrorCode::MenuHasChildren => "cannot delete menu with child menus",
            ErrorCode::MenuCycle => "cannot set descendant as parent menu",

            // Tools
            ErrorCode::TableNotFound => "table not found",
            ErrorCode::SqlForbidden => "sql contains forbidden keyword",
            ErrorCode::SqlInvalid => "invalid sql statement",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // System
            500 => Ok(ErrorCode::InternalError),
            501 => Ok(ErrorCode::DatabaseError),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::OldPasswordIncorrect),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // User
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::UsernameExists),

            // Role
            4001 => Ok(ErrorCode::RoleNotFound),
            4002 => Ok(ErrorCode::RoleKeyExists),
            4003 => Ok(ErrorCode::RoleInUse),

            // Menu
            5001 => Ok(ErrorCode::MenuNotFound),
            5002 => Ok(ErrorCode::ParentMenuNotFound),
            5003 => Ok(ErrorCode::MenuSelfParent),
            5004 => Ok(ErrorCode::MenuHasChildren),
            5005 => Ok(ErrorCode::MenuCycle),

            // Tools
            6001 => Ok(ErrorCode::TableNotFound),
            6002 => Ok(ErrorCode::SqlForbidden),
            6003 => Ok(ErrorCode::SqlInvalid),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
