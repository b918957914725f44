//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0..500: General errors
/// - 500..1000: System errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: User errors
/// - 4xxx: Role errors
/// - 5xxx: Menu errors
/// - 6xxx and above: Tool errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors
    General,
    /// System errors (500, 501)
    System,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// User errors (3xxx)
    User,
    /// Role errors (4xxx)
    Role,
    /// Menu errors (5xxx)
    Menu,
    /// Tool errors (6xxx)
    Tools,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..500 => Self::General,
            500..1000 => Self::System,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::User,
            4000..5000 => Self::Role,
            5000..6000 => Self::Menu,
            _ => Self::Tools,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::System => "system",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::User => "user",
            Self::Role => "role",
            Self::Menu => "menu",
            Self::Tools => "tools",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
