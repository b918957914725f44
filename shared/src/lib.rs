//! Shared types for the admin console
//!
//! Common types used by the server and its clients including the
//! `{code, data, msg}` envelope, error codes, domain models and paging.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use response::{PageResult, Pagination};
