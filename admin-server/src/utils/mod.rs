//! Utility modules
//!
//! - [`logger`] - tracing setup and the `security_log!` macro
//! - [`extract`] - envelope-reporting extractors and validation

pub mod extract;
pub mod logger;

pub use extract::{ApiPath, ApiQuery, ValidJson, validate};
pub use logger::{cleanup_old_logs, init_logger, init_logger_with_file};
