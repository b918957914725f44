//! Business logic on top of the repositories
//!
//! Handlers stay thin: they extract, call one function here and wrap the
//! result in the envelope.

pub mod codegen;
pub mod db_inspector;
pub mod menu;
pub mod menu_tree;
pub mod role;
pub mod router;
pub mod user;

pub use menu_tree::{build_menu_tree, get_menu_tree};
pub use router::build_routes;
