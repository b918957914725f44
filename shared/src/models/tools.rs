//! DB inspector and code generator DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Column metadata reflected from a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub name: String,
    /// Declared SQL type, upper-cased (may be empty)
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Raw SQL console request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExecuteSqlRequest {
    #[validate(length(min = 1, max = 20000, message = "sql must be 1-20000 characters"))]
    pub sql: String,
}

/// Raw SQL console result
///
/// Row-returning statements fill `columns`/`rows`; others fill `rowsAffected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlResult {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub rows_affected: Option<u64>,
    /// Set when the row limit cut the result short
    pub truncated: bool,
}

/// Code generation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenRequest {
    #[validate(length(min = 1, max = 128, message = "table must be 1-128 characters"))]
    pub table: String,
    /// Overrides the struct name derived from the table
    pub struct_name: Option<String>,
    /// API prefix used by the generated TypeScript client, defaults to `/api/v1`
    pub api_prefix: Option<String>,
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub language: String,
    pub content: String,
}
