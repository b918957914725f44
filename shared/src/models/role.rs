//! Role Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Row-level visibility a role is meant to have
///
/// Stored with the role; nothing filters on it yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DataScope {
    #[default]
    All,
    Department,
    #[serde(rename = "self")]
    #[cfg_attr(feature = "db", sqlx(rename = "self"))]
    SelfOnly,
}

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub role_name: String,
    /// Unique machine key, e.g. "admin"
    pub role_key: String,
    pub data_scope: DataScope,
    pub sort: i64,
    /// Enabled flag
    pub status: bool,
    pub remark: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    #[validate(length(min = 1, max = 100, message = "roleName must be 1-100 characters"))]
    pub role_name: String,
    #[validate(length(min = 1, max = 100, message = "roleKey must be 1-100 characters"))]
    pub role_key: String,
    #[serde(default)]
    pub data_scope: DataScope,
    #[serde(default)]
    pub sort: i64,
    #[serde(default = "default_true")]
    pub status: bool,
    #[serde(default)]
    #[validate(length(max = 500, message = "remark must be at most 500 characters"))]
    pub remark: String,
}

/// Update role payload (omitted fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    #[validate(length(min = 1, max = 100, message = "roleName must be 1-100 characters"))]
    pub role_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "roleKey must be 1-100 characters"))]
    pub role_key: Option<String>,
    pub data_scope: Option<DataScope>,
    pub sort: Option<i64>,
    pub status: Option<bool>,
    #[validate(length(max = 500, message = "remark must be at most 500 characters"))]
    pub remark: Option<String>,
}

/// Role list filters (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    /// Substring match
    pub role_name: Option<String>,
    pub status: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Replace the role's menu set
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignMenusRequest {
    #[serde(default)]
    pub menu_ids: Vec<i64>,
}

/// One API access grant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ApiGrant {
    #[validate(length(min = 1, max = 255, message = "path must be 1-255 characters"))]
    pub path: String,
    #[validate(length(min = 1, max = 16, message = "method must be 1-16 characters"))]
    pub method: String,
}

/// Replace the role's API grants
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AssignApisRequest {
    #[serde(default)]
    #[validate(nested)]
    pub apis: Vec<ApiGrant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_scope_serde() {
        assert_eq!(serde_json::to_string(&DataScope::All).unwrap(), "\"all\"");
        assert_eq!(
            serde_json::to_string(&DataScope::SelfOnly).unwrap(),
            "\"self\""
        );
        let scope: DataScope = serde_json::from_str("\"department\"").unwrap();
        assert_eq!(scope, DataScope::Department);
    }

    #[test]
    fn test_role_create_defaults() {
        let create: RoleCreate =
            serde_json::from_str(r#"{"roleName":"Admin","roleKey":"admin"}"#).unwrap();
        assert_eq!(create.data_scope, DataScope::All);
        assert!(create.status);
        assert_eq!(create.sort, 0);
    }

    #[test]
    fn test_role_create_validation() {
        let create: RoleCreate =
            serde_json::from_str(r#"{"roleName":"","roleKey":"admin"}"#).unwrap();
        assert!(create.validate().is_err());
    }
}
