//! Menu Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Display metadata attached to a menu node
///
/// Stored as an opaque JSON blob. `hidden` is a rendering hint only: it never
/// removes a node from the tree or from the generated routes. Keys other than
/// the four typed ones are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuMeta {
    pub icon: String,
    pub title: String,
    pub hidden: bool,
    pub keep_alive: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Menu entity (one row of `sys_menu`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    /// 0 = root
    pub parent_id: i64,
    pub path: String,
    pub name: String,
    /// Front-end view identifier
    pub component: String,
    pub sort: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub meta: MenuMeta,
    /// Fine-grained button permission tokens, e.g. ["user:add", "user:delete"]
    #[cfg_attr(feature = "db", sqlx(json))]
    pub btn_perms: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A menu with its nested children
///
/// `children` is always present, empty for leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(MenuNode::count).sum::<usize>()
    }
}

/// Count every node of a forest
pub fn count_nodes(tree: &[MenuNode]) -> usize {
    tree.iter().map(MenuNode::count).sum()
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreate {
    #[serde(default)]
    pub parent_id: i64,
    #[validate(length(min = 1, max = 255, message = "path must be 1-255 characters"))]
    pub path: String,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "component must be at most 255 characters"))]
    pub component: String,
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub meta: MenuMeta,
    #[serde(default)]
    pub btn_perms: Vec<String>,
}

/// Update menu payload (omitted fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdate {
    pub parent_id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "path must be 1-255 characters"))]
    pub path: Option<String>,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "component must be at most 255 characters"))]
    pub component: Option<String>,
    pub sort: Option<i64>,
    pub meta: Option<MenuMeta>,
    pub btn_perms: Option<Vec<String>>,
}

/// Client-side route record generated from a menu tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// Absolute path (parent paths joined)
    pub path: String,
    pub name: String,
    /// Lazy-loaded view for leaves, layout component for branches
    pub component: String,
    pub meta: MenuMeta,
    pub btn_perms: Vec<String>,
    pub children: Vec<RouteRecord>,
}
