//! Menu tree builder
//!
//! Turns flat `sys_menu` rows into nested [`MenuNode`]s and answers which
//! menus a role can see. Trees are rebuilt on every read.

use std::collections::{HashMap, HashSet};

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Menu, MenuNode};
use sqlx::SqlitePool;

use crate::db::repository::{menu, role};

/// Nest `menus` under `parent_id`
///
/// Input order is kept at every level (callers pass rows sorted by
/// `(sort, id)`). Every node gets a `children` vector, empty for leaves. Rows
/// whose parent is not in `menus` are not reachable and do not appear. A
/// corrupt parent loop is cut at the first repeated node.
pub fn build_menu_tree(menus: &[Menu], parent_id: i64) -> Vec<MenuNode> {
    let mut by_parent: HashMap<i64, Vec<&Menu>> = HashMap::new();
    for m in menus {
        by_parent.entry(m.parent_id).or_default().push(m);
    }
    let mut visiting = HashSet::new();
    build_level(&by_parent, parent_id, &mut visiting)
}

fn build_level(
    by_parent: &HashMap<i64, Vec<&Menu>>,
    parent_id: i64,
    visiting: &mut HashSet<i64>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.get(&parent_id) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(siblings.len());
    for m in siblings {
        if !visiting.insert(m.id) {
            continue;
        }
        let children = build_level(by_parent, m.id, visiting);
        visiting.remove(&m.id);
        nodes.push(MenuNode {
            menu: (*m).clone(),
            children,
        });
    }
    nodes
}

/// Menu tree visible to `role_id`; `0` is the superuser and sees every menu
pub async fn get_menu_tree(pool: &SqlitePool, role_id: i64) -> AppResult<Vec<MenuNode>> {
    let menus = if role_id == 0 {
        menu::find_all(pool).await?
    } else {
        if !role::exists(pool, role_id).await? {
            return Err(AppError::new(ErrorCode::RoleNotFound));
        }
        menu::find_by_role(pool, role_id).await?
    };
    Ok(build_menu_tree(&menus, 0))
}

/// Tree over the deduplicated union of several roles' menus
pub async fn get_menus_by_role_ids(pool: &SqlitePool, role_ids: &[i64]) -> AppResult<Vec<MenuNode>> {
    let mut ids = role_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let menus = menu::find_by_role_ids(pool, &ids).await?;
    Ok(build_menu_tree(&menus, 0))
}
