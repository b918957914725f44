//! Menu service: CRUD with tree integrity checks

use std::collections::{HashMap, HashSet};

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Menu, MenuCreate, MenuNode, MenuUpdate};
use sqlx::SqlitePool;

use super::menu_tree;
use crate::db::repository::menu;

async fn require_menu(pool: &SqlitePool, id: i64) -> AppResult<Menu> {
    menu::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MenuNotFound))
}

async fn require_parent(pool: &SqlitePool, parent_id: i64) -> AppResult<()> {
    if parent_id != 0 && !menu::exists(pool, parent_id).await? {
        return Err(AppError::new(ErrorCode::ParentMenuNotFound));
    }
    Ok(())
}

/// Whether `candidate` sits somewhere below `id` in the stored tree
///
/// Walks the parent map loaded in one query. A chain that loops back on
/// itself without reaching `id` counts as a cycle too.
async fn is_descendant(pool: &SqlitePool, id: i64, candidate: i64) -> AppResult<bool> {
    let parents: HashMap<i64, i64> = menu::find_all(pool)
        .await?
        .into_iter()
        .map(|m| (m.id, m.parent_id))
        .collect();
    Ok(reaches(&parents, id, candidate))
}

fn reaches(parents: &HashMap<i64, i64>, id: i64, candidate: i64) -> bool {
    let mut seen = HashSet::new();
    let mut current = candidate;
    while seen.insert(current) {
        match parents.get(&current) {
            Some(0) | None => return false,
            Some(&parent) if parent == id => return true,
            Some(&parent) => current = parent,
        }
    }
    true
}

pub async fn create_menu(pool: &SqlitePool, data: &MenuCreate) -> AppResult<Menu> {
    require_parent(pool, data.parent_id).await?;
    let created = menu::create(pool, data).await?;
    tracing::info!(menu_id = created.id, parent_id = created.parent_id, "Menu created");
    Ok(created)
}

pub async fn update_menu(pool: &SqlitePool, id: i64, data: &MenuUpdate) -> AppResult<Menu> {
    require_menu(pool, id).await?;
    if let Some(parent_id) = data.parent_id {
        if parent_id == id {
            return Err(AppError::new(ErrorCode::MenuSelfParent));
        }
        require_parent(pool, parent_id).await?;
        if parent_id != 0 && is_descendant(pool, id, parent_id).await? {
            return Err(AppError::new(ErrorCode::MenuCycle));
        }
    }
    let updated = menu::update(pool, id, data).await?;
    tracing::info!(menu_id = id, "Menu updated");
    Ok(updated)
}

/// Delete a leaf menu and its role associations
pub async fn delete_menu(pool: &SqlitePool, id: i64) -> AppResult<()> {
    require_menu(pool, id).await?;
    if menu::count_children(pool, id).await? > 0 {
        return Err(AppError::new(ErrorCode::MenuHasChildren));
    }
    menu::delete(pool, id).await?;
    tracing::info!(menu_id = id, "Menu deleted");
    Ok(())
}

pub async fn get_menu(pool: &SqlitePool, id: i64) -> AppResult<Menu> {
    require_menu(pool, id).await
}

/// Every menu, flat, ordered `(sort, id)`
pub async fn list_menus(pool: &SqlitePool) -> AppResult<Vec<Menu>> {
    Ok(menu::find_all(pool).await?)
}

pub async fn get_full_tree(pool: &SqlitePool) -> AppResult<Vec<MenuNode>> {
    menu_tree::get_menu_tree(pool, 0).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::MenuMeta;

    fn create_data(parent_id: i64, name: &str) -> MenuCreate {
        MenuCreate {
            parent_id,
            path: name.to_lowercase(),
            name: name.into(),
            component: String::new(),
            sort: 0,
            meta: MenuMeta::default(),
            btn_perms: vec![],
        }
    }

    fn reparent(parent_id: i64) -> MenuUpdate {
        MenuUpdate {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_parent() {
        let db = DbService::in_memory().await.unwrap();
        let err = create_menu(&db.pool, &create_data(42, "Orphan")).await.unwrap_err();
        assert_eq!(err.message, "parent menu not found");

        let root = create_menu(&db.pool, &create_data(0, "Root")).await.unwrap();
        let child = create_menu(&db.pool, &create_data(root.id, "Child")).await.unwrap();
        assert_eq!(child.parent_id, root.id);
    }

    #[tokio::test]
    async fn test_update_parent_rules() {
        let db = DbService::in_memory().await.unwrap();
        let a = create_menu(&db.pool, &create_data(0, "A")).await.unwrap();
        let b = create_menu(&db.pool, &create_data(a.id, "B")).await.unwrap();
        let c = create_menu(&db.pool, &create_data(b.id, "C")).await.unwrap();
        let d = create_menu(&db.pool, &create_data(0, "D")).await.unwrap();

        let err = update_menu(&db.pool, a.id, &reparent(a.id)).await.unwrap_err();
        assert_eq!(err.message, "cannot set self as parent menu");

        let err = update_menu(&db.pool, a.id, &reparent(999)).await.unwrap_err();
        assert_eq!(err.message, "parent menu not found");

        let err = update_menu(&db.pool, a.id, &reparent(c.id)).await.unwrap_err();
        assert_eq!(err.message, "cannot set descendant as parent menu");

        let moved = update_menu(&db.pool, c.id, &reparent(d.id)).await.unwrap();
        assert_eq!(moved.parent_id, d.id);
        let moved = update_menu(&db.pool, b.id, &reparent(0)).await.unwrap();
        assert_eq!(moved.parent_id, 0);

        let err = update_menu(&db.pool, 999, &MenuUpdate::default()).await.unwrap_err();
        assert_eq!(err.message, "menu not found");
    }

    #[tokio::test]
    async fn test_deep_chain_is_not_a_cycle() {
        let db = DbService::in_memory().await.unwrap();
        let root = create_menu(&db.pool, &create_data(0, "Level0")).await.unwrap();
        let mut leaf = root.clone();
        for depth in 1..70 {
            leaf = create_menu(&db.pool, &create_data(leaf.id, &format!("Level{depth}")))
                .await
                .unwrap();
        }
        let other = create_menu(&db.pool, &create_data(0, "Other")).await.unwrap();

        let moved = update_menu(&db.pool, other.id, &reparent(leaf.id)).await.unwrap();
        assert_eq!(moved.parent_id, leaf.id);

        let err = update_menu(&db.pool, root.id, &reparent(other.id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuCycle);
    }

    #[test]
    fn test_reaches_stops_on_stored_loop() {
        let parents = HashMap::from([(1, 0), (2, 3), (3, 2)]);
        assert!(!reaches(&parents, 1, 1));
        assert!(reaches(&parents, 9, 2));
        assert!(!reaches(&parents, 5, 4));
    }

    #[tokio::test]
    async fn test_delete_requires_leaf() {
        let db = DbService::in_memory().await.unwrap();
        let parent = create_menu(&db.pool, &create_data(0, "Parent")).await.unwrap();
        let child = create_menu(&db.pool, &create_data(parent.id, "Child")).await.unwrap();

        let err = delete_menu(&db.pool, parent.id).await.unwrap_err();
        assert_eq!(err.message, "cannot delete menu with child menus");

        delete_menu(&db.pool, child.id).await.unwrap();
        delete_menu(&db.pool, parent.id).await.unwrap();
        assert_eq!(
            get_menu(&db.pool, parent.id).await.unwrap_err().code,
            ErrorCode::MenuNotFound
        );
    }
}
