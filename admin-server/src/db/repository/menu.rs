//! Menu Repository
//!
//! Every multi-row read is ordered `(sort, id)`, the order the tree builder
//! expects.

use super::{RepoError, RepoResult};
use shared::models::{Menu, MenuCreate, MenuUpdate};
use shared::util::now_millis;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str =
    "id, parent_id, path, name, component, sort, meta, btn_perms, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Menu>> {
    let menus = sqlx::query_as::<_, Menu>(&format!(
        "SELECT {COLUMNS} FROM sys_menu ORDER BY sort ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(menus)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Menu>> {
    let menu = sqlx::query_as::<_, Menu>(&format!("SELECT {COLUMNS} FROM sys_menu WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(menu)
}

/// Parent of `id`, `None` when the menu does not exist
pub async fn parent_of(pool: &SqlitePool, id: i64) -> RepoResult<Option<i64>> {
    let parent = sqlx::query_scalar("SELECT parent_id FROM sys_menu WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(parent)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    Ok(parent_of(pool, id).await?.is_some())
}

pub async fn count_children(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM sys_menu WHERE parent_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Menus associated with `role_id` through `sys_role_menus`
pub async fn find_by_role(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Menu>> {
    find_by_role_ids(pool, &[role_id]).await
}

/// Distinct union of the menus of several roles
pub async fn find_by_role_ids(pool: &SqlitePool, role_ids: &[i64]) -> RepoResult<Vec<Menu>> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {COLUMNS} FROM sys_menu WHERE id IN (SELECT menu_id FROM sys_role_menus WHERE role_id IN ("
    ));
    let mut separated = qb.separated(", ");
    for role_id in role_ids {
        separated.push_bind(*role_id);
    }
    separated.push_unseparated(")) ORDER BY sort ASC, id ASC");
    let menus = qb.build_query_as::<Menu>().fetch_all(pool).await?;
    Ok(menus)
}

pub async fn create(pool: &SqlitePool, data: &MenuCreate) -> RepoResult<Menu> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sys_menu (parent_id, path, name, component, sort, meta, btn_perms, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.parent_id)
    .bind(&data.path)
    .bind(&data.name)
    .bind(&data.component)
    .bind(data.sort)
    .bind(Json(&data.meta))
    .bind(Json(&data.btn_perms))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &MenuUpdate) -> RepoResult<Menu> {
    let rows = sqlx::query(
        "UPDATE sys_menu SET parent_id = COALESCE(?1, parent_id), path = COALESCE(?2, path), \
         name = COALESCE(?3, name), component = COALESCE(?4, component), sort = COALESCE(?5, sort), \
         meta = COALESCE(?6, meta), btn_perms = COALESCE(?7, btn_perms), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.parent_id)
    .bind(data.path.as_deref())
    .bind(data.name.as_deref())
    .bind(data.component.as_deref())
    .bind(data.sort)
    .bind(data.meta.as_ref().map(Json))
    .bind(data.btn_perms.as_ref().map(Json))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu {id} not found")))
}

/// Delete the menu row and every role association pointing at it
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM sys_role_menus WHERE menu_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM sys_menu WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}
