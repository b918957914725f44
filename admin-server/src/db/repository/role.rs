//! Role Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::Pagination;
use shared::models::{Role, RoleCreate, RoleQuery, RoleUpdate};
use shared::util::{non_blank, now_millis};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, role_name, role_key, data_scope, sort, status, remark, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {COLUMNS} FROM sys_role WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_key(pool: &SqlitePool, role_key: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM sys_role WHERE role_key = ? LIMIT 1"
    ))
    .bind(role_key)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM sys_role WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, data: &RoleCreate) -> RepoResult<Role> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sys_role (role_name, role_key, data_scope, sort, status, remark, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.role_name)
    .bind(&data.role_key)
    .bind(data.data_scope)
    .bind(data.sort)
    .bind(data.status)
    .bind(&data.remark)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &RoleUpdate) -> RepoResult<Role> {
    let rows = sqlx::query(
        "UPDATE sys_role SET role_name = COALESCE(?1, role_name), role_key = COALESCE(?2, role_key), \
         data_scope = COALESCE(?3, data_scope), sort = COALESCE(?4, sort), status = COALESCE(?5, status), \
         remark = COALESCE(?6, remark), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.role_name.as_deref())
    .bind(data.role_key.as_deref())
    .bind(data.data_scope)
    .bind(data.sort)
    .bind(data.status)
    .bind(data.remark.as_deref())
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Role {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
}

/// Delete the role row together with its menu and API associations
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM sys_role_menus WHERE role_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM sys_role_apis WHERE role_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM sys_role WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &RoleQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(name) = non_blank(query.role_name.as_deref()) {
        qb.push(" AND role_name LIKE ")
            .push_bind(like_pattern(name))
            .push(" ESCAPE '\\'");
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

/// One page of roles ordered `(sort, id)` plus the filtered total
pub async fn list(
    pool: &SqlitePool,
    query: &RoleQuery,
    page: Pagination,
) -> RepoResult<(Vec<Role>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sys_role");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM sys_role"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY sort ASC, id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let roles = qb.build_query_as::<Role>().fetch_all(pool).await?;

    Ok((roles, total))
}

/// Menu IDs currently assigned to the role, ascending
pub async fn menu_ids(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar(
        "SELECT menu_id FROM sys_role_menus WHERE role_id = ? ORDER BY menu_id",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Of `menu_ids`, the ones that exist in `sys_menu`, ascending and distinct
pub async fn existing_menu_ids(
    conn: &mut SqliteConnection,
    menu_ids: &[i64],
) -> RepoResult<Vec<i64>> {
    if menu_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT DISTINCT id FROM sys_menu WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in menu_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    let ids = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(ids)
}

/// Replace the role's menu set in one transaction
///
/// Unknown menu IDs are dropped, duplicates collapse. Returns the stored set.
pub async fn replace_menus(pool: &SqlitePool, role_id: i64, menu_ids: &[i64]) -> RepoResult<Vec<i64>> {
    let mut tx = pool.begin().await?;

    let resolved = existing_menu_ids(&mut *tx, menu_ids).await?;

    sqlx::query("DELETE FROM sys_role_menus WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    for menu_id in &resolved {
        sqlx::query("INSERT INTO sys_role_menus (role_id, menu_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(*menu_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(resolved)
}
