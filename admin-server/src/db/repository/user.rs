//! User Repository
//!
//! Every read filters on `deleted_at IS NULL`; soft-deleted rows stay in the
//! table but are invisible here.

use super::{RepoError, RepoResult, like_pattern};
use shared::Pagination;
use shared::models::{User, UserQuery};
use shared::util::{non_blank, now_millis};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, username, password, nickname, phone, email, role_id, active, created_at, updated_at, deleted_at";

/// Row values for an insert
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub nickname: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub role_id: i64,
    pub active: bool,
}

/// Column changes for an update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges<'a> {
    pub username: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub nickname: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role_id: Option<i64>,
    pub active: Option<bool>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM sys_user WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM sys_user WHERE username = ? AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Whether a live user other than `exclude_id` already holds `username`
pub async fn username_taken(
    pool: &SqlitePool,
    username: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sys_user WHERE username = ? AND deleted_at IS NULL AND id != COALESCE(?, -1)",
    )
    .bind(username)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn count_live(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM sys_user WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of live users holding `role_id`
pub async fn count_by_role(pool: &SqlitePool, role_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sys_user WHERE role_id = ? AND deleted_at IS NULL",
    )
    .bind(role_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sys_user (username, password, nickname, phone, email, role_id, active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.username)
    .bind(data.password_hash)
    .bind(data.nickname)
    .bind(data.phone)
    .bind(data.email)
    .bind(data.role_id)
    .bind(data.active)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserChanges<'_>) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE sys_user SET username = COALESCE(?1, username), password = COALESCE(?2, password), \
         nickname = COALESCE(?3, nickname), phone = COALESCE(?4, phone), email = COALESCE(?5, email), \
         role_id = COALESCE(?6, role_id), active = COALESCE(?7, active), updated_at = ?8 \
         WHERE id = ?9 AND deleted_at IS NULL",
    )
    .bind(data.username)
    .bind(data.password_hash)
    .bind(data.nickname)
    .bind(data.phone)
    .bind(data.email)
    .bind(data.role_id)
    .bind(data.active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE sys_user SET password = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(password_hash)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Mark a live user deleted; `false` when there was no live row
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE sys_user SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &UserQuery) {
    qb.push(" WHERE deleted_at IS NULL");
    let like_filters = [
        ("username", &query.username),
        ("nickname", &query.nickname),
        ("phone", &query.phone),
        ("email", &query.email),
    ];
    for (column, value) in like_filters {
        if let Some(value) = non_blank(value.as_deref()) {
            qb.push(format!(" AND {column} LIKE "))
                .push_bind(like_pattern(value))
                .push(" ESCAPE '\\'");
        }
    }
    if let Some(role_id) = query.role_id {
        qb.push(" AND role_id = ").push_bind(role_id);
    }
    if let Some(active) = query.active {
        qb.push(" AND active = ").push_bind(active);
    }
}

/// One page of live users plus the total matching the filters
pub async fn list(
    pool: &SqlitePool,
    query: &UserQuery,
    page: Pagination,
) -> RepoResult<(Vec<User>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sys_user");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM sys_user"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let users = qb.build_query_as::<User>().fetch_all(pool).await?;

    Ok((users, total))
}
