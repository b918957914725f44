//! Role service: CRUD, menu assignment and API grants

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ApiGrant, Role, RoleCreate, RoleQuery, RoleUpdate};
use shared::{PageResult, Pagination};
use sqlx::SqlitePool;

use crate::db::repository::{ApiPolicyStore, RepoError, role, user};

fn role_key_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::RoleKeyExists),
        other => other.into(),
    }
}

async fn require_role(pool: &SqlitePool, id: i64) -> AppResult<Role> {
    role::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RoleNotFound))
}

pub async fn create_role(pool: &SqlitePool, data: &RoleCreate) -> AppResult<Role> {
    if role::find_by_key(pool, &data.role_key).await?.is_some() {
        return Err(AppError::new(ErrorCode::RoleKeyExists));
    }
    // The unique index settles a race between two creators
    let created = role::create(pool, data).await.map_err(role_key_conflict)?;
    tracing::info!(role_id = created.id, role_key = %created.role_key, "Role created");
    Ok(created)
}

pub async fn update_role(pool: &SqlitePool, id: i64, data: &RoleUpdate) -> AppResult<Role> {
    require_role(pool, id).await?;
    if let Some(key) = data.role_key.as_deref()
        && let Some(other) = role::find_by_key(pool, key).await?
        && other.id != id
    {
        return Err(AppError::new(ErrorCode::RoleKeyExists));
    }
    let updated = role::update(pool, id, data).await.map_err(role_key_conflict)?;
    tracing::info!(role_id = id, "Role updated");
    Ok(updated)
}

/// Hard-delete a role nobody uses, with its menu and API associations
pub async fn delete_role(pool: &SqlitePool, id: i64) -> AppResult<()> {
    require_role(pool, id).await?;
    if user::count_by_role(pool, id).await? > 0 {
        return Err(AppError::new(ErrorCode::RoleInUse));
    }
    role::delete(pool, id).await?;
    tracing::info!(role_id = id, "Role deleted");
    Ok(())
}

pub async fn get_role(pool: &SqlitePool, id: i64) -> AppResult<Role> {
    require_role(pool, id).await
}

pub async fn list_roles(pool: &SqlitePool, query: &RoleQuery) -> AppResult<PageResult<Role>> {
    let page = Pagination::new(query.page, query.page_size);
    let (roles, total) = role::list(pool, query, page).await?;
    Ok(PageResult::new(roles, total, page))
}

/// Replace the role's menu set; unknown IDs are dropped, duplicates collapse
///
/// Runs in one transaction, so a failure leaves the previous set untouched.
pub async fn assign_menus(pool: &SqlitePool, role_id: i64, menu_ids: &[i64]) -> AppResult<Vec<i64>> {
    require_role(pool, role_id).await?;
    let stored = role::replace_menus(pool, role_id, menu_ids).await?;
    tracing::info!(
        role_id,
        requested = menu_ids.len(),
        assigned = stored.len(),
        "Role menus replaced"
    );
    Ok(stored)
}

pub async fn get_role_menus(pool: &SqlitePool, role_id: i64) -> AppResult<Vec<i64>> {
    require_role(pool, role_id).await?;
    Ok(role::menu_ids(pool, role_id).await?)
}

pub async fn assign_apis<S: ApiPolicyStore>(
    pool: &SqlitePool,
    store: &S,
    role_id: i64,
    apis: &[ApiGrant],
) -> AppResult<Vec<ApiGrant>> {
    require_role(pool, role_id).await?;
    let stored = store.replace(role_id, apis).await?;
    tracing::info!(role_id, assigned = stored.len(), "Role API grants replaced");
    Ok(stored)
}

pub async fn get_role_apis<S: ApiPolicyStore>(
    pool: &SqlitePool,
    store: &S,
    role_id: i64,
) -> AppResult<Vec<ApiGrant>> {
    require_role(pool, role_id).await?;
    Ok(store.grants(role_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::SqlitePolicyStore;
    use crate::db::repository::user::NewUser;
    use shared::models::DataScope;

    fn role_create(key: &str) -> RoleCreate {
        RoleCreate {
            role_name: key.into(),
            role_key: key.into(),
            data_scope: DataScope::All,
            sort: 0,
            status: true,
            remark: String::new(),
        }
    }

    async fn insert_menu(pool: &SqlitePool, name: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO sys_menu (parent_id, path, name, created_at, updated_at) VALUES (0, ?, ?, 0, 0) RETURNING id",
        )
        .bind(name)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_role_key() {
        let db = DbService::in_memory().await.unwrap();
        create_role(&db.pool, &role_create("admin")).await.unwrap();
        let err = create_role(&db.pool, &role_create("admin")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleKeyExists);
        assert_eq!(err.message, "role key already exists");
    }

    #[tokio::test]
    async fn test_update_rejects_key_of_other_role() {
        let db = DbService::in_memory().await.unwrap();
        let a = create_role(&db.pool, &role_create("a")).await.unwrap();
        create_role(&db.pool, &role_create("b")).await.unwrap();

        let same_key = RoleUpdate {
            role_key: Some("a".into()),
            remark: Some("kept".into()),
            ..Default::default()
        };
        assert_eq!(update_role(&db.pool, a.id, &same_key).await.unwrap().remark, "kept");

        let taken = RoleUpdate {
            role_key: Some("b".into()),
            ..Default::default()
        };
        let err = update_role(&db.pool, a.id, &taken).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleKeyExists);

        let err = update_role(&db.pool, 999, &RoleUpdate::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let db = DbService::in_memory().await.unwrap();
        let used = create_role(&db.pool, &role_create("used")).await.unwrap();
        let unused = create_role(&db.pool, &role_create("unused")).await.unwrap();
        user::create(
            &db.pool,
            NewUser {
                username: "alice",
                password_hash: "x",
                nickname: "",
                phone: "",
                email: "",
                role_id: used.id,
                active: true,
            },
        )
        .await
        .unwrap();

        let err = delete_role(&db.pool, used.id).await.unwrap_err();
        assert_eq!(err.message, "cannot delete role with associated users");
        assert!(get_role(&db.pool, used.id).await.is_ok());

        delete_role(&db.pool, unused.id).await.unwrap();
        let err = get_role(&db.pool, unused.id).await.unwrap_err();
        assert_eq!(err.message, "role not found");
    }

    #[tokio::test]
    async fn test_assign_menus_replaces_and_is_idempotent() {
        let db = DbService::in_memory().await.unwrap();
        let r = create_role(&db.pool, &role_create("ops")).await.unwrap();
        let m1 = insert_menu(&db.pool, "m1").await;
        let m2 = insert_menu(&db.pool, "m2").await;
        let m3 = insert_menu(&db.pool, "m3").await;

        assign_menus(&db.pool, r.id, &[m1, m2]).await.unwrap();
        assign_menus(&db.pool, r.id, &[m1, m2]).await.unwrap();
        assert_eq!(get_role_menus(&db.pool, r.id).await.unwrap(), vec![m1, m2]);

        assign_menus(&db.pool, r.id, &[m3]).await.unwrap();
        assert_eq!(get_role_menus(&db.pool, r.id).await.unwrap(), vec![m3]);

        let err = assign_menus(&db.pool, 999, &[m1]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }

    #[tokio::test]
    async fn test_api_grants_need_role() {
        let db = DbService::in_memory().await.unwrap();
        let store = SqlitePolicyStore::new(db.pool.clone());
        let r = create_role(&db.pool, &role_create("ops")).await.unwrap();
        let grants = vec![ApiGrant {
            path: "/api/v1/user".into(),
            method: "get".into(),
        }];

        let stored = assign_apis(&db.pool, &store, r.id, &grants).await.unwrap();
        assert_eq!(stored[0].method, "GET");
        assert_eq!(get_role_apis(&db.pool, &store, r.id).await.unwrap(), stored);

        let err = assign_apis(&db.pool, &store, 999, &grants).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }
}
