//! User service: authentication, account CRUD and bootstrap

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{LoginResponse, User, UserCreate, UserQuery, UserUpdate};
use shared::{PageResult, Pagination};
use sqlx::SqlitePool;

use crate::auth::{JwtError, JwtService, hash_password, verify_password};
use crate::db::repository::user::{NewUser, UserChanges};
use crate::db::repository::{RepoError, role, user};
use crate::security_log;

fn username_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::UsernameExists),
        other => other.into(),
    }
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::internal("failed to hash password")
    })
}

async fn require_user(pool: &SqlitePool, id: i64) -> AppResult<User> {
    user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
}

async fn require_role_unless_superuser(pool: &SqlitePool, role_id: i64) -> AppResult<()> {
    if role_id != 0 && !role::exists(pool, role_id).await? {
        return Err(AppError::new(ErrorCode::RoleNotFound));
    }
    Ok(())
}

fn issue(jwt: &JwtService, user: User) -> AppResult<LoginResponse> {
    let pair = jwt
        .issue_pair(user.id, &user.username, user.role_id)
        .map_err(|e| AppError::internal(format!("failed to issue token: {e}")))?;
    Ok(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
        user,
    })
}

/// Authenticate by username and password
///
/// Unknown user and wrong password share one message. The disabled check
/// runs only after the password verified.
pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtService,
    username: &str,
    password: &str,
) -> AppResult<LoginResponse> {
    let Some(found) = user::find_by_username(pool, username).await? else {
        security_log!(WARN, "login_failed", username = %username, reason = "unknown_user");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(password, &found.password) {
        security_log!(WARN, "login_failed", username = %username, reason = "bad_password");
        return Err(AppError::invalid_credentials());
    }

    if !found.active {
        security_log!(WARN, "login_failed", username = %username, reason = "disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    security_log!(INFO, "login_success", user_id = found.id, username = %username);
    issue(jwt, found)
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(pool: &SqlitePool, jwt: &JwtService, refresh_token: &str) -> AppResult<LoginResponse> {
    let claims = jwt.validate_refresh(refresh_token).map_err(|e| {
        security_log!(WARN, "refresh_failed", error = %e);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("invalid refresh token"),
        }
    })?;

    let id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("invalid refresh token"))?;
    let found = user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::invalid_token("invalid refresh token"))?;
    if !found.active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    issue(jwt, found)
}

pub async fn create_user(pool: &SqlitePool, data: &UserCreate) -> AppResult<User> {
    if user::username_taken(pool, &data.username, None).await? {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }
    require_role_unless_superuser(pool, data.role_id).await?;

    let password_hash = hash(&data.password)?;
    let created = user::create(
        pool,
        NewUser {
            username: &data.username,
            password_hash: &password_hash,
            nickname: &data.nickname,
            phone: &data.phone,
            email: data.email.as_deref().unwrap_or_default(),
            role_id: data.role_id,
            active: data.active,
        },
    )
    .await
    .map_err(username_conflict)?;

    tracing::info!(user_id = created.id, username = %created.username, "User created");
    Ok(created)
}

/// Partial update; an omitted or empty password keeps the stored hash
pub async fn update_user(pool: &SqlitePool, id: i64, data: &UserUpdate) -> AppResult<User> {
    let existing = require_user(pool, id).await?;

    if let Some(username) = data.username.as_deref()
        && username != existing.username
        && user::username_taken(pool, username, Some(id)).await?
    {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }
    if let Some(role_id) = data.role_id {
        require_role_unless_superuser(pool, role_id).await?;
    }

    let password_hash = data.new_password().map(hash).transpose()?;
    let updated = user::update(
        pool,
        id,
        UserChanges {
            username: data.username.as_deref(),
            password_hash: password_hash.as_deref(),
            nickname: data.nickname.as_deref(),
            phone: data.phone.as_deref(),
            email: data.email.as_deref(),
            role_id: data.role_id,
            active: data.active,
        },
    )
    .await
    .map_err(username_conflict)?;

    tracing::info!(user_id = id, password_changed = password_hash.is_some(), "User updated");
    Ok(updated)
}

/// Self-service password change, requires the current password
pub async fn change_password(
    pool: &SqlitePool,
    id: i64,
    old_password: &str,
    new_password: &str,
) -> AppResult<()> {
    let existing = require_user(pool, id).await?;
    if !verify_password(old_password, &existing.password) {
        security_log!(WARN, "password_change_failed", user_id = id);
        return Err(AppError::new(ErrorCode::OldPasswordIncorrect));
    }
    let password_hash = hash(new_password)?;
    user::update_password(pool, id, &password_hash).await?;
    security_log!(INFO, "password_changed", user_id = id);
    Ok(())
}

/// Administrative password override
pub async fn reset_password(pool: &SqlitePool, id: i64, new_password: &str) -> AppResult<()> {
    require_user(pool, id).await?;
    let password_hash = hash(new_password)?;
    user::update_password(pool, id, &password_hash).await?;
    security_log!(INFO, "password_reset", user_id = id);
    Ok(())
}

/// Soft delete; the row stays but disappears from every query
pub async fn delete_user(pool: &SqlitePool, id: i64) -> AppResult<()> {
    if !user::soft_delete(pool, id).await? {
        return Err(AppError::new(ErrorCode::UserNotFound));
    }
    tracing::info!(user_id = id, "User deleted");
    Ok(())
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> AppResult<User> {
    require_user(pool, id).await
}

pub async fn get_user_list(pool: &SqlitePool, query: &UserQuery) -> AppResult<PageResult<User>> {
    let page = Pagination::new(query.page, query.page_size);
    let (users, total) = user::list(pool, query, page).await?;
    Ok(PageResult::new(users, total, page))
}

/// Create the superuser account when no live user exists
///
/// Returns the created user, `None` when accounts already exist.
pub async fn ensure_admin(pool: &SqlitePool, username: &str, password: &str) -> AppResult<Option<User>> {
    if user::count_live(pool).await? > 0 {
        return Ok(None);
    }
    let password_hash = hash(password)?;
    let admin = user::create(
        pool,
        NewUser {
            username,
            password_hash: &password_hash,
            nickname: "Administrator",
            phone: "",
            email: "",
            role_id: 0,
            active: true,
        },
    )
    .await
    .map_err(username_conflict)?;
    tracing::warn!(username = %admin.username, "Bootstrap administrator created, change its password");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::db::DbService;

    fn jwt() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-unit-test-secret-0000".into(),
            access_minutes: 5,
            refresh_minutes: 60,
            issuer: "admin-server".into(),
            audience: "admin-console".into(),
        })
    }

    fn user_create(username: &str, role_id: i64) -> UserCreate {
        UserCreate {
            username: username.into(),
            password: "secret1".into(),
            nickname: String::new(),
            phone: String::new(),
            email: None,
            role_id,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_login_paths() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();
        let alice = create_user(&db.pool, &user_create("alice", 0)).await.unwrap();

        let ok = login(&db.pool, &jwt, "alice", "secret1").await.unwrap();
        assert_eq!(ok.user.id, alice.id);
        assert!(jwt.validate_access(&ok.access_token).is_ok());

        let bad = login(&db.pool, &jwt, "alice", "wrong").await.unwrap_err();
        let unknown = login(&db.pool, &jwt, "nobody", "secret1").await.unwrap_err();
        assert_eq!(bad.code, ErrorCode::InvalidCredentials);
        assert_eq!(bad.message, unknown.message);

        update_user(
            &db.pool,
            alice.id,
            &UserUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // Wrong password still wins over the disabled flag
        let err = login(&db.pool, &jwt, "alice", "wrong").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        let err = login(&db.pool, &jwt, "alice", "secret1").await.unwrap_err();
        assert_eq!(err.message, "user account is disabled");
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();
        create_user(&db.pool, &user_create("bob", 0)).await.unwrap();
        let pair = login(&db.pool, &jwt, "bob", "secret1").await.unwrap();

        let renewed = refresh(&db.pool, &jwt, &pair.refresh_token).await.unwrap();
        assert_eq!(renewed.user.username, "bob");

        let err = refresh(&db.pool, &jwt, &pair.access_token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[tokio::test]
    async fn test_create_rules() {
        let db = DbService::in_memory().await.unwrap();
        let created = create_user(&db.pool, &user_create("carol", 0)).await.unwrap();
        assert!(created.password.starts_with("$argon2"));

        let err = create_user(&db.pool, &user_create("carol", 0)).await.unwrap_err();
        assert_eq!(err.message, "username already exists");

        let err = create_user(&db.pool, &user_create("dave", 77)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }

    #[tokio::test]
    async fn test_empty_email_clears_address() {
        let db = DbService::in_memory().await.unwrap();
        let mut data = user_create("gina", 0);
        data.email = Some("gina@example.com".into());
        let gina = create_user(&db.pool, &data).await.unwrap();
        assert_eq!(gina.email, "gina@example.com");

        let cleared = update_user(
            &db.pool,
            gina.id,
            &UserUpdate {
                email: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.email, "");

        let mut data = user_create("hank", 0);
        data.email = Some(String::new());
        assert_eq!(create_user(&db.pool, &data).await.unwrap().email, "");
    }

    #[tokio::test]
    async fn test_update_empty_password_keeps_hash() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();
        let erin = create_user(&db.pool, &user_create("erin", 0)).await.unwrap();

        let updated = update_user(
            &db.pool,
            erin.id,
            &UserUpdate {
                password: Some(String::new()),
                nickname: Some("Erin".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.password, erin.password);
        assert!(login(&db.pool, &jwt, "erin", "secret1").await.is_ok());

        update_user(
            &db.pool,
            erin.id,
            &UserUpdate {
                password: Some("changed1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(login(&db.pool, &jwt, "erin", "changed1").await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_username() {
        let db = DbService::in_memory().await.unwrap();
        create_user(&db.pool, &user_create("frank", 0)).await.unwrap();
        let gina = create_user(&db.pool, &user_create("gina", 0)).await.unwrap();
        let err = update_user(
            &db.pool,
            gina.id,
            &UserUpdate {
                username: Some("frank".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UsernameExists);
    }

    #[tokio::test]
    async fn test_password_change_and_reset() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();
        let hank = create_user(&db.pool, &user_create("hank", 0)).await.unwrap();

        let err = change_password(&db.pool, hank.id, "nope", "newpass1").await.unwrap_err();
        assert_eq!(err.message, "old password is incorrect");

        change_password(&db.pool, hank.id, "secret1", "newpass1").await.unwrap();
        assert!(login(&db.pool, &jwt, "hank", "newpass1").await.is_ok());

        reset_password(&db.pool, hank.id, "reset123").await.unwrap();
        assert!(login(&db.pool, &jwt, "hank", "reset123").await.is_ok());
    }

    #[tokio::test]
    async fn test_soft_delete_twice() {
        let db = DbService::in_memory().await.unwrap();
        let ivy = create_user(&db.pool, &user_create("ivy", 0)).await.unwrap();
        delete_user(&db.pool, ivy.id).await.unwrap();
        let err = delete_user(&db.pool, ivy.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert!(get_user(&db.pool, ivy.id).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_admin_only_on_empty_table() {
        let db = DbService::in_memory().await.unwrap();
        let admin = ensure_admin(&db.pool, "admin", "admin123").await.unwrap();
        assert_eq!(admin.map(|u| u.role_id), Some(0));
        assert!(ensure_admin(&db.pool, "admin", "admin123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination_shape() {
        let db = DbService::in_memory().await.unwrap();
        for i in 0..12 {
            create_user(&db.pool, &user_create(&format!("user{i:02}"), 0)).await.unwrap();
        }
        let page = get_user_list(&db.pool, &UserQuery::default()).await.unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.list.len(), 10);
        assert_eq!((page.page, page.page_size), (1, 10));
    }
}
