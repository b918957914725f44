//! API Policy Store
//!
//! Per-role `(path, method)` grants. Storage is behind [`ApiPolicyStore`] so
//! an external policy engine can replace the SQLite table.

use super::RepoResult;
use shared::models::ApiGrant;
use sqlx::SqlitePool;
use std::collections::BTreeSet;

/// Storage for per-role API grants
#[allow(async_fn_in_trait)]
pub trait ApiPolicyStore {
    /// Replace every grant of `role_id`, returning the stored set
    async fn replace(&self, role_id: i64, grants: &[ApiGrant]) -> RepoResult<Vec<ApiGrant>>;

    /// Grants of `role_id`, ordered by path then method
    async fn grants(&self, role_id: i64) -> RepoResult<Vec<ApiGrant>>;
}

/// Upper-case methods, trim paths, drop empties and duplicates
pub fn normalize(grants: &[ApiGrant]) -> Vec<ApiGrant> {
    grants
        .iter()
        .map(|g| ApiGrant {
            path: g.path.trim().to_string(),
            method: g.method.trim().to_uppercase(),
        })
        .filter(|g| !g.path.is_empty() && !g.method.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// [`ApiPolicyStore`] backed by the `sys_role_apis` table
#[derive(Clone)]
pub struct SqlitePolicyStore {
    pool: SqlitePool,
}

impl SqlitePolicyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ApiPolicyStore for SqlitePolicyStore {
    async fn replace(&self, role_id: i64, grants: &[ApiGrant]) -> RepoResult<Vec<ApiGrant>> {
        let grants = normalize(grants);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sys_role_apis WHERE role_id = ?")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        for grant in &grants {
            sqlx::query("INSERT INTO sys_role_apis (role_id, path, method) VALUES (?, ?, ?)")
                .bind(role_id)
                .bind(&grant.path)
                .bind(&grant.method)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(grants)
    }

    async fn grants(&self, role_id: i64) -> RepoResult<Vec<ApiGrant>> {
        let grants = sqlx::query_as::<_, ApiGrant>(
            "SELECT path, method FROM sys_role_apis WHERE role_id = ? ORDER BY path, method",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn grant(path: &str, method: &str) -> ApiGrant {
        ApiGrant {
            path: path.into(),
            method: method.into(),
        }
    }

    #[test]
    fn test_normalize() {
        let grants = normalize(&[
            grant("/api/v1/user", "get"),
            grant(" /api/v1/user ", "GET"),
            grant("/api/v1/role", "post"),
            grant("", "GET"),
        ]);
        assert_eq!(
            grants,
            vec![grant("/api/v1/role", "POST"), grant("/api/v1/user", "GET")]
        );
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let db = DbService::in_memory().await.unwrap();
        let store = SqlitePolicyStore::new(db.pool.clone());

        store
            .replace(1, &[grant("/a", "get"), grant("/b", "post")])
            .await
            .unwrap();
        store.replace(1, &[grant("/c", "delete")]).await.unwrap();
        store.replace(2, &[grant("/a", "get")]).await.unwrap();

        assert_eq!(store.grants(1).await.unwrap(), vec![grant("/c", "DELETE")]);
        assert_eq!(store.grants(2).await.unwrap(), vec![grant("/a", "GET")]);
        assert!(store.grants(3).await.unwrap().is_empty());
    }
}
