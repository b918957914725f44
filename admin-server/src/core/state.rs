//! Server State
//!
//! 所有 handler 共享的状态, clone 开销很小 (Arc / 连接池句柄)

use std::sync::Arc;

use shared::AppResult;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::SqlitePolicyStore;
use crate::services;

/// 服务器状态
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Arc<Config>,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 角色 API 授权存储
    pub policy_store: SqlitePolicyStore,
}

impl ServerState {
    /// 手动构造 (测试中可注入已有连接池)
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let policy_store = SqlitePolicyStore::new(pool.clone());
        Self {
            config: Arc::new(config),
            pool,
            jwt_service,
            policy_store,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 打开数据库并执行迁移
    /// 2. 空库时创建初始管理员
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_url).await?;

        if let Some(admin) =
            services::user::ensure_admin(&db.pool, &config.admin_username, &config.admin_password)
                .await?
        {
            tracing::info!(user_id = admin.id, "Initial administrator ready");
        }

        Ok(Self::new(config.clone(), db.pool))
    }
}
