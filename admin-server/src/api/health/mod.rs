//! 健康检查 - 公共路由 (无需认证)

use axum::{Router, extract::State, routing::get};
use serde::Serialize;
use shared::{ApiResponse, AppResult};

use crate::core::ServerState;
use crate::db::repository::RepoError;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// 数据库往返耗时
    db_latency_ms: u64,
}

/// GET /api/v1/health
pub async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthResponse>> {
    let started = std::time::Instant::now();
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(RepoError::from)?;

    Ok(ApiResponse::success(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        db_latency_ms: started.elapsed().as_millis() as u64,
    }))
}
