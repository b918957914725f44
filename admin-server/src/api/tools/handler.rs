//! Tools API Handlers

use axum::extract::{Extension, State};
use shared::models::{ExecuteSqlRequest, GenRequest, GeneratedFile, SqlResult, TableColumn};
use shared::{ApiResponse, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::services::{codegen, db_inspector};
use crate::utils::{ApiPath, ValidJson};

/// GET /api/v1/tools/db/tables
pub async fn tables(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<String>>> {
    let tables = db_inspector::list_tables(&state.pool).await?;
    Ok(ApiResponse::success(tables))
}

/// GET /api/v1/tools/db/tables/{name}/columns
pub async fn columns(
    State(state): State<ServerState>,
    ApiPath(name): ApiPath<String>,
) -> AppResult<ApiResponse<Vec<TableColumn>>> {
    let columns = db_inspector::table_columns(&state.pool, &name).await?;
    Ok(ApiResponse::success(columns))
}

/// POST /api/v1/tools/db/execute
///
/// 每条语句都写入安全日志, 无论成功与否
pub async fn execute(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidJson(req): ValidJson<ExecuteSqlRequest>,
) -> AppResult<ApiResponse<SqlResult>> {
    match db_inspector::execute(&state.pool, &req.sql).await {
        Ok(result) => {
            security_log!(
                INFO,
                "sql_executed",
                user_id = current_user.id,
                username = %current_user.username,
                rows = result.rows.len(),
                rows_affected = ?result.rows_affected,
                sql = %req.sql
            );
            Ok(ApiResponse::success(result))
        }
        Err(e) => {
            security_log!(
                WARN,
                "sql_rejected",
                user_id = current_user.id,
                username = %current_user.username,
                code = %e.code,
                reason = %e.message,
                sql = %req.sql
            );
            Err(e)
        }
    }
}

/// POST /api/v1/tools/gen/preview
pub async fn preview(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<GenRequest>,
) -> AppResult<ApiResponse<Vec<GeneratedFile>>> {
    let files = codegen::preview(&state.pool, &req).await?;
    Ok(ApiResponse::success(files))
}
