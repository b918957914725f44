//! Role API Handlers

use axum::extract::{Extension, State};
use shared::models::{
    ApiGrant, AssignApisRequest, AssignMenusRequest, Role, RoleCreate, RoleQuery, RoleUpdate,
};
use shared::{ApiResponse, AppResult, PageResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::role as service;
use crate::utils::{ApiPath, ApiQuery, ValidJson};

/// GET /api/v1/role
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<RoleQuery>,
) -> AppResult<ApiResponse<PageResult<Role>>> {
    let page = service::list_roles(&state.pool, &query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/role/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Role>> {
    let role = service::get_role(&state.pool, id).await?;
    Ok(ApiResponse::success(role))
}

/// POST /api/v1/role
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<RoleCreate>,
) -> AppResult<ApiResponse<Role>> {
    tracing::info!(
        operator_id = current_user.id,
        role_key = %payload.role_key,
        "Creating role"
    );
    let role = service::create_role(&state.pool, &payload).await?;
    Ok(ApiResponse::success(role))
}

/// PUT /api/v1/role/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(payload): ValidJson<RoleUpdate>,
) -> AppResult<ApiResponse<Role>> {
    tracing::info!(operator_id = current_user.id, role_id = id, "Updating role");
    let role = service::update_role(&state.pool, id, &payload).await?;
    Ok(ApiResponse::success(role))
}

/// DELETE /api/v1/role/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(operator_id = current_user.id, role_id = id, "Deleting role");
    service::delete_role(&state.pool, id).await?;
    Ok(ApiResponse::ok())
}

/// GET /api/v1/role/{id}/menus
pub async fn get_menus(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<i64>>> {
    let ids = service::get_role_menus(&state.pool, id).await?;
    Ok(ApiResponse::success(ids))
}

/// PUT /api/v1/role/{id}/menus - 整体替换角色菜单
pub async fn assign_menus(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<AssignMenusRequest>,
) -> AppResult<ApiResponse<Vec<i64>>> {
    tracing::info!(
        operator_id = current_user.id,
        role_id = id,
        requested = req.menu_ids.len(),
        "Assigning role menus"
    );
    let ids = service::assign_menus(&state.pool, id, &req.menu_ids).await?;
    Ok(ApiResponse::success(ids))
}

/// GET /api/v1/role/{id}/apis
pub async fn get_apis(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<ApiGrant>>> {
    let grants = service::get_role_apis(&state.pool, &state.policy_store, id).await?;
    Ok(ApiResponse::success(grants))
}

/// PUT /api/v1/role/{id}/apis - 整体替换角色 API 授权
pub async fn assign_apis(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<AssignApisRequest>,
) -> AppResult<ApiResponse<Vec<ApiGrant>>> {
    tracing::info!(operator_id = current_user.id, role_id = id, "Assigning role APIs");
    let grants = service::assign_apis(&state.pool, &state.policy_store, id, &req.apis).await?;
    Ok(ApiResponse::success(grants))
}
