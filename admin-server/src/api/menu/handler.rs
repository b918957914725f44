//! Menu API Handlers

use axum::extract::{Extension, State};
use shared::models::{Menu, MenuCreate, MenuNode, MenuUpdate, RouteRecord};
use shared::{ApiResponse, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{self, menu as service};
use crate::utils::{ApiPath, ValidJson};

/// GET /api/v1/menu/tree - 当前用户角色可见的菜单树
pub async fn my_tree(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<MenuNode>>> {
    let tree = services::get_menu_tree(&state.pool, current_user.role_id).await?;
    Ok(ApiResponse::success(tree))
}

/// GET /api/v1/menu/routes - 前端动态路由
pub async fn my_routes(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<RouteRecord>>> {
    let tree = services::get_menu_tree(&state.pool, current_user.role_id).await?;
    Ok(ApiResponse::success(services::build_routes(&tree)))
}

/// GET /api/v1/menu - 完整菜单树
pub async fn full_tree(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<MenuNode>>> {
    let tree = service::get_full_tree(&state.pool).await?;
    Ok(ApiResponse::success(tree))
}

/// GET /api/v1/menu/list
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Menu>>> {
    let menus = service::list_menus(&state.pool).await?;
    Ok(ApiResponse::success(menus))
}

/// GET /api/v1/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Menu>> {
    let menu = service::get_menu(&state.pool, id).await?;
    Ok(ApiResponse::success(menu))
}

/// POST /api/v1/menu
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<MenuCreate>,
) -> AppResult<ApiResponse<Menu>> {
    tracing::info!(
        operator_id = current_user.id,
        name = %payload.name,
        parent_id = payload.parent_id,
        "Creating menu"
    );
    let menu = service::create_menu(&state.pool, &payload).await?;
    Ok(ApiResponse::success(menu))
}

/// PUT /api/v1/menu/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(payload): ValidJson<MenuUpdate>,
) -> AppResult<ApiResponse<Menu>> {
    tracing::info!(operator_id = current_user.id, menu_id = id, "Updating menu");
    let menu = service::update_menu(&state.pool, id, &payload).await?;
    Ok(ApiResponse::success(menu))
}

/// DELETE /api/v1/menu/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(operator_id = current_user.id, menu_id = id, "Deleting menu");
    service::delete_menu(&state.pool, id).await?;
    Ok(ApiResponse::ok())
}
