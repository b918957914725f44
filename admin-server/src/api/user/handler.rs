//! User API Handlers

use axum::extract::{Extension, State};
use shared::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, ResetPasswordRequest,
    User, UserCreate, UserQuery, UserUpdate,
};
use shared::{ApiResponse, AppResult, PageResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::user as service;
use crate::utils::{ApiPath, ApiQuery, ValidJson};

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let resp = service::login(&state.pool, &state.jwt_service, &req.username, &req.password).await?;
    Ok(ApiResponse::success(resp))
}

/// POST /api/v1/user/refresh
pub async fn refresh(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let resp = service::refresh(&state.pool, &state.jwt_service, &req.refresh_token).await?;
    Ok(ApiResponse::success(resp))
}

/// GET /api/v1/user/info - 当前登录用户
pub async fn info(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<User>> {
    let user = service::get_user(&state.pool, current_user.id).await?;
    Ok(ApiResponse::success(user))
}

/// GET /api/v1/user
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<ApiResponse<PageResult<User>>> {
    let page = service::get_user_list(&state.pool, &query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/user/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<User>> {
    let user = service::get_user(&state.pool, id).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/user
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<UserCreate>,
) -> AppResult<ApiResponse<User>> {
    tracing::info!(
        operator_id = current_user.id,
        username = %payload.username,
        "Creating user"
    );
    let user = service::create_user(&state.pool, &payload).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/user/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(payload): ValidJson<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    tracing::info!(operator_id = current_user.id, user_id = id, "Updating user");
    let user = service::update_user(&state.pool, id, &payload).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/user/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(operator_id = current_user.id, user_id = id, "Deleting user");
    service::delete_user(&state.pool, id).await?;
    Ok(ApiResponse::ok())
}

/// PUT /api/v1/user/password - 修改自己的密码
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    service::change_password(&state.pool, current_user.id, &req.old_password, &req.new_password)
        .await?;
    Ok(ApiResponse::ok())
}

/// PUT /api/v1/user/{id}/password - 管理员重置密码
pub async fn reset_password(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(operator_id = current_user.id, user_id = id, "Resetting password");
    service::reset_password(&state.pool, id, &req.password).await?;
    Ok(ApiResponse::ok())
}
