//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::StatusCode;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use shared::AppError;

/// 无需认证的 API 路径
const PUBLIC_API_ROUTES: &[&str] = &["/api/v1/user/login", "/api/v1/user/refresh", "/api/v1/health"];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证访问令牌。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - 登录、刷新令牌、健康检查
///
/// # 错误处理
///
/// 失败时返回 HTTP 401，响应体仍是统一信封 (`code` 为 1001 / 1003 / 1004)。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or_else(|| {
            security_log!(WARN, "auth_malformed", uri = %req.uri());
            unauthorized(AppError::invalid_token("invalid authorization header"))
        })?,
        None => {
            security_log!(WARN, "auth_missing", uri = %req.uri());
            return Err(unauthorized(AppError::unauthorized()));
        }
    };

    let claims = state.jwt_service.validate_access(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
        match e {
            JwtError::ExpiredToken => unauthorized(AppError::token_expired()),
            _ => unauthorized(AppError::invalid_token("invalid token")),
        }
    })?;

    let user = CurrentUser::try_from(claims).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
        unauthorized(AppError::invalid_token("malformed token claims"))
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn unauthorized(err: AppError) -> Response {
    err.into_response_with_status(StatusCode::UNAUTHORIZED)
}
