//! API 路由模块
//!
//! 所有业务接口挂在 `/api/v1` 下, 响应统一为 `{code, data, msg}` 信封。
//!
//! - [`health`] - 健康检查
//! - [`user`] - 登录、令牌刷新、用户管理
//! - [`role`] - 角色管理、菜单与 API 授权
//! - [`menu`] - 菜单管理、菜单树、前端路由
//! - [`tools`] - 数据库查看器、代码生成

pub mod health;
pub mod menu;
pub mod role;
pub mod tools;
pub mod user;

use std::any::Any;

use axum::Router;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use http::{HeaderName, HeaderValue};
use shared::AppError;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// API 前缀
pub const API_PREFIX: &str = "/api/v1";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Handler panic -> `code = 500` envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");
    AppError::internal("internal server error").into_response()
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    let api = Router::new()
        .merge(health::router())
        .merge(user::router())
        .merge(role::router())
        .merge(menu::router())
        .merge(tools::router());

    Router::new().nest(API_PREFIX, api)
}

/// Build a fully configured application with all middleware
///
/// Used by the HTTP server and by integration tests through `oneshot`.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // Panic recovery - innermost, wraps the handlers only
        .layer(CatchPanicLayer::custom(handle_panic))
        // JWT authentication - injects CurrentUser before routes run
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        // Trace - request spans (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
