//! User API Module

mod handler;

use axum::Router;
use axum::routing::{get, post, put};

use crate::core::ServerState;

/// User router; login and refresh are let through by the auth middleware
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/user/login", post(handler::login))
        .route("/user/refresh", post(handler::refresh))
        .route("/user/info", get(handler::info))
        .route("/user/password", put(handler::change_password))
        .route("/user", get(handler::list).post(handler::create))
        .route(
            "/user/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/user/{id}/password", put(handler::reset_password))
}
