//! Role API Module

mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/role", role_routes())
}

fn role_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/menus", get(handler::get_menus).put(handler::assign_menus))
        .route("/{id}/apis", get(handler::get_apis).put(handler::assign_apis))
}
