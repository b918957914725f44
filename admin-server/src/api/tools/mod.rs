//! Tools API Module - 数据库查看器和代码生成器

mod handler;

use axum::Router;
use axum::routing::{get, post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/tools/db/tables", get(handler::tables))
        .route("/tools/db/tables/{name}/columns", get(handler::columns))
        .route("/tools/db/execute", post(handler::execute))
        .route("/tools/gen/preview", post(handler::preview))
}
