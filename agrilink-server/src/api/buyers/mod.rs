//! Buyer API 模块 (注册)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Buyer router
pub fn router() -> Router<ServerState> {
    // 买家注册：公共路由
    Router::new().route("/api/buyers", post(handler::register))
}
