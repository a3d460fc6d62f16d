//! Listing API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Listing router
pub fn router() -> Router<ServerState> {
    // 浏览公开；发布需要农户令牌 (CurrentUser 提取器)
    Router::new().route(
        "/api/listings",
        get(handler::list).post(handler::create),
    )
}
