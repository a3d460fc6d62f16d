//! Event Log API
//!
//! 按序号增量拉取已提交事件，供外部对账使用

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Event router (admin only)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(handler::since))
}
