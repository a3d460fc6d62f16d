//! Reports API Module
//!
//! 管理员汇总、农户收入对账单、市场行情与审计日志分页

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Reports router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/summary", get(handler::summary))
        .route("/api/farmers/{id}/statement", get(handler::statement))
        .route("/api/market/news", get(handler::news))
        .route("/api/audit-log", get(handler::audit_log))
}
