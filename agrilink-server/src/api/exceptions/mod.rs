//! Exception Auditor API
//!
//! 只读：扫描状态矛盾的配送，或调查单个配送

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Exception router (admin only)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/exceptions", get(handler::list))
        .route("/api/exceptions/{delivery_id}", get(handler::investigate))
}
