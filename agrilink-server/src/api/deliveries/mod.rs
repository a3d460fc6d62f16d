//! Delivery API Module
//!
//! 配送列表、交接确认 (双码握手) 与管理员强制放款

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Delivery router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/deliveries", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/override", post(handler::override_exception))
}
