//! Order API Module
//!
//! 下单、订单查询、退款与评价。所有写操作经过 EscrowManager。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::place))
        .route("/{id}", get(handler::get_by_id))
        // Refund workflow
        .route("/{id}/refund-request", post(handler::request_refund))
        .route("/{id}/refund-approve", post(handler::approve_refund))
        .route("/{id}/refund-reject", post(handler::reject_refund))
        // Rating
        .route("/{id}/rating", post(handler::rate))
        .route("/{id}/rating/skip", post(handler::skip_rating))
}
