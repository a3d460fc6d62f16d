//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录与当前用户
//! - [`buyers`] - 买家注册
//! - [`listings`] - 挂牌浏览与发布
//! - [`orders`] - 下单、退款、评价
//! - [`deliveries`] - 交接确认与强制放款
//! - [`exceptions`] - 异常审计
//! - [`reports`] - 汇总、对账单、行情、审计日志
//! - [`events`] - 事件增量拉取
//!
//! 所有写操作都转换为 `EscrowCommand` 交给 `EscrowManager`，
//! 处理器本身不修改任何状态。

pub mod command;
pub mod convert;

pub mod auth;
pub mod buyers;
pub mod deliveries;
pub mod events;
pub mod exceptions;
pub mod health;
pub mod listings;
pub mod orders;
pub mod reports;

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());

    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Public
        .merge(health::router())
        .merge(auth::router())
        .merge(buyers::router())
        .merge(listings::router())
        // Escrow workflow
        .merge(orders::router())
        .merge(deliveries::router())
        // Admin / read side
        .merge(exceptions::router())
        .merge(reports::router())
        .merge(events::router())
}

/// Build the full application with state and tower layers
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    // 最后添加的 layer 在最外层
    build_router()
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
