//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 | 无 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "epoch": "6f1c...",
//!   "sequence": 42
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    /// 版本号
    version: &'static str,
    /// 实例 epoch (重启后变化)
    epoch: String,
    /// 最新事件序号 (存储不可读时为空)
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u64>,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let escrow = state.escrow.clone();
    let sequence = tokio::task::spawn_blocking(move || escrow.get_current_sequence())
        .await
        .ok()
        .and_then(|r| r.ok());

    Json(HealthResponse {
        status: if sequence.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.escrow.epoch().to_string(),
        sequence,
    })
}
