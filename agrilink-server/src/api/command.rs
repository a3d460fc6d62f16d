//! 命令提交辅助函数
//!
//! 所有写操作统一经过 [`submit`]：构造命令、可选幂等键、阻塞线程执行、错误转换。

use axum::Json;
use http::HeaderMap;
use shared::escrow::{Actor, CommandResponse, EscrowCommand, EscrowCommandPayload};

use crate::api::convert::into_result;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// 客户端幂等键
pub const COMMAND_ID_HEADER: &str = "x-command-id";

/// 幂等键最大长度
const MAX_COMMAND_ID_LEN: usize = 128;

/// Read the optional `X-Command-Id` header
pub fn command_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COMMAND_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_COMMAND_ID_LEN)
        .map(str::to_string)
}

/// Build and execute a command for `actor`
pub async fn submit(
    state: &ServerState,
    actor: Actor,
    headers: &HeaderMap,
    payload: EscrowCommandPayload,
) -> AppResult<Json<ApiResponse<CommandResponse>>> {
    let mut cmd = EscrowCommand::new(actor, payload);
    if let Some(id) = command_id(headers) {
        cmd = cmd.with_command_id(id);
    }
    let resp = state.execute(cmd).await?;
    Ok(ok(into_result(resp)?))
}
