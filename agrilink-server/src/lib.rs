//! AgriLink Server - 农产品直销托管服务
//!
//! # 架构概述
//!
//! 农户挂牌、买家下单，货款进入托管；配送员交接时同时核对农户码和买家码，
//! 两码一致才放款给农户。交付后 24 小时内买家可申请退款，由管理员审批
//! (或按策略自动批准)。异常审计扫描状态矛盾的配送并支持强制放款。
//!
//! - **托管状态机** (`escrow`): 命令 → 事件 → 快照，redb 单事务提交
//! - **认证** (`auth`): JWT + Argon2 口令
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! agrilink-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务器
//! ├── auth/          # JWT 认证、口令哈希
//! ├── escrow/        # 托管状态机、审计、报表
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误响应、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod escrow;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use escrow::{EscrowManager, EscrowStorage};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Audit log helper - records escrow state changes
///
/// Written to the `audit` target; file logging keeps them under `logs/audit/`
/// and they are never cleaned up.
///
/// ```ignore
/// audit_log!("admin", "Refund Approved", "O003");
/// audit_log!("DA001", "Delivery Confirmed", "D002", "Payment released to F001");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            timestamp = chrono::Utc::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            details = $details,
            timestamp = chrono::Utc::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

// Security logging macro - 认证失败、口令错误、越权
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ___              _ __    _       __  
   /   | ____ ______(_) /   (_)___  / /__
  / /| |/ __ `/ ___/ / /   / / __ \/ //_/
 / ___ / /_/ / /  / / /___/ / / / / ,<   
/_/  |_\__, /_/  /_/_____/_/_/ /_/_/|_|  
      /____/                              
    "#
    );
}

/// 设置运行环境
///
/// 1. 加载 `.env` (可选)
/// 2. 初始化日志 (LOG_LEVEL / LOG_JSON)，文件日志写入 WORK_DIR/logs
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let json = std::env::var("LOG_JSON")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".to_string());
    let log_dir = std::path::Path::new(&work_dir).join("logs");
    init_logger_with_file(&level, json, log_dir.to_str())?;

    Ok(())
}
