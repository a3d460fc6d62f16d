use std::path::PathBuf;
use std::str::FromStr;

use shared::escrow::Secret;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};
use crate::escrow::EscrowPolicy;

/// 开发环境管理员默认口令
const DEV_ADMIN_PASSCODE: &str = "000000";

/// 数据库文件名
pub const DB_FILE_NAME: &str = "agrilink.redb";

/// 服务器配置 - AgriLink 服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | REFUND_WINDOW_HOURS | 24 | 退款窗口 (小时) |
/// | REFUND_AUTO_APPROVE | false | 已核验订单退款自动批准 |
/// | SEED_DEMO_DATA | true | 首次启动写入演示数据 |
/// | ADMIN_USERNAME | admin | 管理员用户名 |
/// | ADMIN_PASSCODE | 000000 (仅开发) | 管理员口令，生产环境必填 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | JWT_SECRET 等 | - | 见 [`JwtConfig::from_env`] |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/agrilink HTTP_PORT=8080 REFUND_AUTO_APPROVE=true cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 是否输出 JSON 日志
    pub log_json: bool,
    /// 退款窗口 (小时)
    pub refund_window_hours: u32,
    /// 是否自动批准已核验订单的退款
    pub refund_auto_approve: bool,
    /// 首次启动是否写入演示数据
    pub seed_demo_data: bool,
    /// 管理员用户名
    pub admin_username: String,
    /// 管理员口令 (启动时哈希，明文不保留在状态中)
    pub admin_passcode: Secret,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

/// 读取环境变量，缺失或解析失败时使用默认值
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。生产环境缺少
    /// `ADMIN_PASSCODE` 或 `JWT_SECRET` 时返回错误。
    pub fn from_env() -> Result<Self> {
        let environment: String = env_or("ENVIRONMENT", "development".to_string());
        let production = environment == "production";

        let admin_passcode = match std::env::var("ADMIN_PASSCODE") {
            Ok(p) if !p.trim().is_empty() => Secret::new(p.trim()),
            _ if production => {
                return Err(ServerError::Config(
                    "ADMIN_PASSCODE must be set in production".to_string(),
                ));
            }
            _ => {
                tracing::warn!("ADMIN_PASSCODE not set, using the development default");
                Secret::new(DEV_ADMIN_PASSCODE)
            }
        };

        Ok(Self {
            work_dir: env_or("WORK_DIR", "./work_dir".to_string()),
            http_port: env_or("HTTP_PORT", 3000),
            log_level: env_or("LOG_LEVEL", "info".to_string()),
            log_json: env_or("LOG_JSON", false),
            refund_window_hours: env_or("REFUND_WINDOW_HOURS", 24),
            refund_auto_approve: env_or("REFUND_AUTO_APPROVE", false),
            seed_demo_data: env_or("SEED_DEMO_DATA", true),
            admin_username: env_or("ADMIN_USERNAME", "admin".to_string()),
            admin_passcode,
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            jwt: JwtConfig::from_env(production)?,
            environment,
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Result<Self> {
        let mut config = Self::from_env()?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 托管策略 (退款窗口 + 自动批准)
    pub fn escrow_policy(&self) -> EscrowPolicy {
        EscrowPolicy::from_hours(self.refund_window_hours, self.refund_auto_approve)
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件: work_dir/database/agrilink.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join(DB_FILE_NAME)
    }

    /// 日志目录: work_dir/logs
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
