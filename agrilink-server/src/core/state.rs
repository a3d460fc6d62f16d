use std::path::PathBuf;
use std::sync::Arc;

use shared::escrow::{EscrowCommand, MarketplaceSnapshot};

use crate::auth::{JwtService, hash_passcode};
use crate::core::{Config, Result, ServerError};
use crate::escrow::seed::demo_snapshot;
use crate::escrow::{CommandResponse, EscrowManager, ManagerError};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是 AgriLink 服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | escrow | Arc<EscrowManager> | 托管状态机 (redb) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | admin_passcode_hash | Arc<str> | 管理员口令哈希 |
///
/// # 使用示例
///
/// ```ignore
/// // 执行命令 (阻塞调用放到 spawn_blocking)
/// let resp = state.execute(cmd).await?;
///
/// // 读取快照
/// let snapshot = state.snapshot().await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 托管状态机
    pub escrow: Arc<EscrowManager>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 管理员口令 (argon2 PHC)
    pub admin_passcode_hash: Arc<str>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(
        config: Config,
        escrow: Arc<EscrowManager>,
        jwt_service: Arc<JwtService>,
        admin_passcode_hash: Arc<str>,
    ) -> Self {
        Self {
            config,
            escrow,
            jwt_service,
            admin_passcode_hash,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database/, logs/)
    /// 2. 数据库 (work_dir/database/agrilink.redb)
    /// 3. 演示数据 (仅首次启动且 SEED_DEMO_DATA 开启)
    /// 4. 管理员口令哈希与 JWT 服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        // 1. Ensure work_dir structure exists
        config.ensure_work_dir_structure()?;

        // 2. Open the escrow store
        let escrow = EscrowManager::new(config.database_path(), config.escrow_policy())?;

        // 3. Seed demo data on first run
        if config.seed_demo_data {
            let seeded = escrow.seed_if_empty(|| {
                demo_snapshot(shared::util::now_millis())
                    .map_err(|e| ManagerError::Internal(format!("seed hashing failed: {}", e)))
            })?;
            if seeded {
                tracing::info!("Demo marketplace data written");
            }
        }

        // 4. Admin credential and JWT
        let admin_passcode_hash = hash_passcode(config.admin_passcode.expose())
            .map_err(|e| ServerError::Config(format!("admin passcode hashing failed: {}", e)))?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(
            config.clone(),
            Arc::new(escrow),
            jwt_service,
            Arc::from(admin_passcode_hash),
        ))
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 执行托管命令
    ///
    /// redb 写事务是阻塞调用，放到 blocking 线程池执行
    pub async fn execute(&self, cmd: EscrowCommand) -> std::result::Result<CommandResponse, AppError> {
        let escrow = self.escrow.clone();
        tokio::task::spawn_blocking(move || escrow.execute_command(cmd))
            .await
            .map_err(|e| AppError::internal(format!("command task failed: {}", e)))
    }

    /// 读取最新已提交快照
    pub async fn snapshot(&self) -> std::result::Result<MarketplaceSnapshot, AppError> {
        let escrow = self.escrow.clone();
        tokio::task::spawn_blocking(move || escrow.get_snapshot())
            .await
            .map_err(|e| AppError::internal(format!("snapshot task failed: {}", e)))?
            .map_err(|e| AppError::database(e.to_string()))
    }

    /// 打印启动信息 (日志)
    pub fn print_started_banner_content(&self) {
        tracing::info!("╔══════════════════════════════════════════════════════════════════════╗");
        tracing::info!("║                      AGRILINK ESCROW SERVER                          ║");
        tracing::info!("╚══════════════════════════════════════════════════════════════════════╝");
        tracing::info!("  Environment  : {}", self.config.environment);
        tracing::info!("  Epoch        : {}", self.escrow.epoch());
        tracing::info!("  Database     : {}", self.config.database_path().display());
        tracing::info!(
            "  Refund window: {}h (auto-approve: {})",
            self.config.refund_window_hours,
            self.config.refund_auto_approve
        );
        tracing::info!("  HTTP Server  : http://localhost:{}", self.config.http_port);
        tracing::info!("════════════════════════════════════════════════════════════════════════");
    }
}
