use thiserror::Error;

use crate::auth::JwtError;
use crate::escrow::ManagerError;

/// 启动与运行期错误 (请求级错误使用 [`AppError`](crate::utils::AppError))
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] ManagerError),

    #[error("JWT 配置错误: {0}")]
    Jwt(#[from] JwtError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
