use super::super::storage::StorageError;
use super::super::traits::EscrowError;
use shared::escrow::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 将存储错误转换为错误码（前端负责本地化）
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    // 先按枚举变体精确匹配
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::EventNotFound(_) => return CommandErrorCode::InternalError,
        _ => {}
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    // 磁盘空间不足
    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    // 内存不足
    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    // 数据损坏
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // 默认：系统繁忙（redb 的 Database/Transaction/Table/Storage/Commit 错误）
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string(); // 保留技术细节用于日志/调试
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::Escrow(e) => (e.code(), e.to_string()),
            ManagerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error while processing command");
                (CommandErrorCode::InternalError, msg)
            }
        };
        CommandError::new(code, message)
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_error_keeps_its_code() {
        let err: CommandError =
            ManagerError::from(EscrowError::RefundWindowExpired("O001".to_string())).into();
        assert_eq!(err.code, CommandErrorCode::RefundWindowExpired);
        assert!(err.message.contains("O001"));
    }

    #[test]
    fn test_serialization_error_is_internal() {
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err: CommandError = ManagerError::Storage(StorageError::Serialization(json_err)).into();
        assert_eq!(err.code, CommandErrorCode::InternalError);
    }
}
