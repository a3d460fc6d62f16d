//! 类型转换模块
//!
//! 将托管状态机的命令错误 (CommandErrorCode) 转换为 HTTP 错误码 (ErrorCode)

use shared::escrow::{CommandError, CommandErrorCode, CommandResponse};

use crate::escrow::auditor::InvestigateError;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Command error code → HTTP error code
pub fn error_code(code: CommandErrorCode) -> ErrorCode {
    match code {
        // Validation
        CommandErrorCode::ValidationFailed => ErrorCode::ValidationFailed,
        CommandErrorCode::InvalidQuantity => ErrorCode::InvalidQuantity,
        CommandErrorCode::InvalidPrice => ErrorCode::InvalidPrice,
        CommandErrorCode::InvalidRating => ErrorCode::InvalidRating,
        // Authentication / capability
        CommandErrorCode::InvalidPasscode => ErrorCode::InvalidPasscode,
        CommandErrorCode::PermissionDenied => ErrorCode::PermissionDenied,
        CommandErrorCode::AdminRequired => ErrorCode::AdminRequired,
        // Listing
        CommandErrorCode::ListingUnavailable => ErrorCode::ListingUnavailable,
        CommandErrorCode::OutOfStock => ErrorCode::OutOfStock,
        // Order / delivery
        CommandErrorCode::OrderNotFound => ErrorCode::OrderNotFound,
        CommandErrorCode::DeliveryNotFound => ErrorCode::DeliveryNotFound,
        CommandErrorCode::AlreadyConfirmed => ErrorCode::DeliveryAlreadyConfirmed,
        CommandErrorCode::OrphanDelivery => ErrorCode::OrphanDelivery,
        CommandErrorCode::FarmerCodeMismatch => ErrorCode::FarmerCodeMismatch,
        CommandErrorCode::BuyerCodeMismatch => ErrorCode::BuyerCodeMismatch,
        CommandErrorCode::AgentMismatch => ErrorCode::AgentMismatch,
        CommandErrorCode::NotAnException => ErrorCode::NotAnException,
        CommandErrorCode::AlreadyRated => ErrorCode::AlreadyRated,
        // Payment / refund
        CommandErrorCode::PaymentNotFound => ErrorCode::PaymentNotFound,
        CommandErrorCode::OrderNotDelivered => ErrorCode::OrderNotDelivered,
        CommandErrorCode::DeliveryTimestampMissing => ErrorCode::DeliveryTimestampMissing,
        CommandErrorCode::RefundWindowExpired => ErrorCode::RefundWindowExpired,
        CommandErrorCode::RefundAlreadyRequested => ErrorCode::RefundAlreadyRequested,
        CommandErrorCode::RefundAlreadyFinal => ErrorCode::RefundAlreadyFinal,
        CommandErrorCode::RefundNotPending => ErrorCode::RefundNotPending,
        // Accounts
        CommandErrorCode::FarmerNotFound => ErrorCode::FarmerNotFound,
        CommandErrorCode::BuyerNotFound => ErrorCode::BuyerNotFound,
        CommandErrorCode::EmailTaken => ErrorCode::EmailTaken,
        // System
        CommandErrorCode::IdSpaceExhausted => ErrorCode::IdSpaceExhausted,
        CommandErrorCode::DuplicateCommand => ErrorCode::AlreadyExists,
        CommandErrorCode::InternalError => ErrorCode::InternalError,
        CommandErrorCode::StorageFull => ErrorCode::StorageFull,
        CommandErrorCode::OutOfMemory => ErrorCode::OutOfMemory,
        CommandErrorCode::StorageCorrupted => ErrorCode::StorageCorrupted,
        CommandErrorCode::SystemBusy => ErrorCode::SystemBusy,
    }
}

/// Command error → AppError
pub fn command_error(err: CommandError) -> AppError {
    AppError::with_message(error_code(err.code), err.message)
}

/// Failed responses become errors, successes (and duplicates) pass through
pub fn into_result(resp: CommandResponse) -> AppResult<CommandResponse> {
    match resp.error {
        Some(err) if !resp.success => {
            Err(command_error(err).with_detail("command_id", resp.command_id))
        }
        _ => Ok(resp),
    }
}

/// Investigation failure → AppError
pub fn investigate_error(err: InvestigateError) -> AppError {
    match err {
        InvestigateError::DeliveryNotFound(id) => {
            AppError::with_message(ErrorCode::DeliveryNotFound, format!("Delivery not found: {}", id))
        }
        InvestigateError::OrphanDelivery(id) => AppError::with_message(
            ErrorCode::OrphanDelivery,
            format!("Delivery {} references a missing order", id),
        ),
    }
}
