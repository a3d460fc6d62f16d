//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ListingNotFound
            | Self::OrderNotFound
            | Self::DeliveryNotFound
            | Self::PaymentNotFound
            | Self::FarmerNotFound
            | Self::BuyerNotFound
            | Self::AgentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ListingUnavailable
            | Self::OutOfStock
            | Self::DeliveryAlreadyConfirmed
            | Self::NotAnException
            | Self::AlreadyRated
            | Self::OrderNotDelivered
            | Self::RefundAlreadyRequested
            | Self::RefundAlreadyFinal
            | Self::RefundNotPending
            | Self::EmailTaken => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::InvalidPasscode => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::FarmerCodeMismatch
            | Self::BuyerCodeMismatch
            | Self::AgentMismatch => StatusCode::FORBIDDEN,

            // 422 Unprocessable (time window)
            Self::RefundWindowExpired => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::IdSpaceExhausted
            | Self::OrphanDelivery
            | Self::DeliveryTimestampMissing
            | Self::StorageFull
            | Self::OutOfMemory
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
