//! Unified error codes for AgriLink
//!
//! This module defines all error codes shared by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Listing errors
//! - 4xxx: Order / delivery errors
//! - 5xxx: Payment / refund errors
//! - 6xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (identifier/passcode)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Passcode re-check failed (purchase / refund)
    InvalidPasscode = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Listing ====================
    /// Listing not found
    ListingNotFound = 3001,
    /// Listing missing or no longer available
    ListingUnavailable = 3002,
    /// Requested quantity exceeds stock
    OutOfStock = 3003,
    /// Quantity must be positive
    InvalidQuantity = 3004,
    /// Price must be positive
    InvalidPrice = 3005,

    // ==================== 4xxx: Order / Delivery ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Delivery not found
    DeliveryNotFound = 4101,
    /// Delivery already confirmed
    DeliveryAlreadyConfirmed = 4102,
    /// Delivery references a missing order
    OrphanDelivery = 4103,
    /// Farmer code does not match
    FarmerCodeMismatch = 4104,
    /// Buyer code does not match
    BuyerCodeMismatch = 4105,
    /// Delivery agent does not match the order binding
    AgentMismatch = 4106,
    /// Delivery is not an exception
    NotAnException = 4107,
    /// Order already rated
    AlreadyRated = 4201,
    /// Rating out of range
    InvalidRating = 4202,

    // ==================== 5xxx: Payment / Refund ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Order has not been delivered
    OrderNotDelivered = 5101,
    /// Delivery timestamp missing
    DeliveryTimestampMissing = 5102,
    /// Refund window expired
    RefundWindowExpired = 5103,
    /// Refund already pending
    RefundAlreadyRequested = 5104,
    /// Refund already approved / processed
    RefundAlreadyFinal = 5105,
    /// No pending refund
    RefundNotPending = 5106,

    // ==================== 6xxx: Account ====================
    /// Farmer not found
    FarmerNotFound = 6001,
    /// Buyer not found
    BuyerNotFound = 6002,
    /// Delivery agent not found
    AgentNotFound = 6003,
    /// Email already registered
    EmailTaken = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Random id/code space exhausted
    IdSpaceExhausted = 9004,

    // ==================== 94xx: Storage ====================
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Out of memory
    OutOfMemory = 9402,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
    /// System busy (IO error, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::InvalidPasscode => "Invalid passcode",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Required role missing",
            ErrorCode::AdminRequired => "Admin role required",

            // Listing
            ErrorCode::ListingNotFound => "Listing not found",
            ErrorCode::ListingUnavailable => "Listing is not available",
            ErrorCode::OutOfStock => "Insufficient stock",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",
            ErrorCode::InvalidPrice => "Price must be greater than zero",

            // Order / Delivery
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::DeliveryNotFound => "Delivery not found",
            ErrorCode::DeliveryAlreadyConfirmed => "Delivery already confirmed",
            ErrorCode::OrphanDelivery => "Delivery references a missing order",
            ErrorCode::FarmerCodeMismatch => "Farmer code does not match",
            ErrorCode::BuyerCodeMismatch => "Buyer code does not match",
            ErrorCode::AgentMismatch => "Delivery agent does not match",
            ErrorCode::NotAnException => "Delivery is not an exception",
            ErrorCode::AlreadyRated => "Order already rated",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",

            // Payment / Refund
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::OrderNotDelivered => "Order has not been delivered",
            ErrorCode::DeliveryTimestampMissing => "Delivery timestamp missing",
            ErrorCode::RefundWindowExpired => "Refund window has expired",
            ErrorCode::RefundAlreadyRequested => "Refund already requested",
            ErrorCode::RefundAlreadyFinal => "Refund already processed",
            ErrorCode::RefundNotPending => "No pending refund for this order",

            // Account
            ErrorCode::FarmerNotFound => "Farmer not found",
            ErrorCode::BuyerNotFound => "Buyer not found",
            ErrorCode::AgentNotFound => "Delivery agent not found",
            ErrorCode::EmailTaken => "Email already registered",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::IdSpaceExhausted => "Identifier space exhausted",

            // Storage
            ErrorCode::StorageFull => "Storage is full",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
            ErrorCode::SystemBusy => "System busy, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::InvalidPasscode),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Listing
            3001 => Ok(ErrorCode::ListingNotFound),
            3002 => Ok(ErrorCode::ListingUnavailable),
            3003 => Ok(ErrorCode::OutOfStock),
            3004 => Ok(ErrorCode::InvalidQuantity),
            3005 => Ok(ErrorCode::InvalidPrice),

            // Order / Delivery
            4001 => Ok(ErrorCode::OrderNotFound),
            4101 => Ok(ErrorCode::DeliveryNotFound),
            4102 => Ok(ErrorCode::DeliveryAlreadyConfirmed),
            4103 => Ok(ErrorCode::OrphanDelivery),
            4104 => Ok(ErrorCode::FarmerCodeMismatch),
            4105 => Ok(ErrorCode::BuyerCodeMismatch),
            4106 => Ok(ErrorCode::AgentMismatch),
            4107 => Ok(ErrorCode::NotAnException),
            4201 => Ok(ErrorCode::AlreadyRated),
            4202 => Ok(ErrorCode::InvalidRating),

            // Payment / Refund
            5001 => Ok(ErrorCode::PaymentNotFound),
            5101 => Ok(ErrorCode::OrderNotDelivered),
            5102 => Ok(ErrorCode::DeliveryTimestampMissing),
            5103 => Ok(ErrorCode::RefundWindowExpired),
            5104 => Ok(ErrorCode::RefundAlreadyRequested),
            5105 => Ok(ErrorCode::RefundAlreadyFinal),
            5106 => Ok(ErrorCode::RefundNotPending),

            // Account
            6001 => Ok(ErrorCode::FarmerNotFound),
            6002 => Ok(ErrorCode::BuyerNotFound),
            6003 => Ok(ErrorCode::AgentNotFound),
            6004 => Ok(ErrorCode::EmailTaken),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::IdSpaceExhausted),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9402 => Ok(ErrorCode::OutOfMemory),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::InvalidPasscode.code(), 1005);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::OutOfStock.code(), 3003);
        assert_eq!(ErrorCode::BuyerCodeMismatch.code(), 4105);
        assert_eq!(ErrorCode::RefundWindowExpired.code(), 5103);
        assert_eq!(ErrorCode::EmailTaken.code(), 6004);
        assert_eq!(ErrorCode::IdSpaceExhausted.code(), 9004);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(4100), Err(InvalidErrorCode(4100)));
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::ListingUnavailable,
            ErrorCode::AgentMismatch,
            ErrorCode::RefundAlreadyFinal,
            ErrorCode::BuyerNotFound,
            ErrorCode::StorageCorrupted,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
    }
}
