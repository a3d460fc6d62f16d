//! Common escrow types: actors, secrets, command responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Farmer,
    Buyer,
    DeliveryAgent,
    Admin,
    /// 系统自动动作（如自动批准退款）
    System,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Farmer => "farmer",
            ActorRole::Buyer => "buyer",
            ActorRole::DeliveryAgent => "delivery_agent",
            ActorRole::Admin => "admin",
            ActorRole::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "farmer" => Some(ActorRole::Farmer),
            "buyer" => Some(ActorRole::Buyer),
            "delivery_agent" => Some(ActorRole::DeliveryAgent),
            "admin" => Some(ActorRole::Admin),
            "system" => Some(ActorRole::System),
            _ => None,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated principal issuing a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Admin)
    }

    pub fn system() -> Self {
        Self::new("SYSTEM", ActorRole::System)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

/// Secret input (passcode, delivery code)
///
/// Debug 输出被屏蔽，避免明文进入日志。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandOutcome {
    BuyerRegistered {
        buyer_id: String,
    },
    ListingCreated {
        listing_id: String,
    },
    OrderPlaced {
        order_id: String,
        delivery_id: String,
        payment_id: String,
        /// 买家需交给配送员的确认码
        buyer_code: String,
        total_price: f64,
    },
    DeliveryConfirmed {
        delivery_id: String,
        order_id: String,
        payment_released: bool,
    },
    RefundRequested {
        order_id: String,
        auto_approved: bool,
    },
    RefundApproved {
        order_id: String,
    },
    RefundRejected {
        order_id: String,
    },
    DeliveryOverridden {
        delivery_id: String,
        payment_released: bool,
    },
    RatingRecorded {
        order_id: String,
    },
}

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Created/affected entity ids (absent for duplicates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CommandOutcome>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, outcome: Option<CommandOutcome>) -> Self {
        Self {
            command_id,
            success: true,
            outcome,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            outcome: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            outcome: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    // Validation
    ValidationFailed,
    InvalidQuantity,
    InvalidPrice,
    InvalidRating,
    // Authentication / capability
    InvalidPasscode,
    PermissionDenied,
    AdminRequired,
    // Listing
    ListingUnavailable,
    OutOfStock,
    // Order / delivery
    OrderNotFound,
    DeliveryNotFound,
    AlreadyConfirmed,
    OrphanDelivery,
    FarmerCodeMismatch,
    BuyerCodeMismatch,
    AgentMismatch,
    NotAnException,
    AlreadyRated,
    // Payment / refund
    PaymentNotFound,
    OrderNotDelivered,
    DeliveryTimestampMissing,
    RefundWindowExpired,
    RefundAlreadyRequested,
    RefundAlreadyFinal,
    RefundNotPending,
    // Accounts
    FarmerNotFound,
    BuyerNotFound,
    EmailTaken,
    // System
    IdSpaceExhausted,
    DuplicateCommand,
    InternalError,
    // Storage errors (maps to ErrorCode 94xx)
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
