//! Core traits for the escrow command/event pipeline
//!
//! - [`CommandHandler`]: validates a command against the snapshot and produces events
//! - [`EventApplier`]: applies one event to the snapshot (pure, infallible)
//!
//! Actions never mutate state. Appliers are the only writers of
//! [`MarketplaceSnapshot`].

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::escrow::{Actor, CommandErrorCode, EscrowEvent, MarketplaceSnapshot};
use thiserror::Error;

/// Default refund window (24h)
pub const DEFAULT_REFUND_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Escrow policy knobs (from Config)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowPolicy {
    /// 退款窗口（毫秒），边界包含
    pub refund_window_ms: i64,
    /// 开启后，已核验订单的退款申请由 SYSTEM 自动批准
    pub auto_approve_refunds: bool,
}

impl EscrowPolicy {
    pub fn from_hours(refund_window_hours: u32, auto_approve_refunds: bool) -> Self {
        Self {
            refund_window_ms: i64::from(refund_window_hours) * 60 * 60 * 1000,
            auto_approve_refunds,
        }
    }
}

impl Default for EscrowPolicy {
    fn default() -> Self {
        Self {
            refund_window_ms: DEFAULT_REFUND_WINDOW_MS,
            auto_approve_refunds: false,
        }
    }
}

/// Metadata carried from the command into every event it produces
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor: Actor,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Command execution context
///
/// Holds a read-only view of the snapshot loaded inside the write
/// transaction, the policy, the sequence allocator and the RNG used for
/// codes and agent assignment.
pub struct CommandContext<'a> {
    snapshot: &'a MarketplaceSnapshot,
    policy: &'a EscrowPolicy,
    current_sequence: u64,
    rng: StdRng,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        snapshot: &'a MarketplaceSnapshot,
        policy: &'a EscrowPolicy,
        current_sequence: u64,
    ) -> Self {
        Self {
            snapshot,
            policy,
            current_sequence,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the RNG (deterministic tests)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn snapshot(&self) -> &'a MarketplaceSnapshot {
        self.snapshot
    }

    pub fn policy(&self) -> &'a EscrowPolicy {
        self.policy
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.current_sequence += 1;
        self.current_sequence
    }
}

/// Command handler
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError>;
}

/// Event applier, defined next to [`EventAction`](super::appliers::EventAction)
pub use super::appliers::EventApplier;

/// Business rule violations raised by actions
#[derive(Debug, Error)]
pub enum EscrowError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Price must be a positive number")]
    InvalidPrice,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Invalid passcode")]
    InvalidPasscode,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Admin role required")]
    AdminRequired,

    #[error("Listing unavailable: {0}")]
    ListingUnavailable(String),

    #[error("Out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: i64, available: i64 },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),

    #[error("Delivery already confirmed: {0}")]
    AlreadyConfirmed(String),

    #[error("Delivery {0} references a missing order")]
    OrphanDelivery(String),

    #[error("Farmer code does not match")]
    FarmerCodeMismatch,

    #[error("Buyer code does not match")]
    BuyerCodeMismatch,

    #[error("Delivery agent is not assigned to this delivery")]
    AgentMismatch,

    #[error("Delivery is not an exception: {0}")]
    NotAnException(String),

    #[error("Order already rated: {0}")]
    AlreadyRated(String),

    #[error("Payment not found for order {0}")]
    PaymentNotFound(String),

    #[error("Order not delivered: {0}")]
    OrderNotDelivered(String),

    #[error("Order {0} is delivered but has no delivery timestamp")]
    DeliveryTimestampMissing(String),

    #[error("Refund window expired for order {0}")]
    RefundWindowExpired(String),

    #[error("Refund already requested for order {0}")]
    RefundAlreadyRequested(String),

    #[error("Refund already processed for order {0}")]
    RefundAlreadyFinal(String),

    #[error("No pending refund for order {0}")]
    RefundNotPending(String),

    #[error("Farmer not found: {0}")]
    FarmerNotFound(String),

    #[error("Buyer not found: {0}")]
    BuyerNotFound(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("No free {0} available")]
    IdSpaceExhausted(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EscrowError {
    /// Wire error code
    pub fn code(&self) -> CommandErrorCode {
        match self {
            EscrowError::Validation(_) => CommandErrorCode::ValidationFailed,
            EscrowError::InvalidQuantity(_) => CommandErrorCode::InvalidQuantity,
            EscrowError::InvalidPrice => CommandErrorCode::InvalidPrice,
            EscrowError::InvalidRating(_) => CommandErrorCode::InvalidRating,
            EscrowError::InvalidPasscode => CommandErrorCode::InvalidPasscode,
            EscrowError::PermissionDenied(_) => CommandErrorCode::PermissionDenied,
            EscrowError::AdminRequired => CommandErrorCode::AdminRequired,
            EscrowError::ListingUnavailable(_) => CommandErrorCode::ListingUnavailable,
            EscrowError::OutOfStock { .. } => CommandErrorCode::OutOfStock,
            EscrowError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            EscrowError::DeliveryNotFound(_) => CommandErrorCode::DeliveryNotFound,
            EscrowError::AlreadyConfirmed(_) => CommandErrorCode::AlreadyConfirmed,
            EscrowError::OrphanDelivery(_) => CommandErrorCode::OrphanDelivery,
            EscrowError::FarmerCodeMismatch => CommandErrorCode::FarmerCodeMismatch,
            EscrowError::BuyerCodeMismatch => CommandErrorCode::BuyerCodeMismatch,
            EscrowError::AgentMismatch => CommandErrorCode::AgentMismatch,
            EscrowError::NotAnException(_) => CommandErrorCode::NotAnException,
            EscrowError::AlreadyRated(_) => CommandErrorCode::AlreadyRated,
            EscrowError::PaymentNotFound(_) => CommandErrorCode::PaymentNotFound,
            EscrowError::OrderNotDelivered(_) => CommandErrorCode::OrderNotDelivered,
            EscrowError::DeliveryTimestampMissing(_) => CommandErrorCode::DeliveryTimestampMissing,
            EscrowError::RefundWindowExpired(_) => CommandErrorCode::RefundWindowExpired,
            EscrowError::RefundAlreadyRequested(_) => CommandErrorCode::RefundAlreadyRequested,
            EscrowError::RefundAlreadyFinal(_) => CommandErrorCode::RefundAlreadyFinal,
            EscrowError::RefundNotPending(_) => CommandErrorCode::RefundNotPending,
            EscrowError::FarmerNotFound(_) => CommandErrorCode::FarmerNotFound,
            EscrowError::BuyerNotFound(_) => CommandErrorCode::BuyerNotFound,
            EscrowError::EmailTaken => CommandErrorCode::EmailTaken,
            EscrowError::IdSpaceExhausted(_) => CommandErrorCode::IdSpaceExhausted,
            EscrowError::Internal(_) => CommandErrorCode::InternalError,
        }
    }
}

/// Require the Admin capability on the issuing actor
pub fn require_admin(actor: &Actor) -> Result<(), EscrowError> {
    if actor.is_admin() {
        Ok(())
    } else {
        crate::security_log!(
            "WARN",
            "admin_required",
            actor_id = actor.id.as_str(),
            role = actor.role.as_str()
        );
        Err(EscrowError::AdminRequired)
    }
}
