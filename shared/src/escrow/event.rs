//! Escrow events - immutable facts recorded after command processing

use super::types::ActorRole;
use crate::models::{Buyer, Delivery, Listing, Order, Payment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Escrow event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    pub sequence: u64,
    /// Server timestamp (Unix milliseconds), taken from the command
    pub timestamp: i64,
    /// Principal who triggered this event
    pub actor_id: String,
    pub actor_role: ActorRole,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: EscrowEventType,
    /// Event payload
    pub payload: EventPayload,
}

impl EscrowEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Global sequence number (authoritative ordering)
    /// * `actor_id` / `actor_role` - Principal who triggered this event
    /// * `command_id` - Command that triggered this event
    /// * `timestamp` - Server timestamp of the command
    /// * `event_type` - Event type
    /// * `payload` - Event payload
    pub fn new(
        sequence: u64,
        actor_id: String,
        actor_role: ActorRole,
        command_id: String,
        timestamp: i64,
        event_type: EscrowEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            timestamp,
            actor_id,
            actor_role,
            command_id,
            event_type,
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowEventType {
    // Accounts / catalog
    BuyerRegistered,
    ListingCreated,

    // Escrow lifecycle
    OrderPlaced,
    DeliveryConfirmed,
    PaymentReleased,

    // Refunds
    RefundRequested,
    RefundApproved,
    PaymentRefunded,
    RefundRejected,

    // Admin
    DeliveryOverridden,

    // Ratings
    FarmerRated,
    RatingSkipped,
}

impl fmt::Display for EscrowEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowEventType::BuyerRegistered => write!(f, "BUYER_REGISTERED"),
            EscrowEventType::ListingCreated => write!(f, "LISTING_CREATED"),
            EscrowEventType::OrderPlaced => write!(f, "ORDER_PLACED"),
            EscrowEventType::DeliveryConfirmed => write!(f, "DELIVERY_CONFIRMED"),
            EscrowEventType::PaymentReleased => write!(f, "PAYMENT_RELEASED"),
            EscrowEventType::RefundRequested => write!(f, "REFUND_REQUESTED"),
            EscrowEventType::RefundApproved => write!(f, "REFUND_APPROVED"),
            EscrowEventType::PaymentRefunded => write!(f, "PAYMENT_REFUNDED"),
            EscrowEventType::RefundRejected => write!(f, "REFUND_REJECTED"),
            EscrowEventType::DeliveryOverridden => write!(f, "DELIVERY_OVERRIDDEN"),
            EscrowEventType::FarmerRated => write!(f, "FARMER_RATED"),
            EscrowEventType::RatingSkipped => write!(f, "RATING_SKIPPED"),
        }
    }
}

/// Event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    BuyerRegistered {
        buyer: Box<Buyer>,
    },
    ListingCreated {
        listing: Box<Listing>,
    },
    /// Order + Delivery + Payment triple, created together
    OrderPlaced {
        order: Box<Order>,
        delivery: Box<Delivery>,
        payment: Box<Payment>,
    },
    DeliveryConfirmed {
        delivery_id: String,
        order_id: String,
        delivery_agent_id: String,
        date_delivered: String,
        time_delivered: String,
    },
    PaymentReleased {
        payment_id: String,
        delivery_id: String,
        order_id: String,
        farmer_id: String,
        amount: f64,
        date_released: String,
    },
    RefundRequested {
        order_id: String,
        buyer_id: String,
        reason: String,
    },
    RefundApproved {
        order_id: String,
        buyer_id: String,
        amount: f64,
        /// 由系统自动批准（非管理员）
        automatic: bool,
    },
    PaymentRefunded {
        payment_id: String,
        order_id: String,
        farmer_id: String,
        amount: f64,
        date_refunded: String,
    },
    RefundRejected {
        order_id: String,
        note: String,
    },
    DeliveryOverridden {
        delivery_id: String,
        order_id: String,
        /// Payment was already released; only the flags need syncing
        sync_payment_released: bool,
    },
    FarmerRated {
        order_id: String,
        farmer_id: String,
        stars: u8,
    },
    RatingSkipped {
        order_id: String,
    },
}
