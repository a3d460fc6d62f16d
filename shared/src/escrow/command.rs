//! Escrow commands - requests from principals to mutate the marketplace

use super::types::{Actor, Secret};
use crate::models::Address;
use serde::{Deserialize, Serialize};

/// Escrow command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowCommand {
    /// Idempotency key
    pub command_id: String,
    /// Authenticated principal
    pub actor: Actor,
    /// Server timestamp (Unix milliseconds), authoritative for time windows
    pub timestamp: i64,
    pub payload: EscrowCommandPayload,
}

impl EscrowCommand {
    /// Create a command with a fresh id and the current server time
    pub fn new(actor: Actor, payload: EscrowCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor,
            timestamp: crate::util::now_millis(),
            payload,
        }
    }

    /// Override the command id (client-supplied idempotency key)
    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = command_id.into();
        self
    }

    /// Override the command timestamp
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Command payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowCommandPayload {
    /// Buyer signup
    RegisterBuyer {
        name: String,
        email: String,
        phone: String,
        address: Address,
        passcode: Secret,
    },
    /// Farmer publishes a listing
    CreateListing {
        farmer_id: String,
        crop: String,
        crop_en: String,
        quantity: i64,
        price_per_unit: f64,
        unit: String,
    },
    /// Buyer purchases from a listing (passcode re-check)
    PlaceOrder {
        buyer_id: String,
        listing_id: String,
        quantity: i64,
        passcode: Secret,
    },
    /// Two-sided code handshake at handoff
    ConfirmDelivery {
        delivery_id: String,
        delivery_agent_id: String,
        farmer_code: Secret,
        buyer_code: Secret,
    },
    RequestRefund {
        order_id: String,
        passcode: Secret,
        reason: Option<String>,
    },
    ApproveRefund {
        order_id: String,
    },
    RejectRefund {
        order_id: String,
        note: Option<String>,
    },
    /// Admin force-resolves a delivery exception
    ManualOverride {
        delivery_id: String,
    },
    RateFarmer {
        order_id: String,
        stars: u8,
    },
    SkipRating {
        order_id: String,
    },
}

impl EscrowCommandPayload {
    /// Short name for logging (never includes secrets)
    pub fn kind(&self) -> &'static str {
        match self {
            EscrowCommandPayload::RegisterBuyer { .. } => "RegisterBuyer",
            EscrowCommandPayload::CreateListing { .. } => "CreateListing",
            EscrowCommandPayload::PlaceOrder { .. } => "PlaceOrder",
            EscrowCommandPayload::ConfirmDelivery { .. } => "ConfirmDelivery",
            EscrowCommandPayload::RequestRefund { .. } => "RequestRefund",
            EscrowCommandPayload::ApproveRefund { .. } => "ApproveRefund",
            EscrowCommandPayload::RejectRefund { .. } => "RejectRefund",
            EscrowCommandPayload::ManualOverride { .. } => "ManualOverride",
            EscrowCommandPayload::RateFarmer { .. } => "RateFarmer",
            EscrowCommandPayload::SkipRating { .. } => "SkipRating",
        }
    }
}
