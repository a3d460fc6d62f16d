//! Delivery Model

use serde::{Deserialize, Serialize};

/// Delivery status
///
/// `Pending -> Delivered`，Delivered 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Delivered,
}

/// Delivery entity (physical handoff record)
///
/// At rest: `status == Delivered <=> codes_verified`, and
/// `payment_released => status == Delivered`. Any violation is an exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: String,
    pub order_id: String,
    pub farmer_id: String,
    pub buyer_id: String,
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub unit: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub delivery_agent_id: Option<String>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    pub codes_verified: bool,
    #[serde(default)]
    pub payment_released: bool,
    pub date_created: String,
    #[serde(default)]
    pub date_delivered: Option<String>,
    #[serde(default)]
    pub time_delivered: Option<String>,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}
