//! Order Model

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Waiting for Delivery")]
    WaitingForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

/// Refund status of an order
///
/// `Rejected` 可以重新申请；`Approved` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

/// Order entity
///
/// One Order owns exactly one Delivery and one Payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    pub listing_id: String,
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub unit: String,
    pub price_per_unit: f64,
    pub base_price: f64,
    pub delivery_fee: f64,
    pub platform_fee: f64,
    pub total_price: f64,
    pub date_ordered: String,
    pub expected_delivery_time: String,
    pub farmer_code: String,
    pub buyer_code: String,
    #[serde(default)]
    pub delivery_agent_id: Option<String>,
    #[serde(default)]
    pub codes_verified: bool,
    #[serde(default)]
    pub payment_released: bool,
    #[serde(default)]
    pub status: OrderStatus,
    /// Epoch millis, set exactly once at delivery confirmation
    #[serde(default)]
    pub delivery_timestamp: Option<i64>,
    #[serde(default)]
    pub rated: bool,

    // === Refund ===
    #[serde(default)]
    pub refund_requested: bool,
    #[serde(default)]
    pub refund_status: RefundStatus,
    #[serde(default)]
    pub refund_processed: bool,
    #[serde(default)]
    pub refund_reason: Option<String>,
    #[serde(default)]
    pub refund_timestamp: Option<i64>,
    #[serde(default)]
    pub refund_rejection_note: Option<String>,
}

impl Order {
    pub fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    /// Approved or already processed refunds cannot be reopened
    pub fn refund_is_final(&self) -> bool {
        self.refund_status == RefundStatus::Approved || self.refund_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde_labels() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::WaitingForDelivery).unwrap(),
            "\"Waiting for Delivery\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"Delivered\""
        );
        assert_eq!(
            serde_json::to_string(&RefundStatus::None).unwrap(),
            "\"none\""
        );
    }
}
