//! Payment Model (escrow record)

use serde::{Deserialize, Serialize};

/// Payment status
///
/// 只允许单向流转：Pending Release → Released → Refunded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Pending Release")]
    PendingRelease,
    #[serde(rename = "Released")]
    Released,
    #[serde(rename = "Refunded")]
    Refunded,
}

impl PaymentStatus {
    /// Forward-only transition check
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::PendingRelease, PaymentStatus::Released)
                | (PaymentStatus::Released, PaymentStatus::Refunded)
        )
    }
}

/// Payment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub delivery_id: String,
    pub buyer_id: String,
    pub farmer_id: String,
    /// Always equals the order's total price
    pub amount: f64,
    #[serde(default)]
    pub status: PaymentStatus,
    pub date_created: String,
    #[serde(default)]
    pub date_released: Option<String>,
    #[serde(default)]
    pub date_refunded: Option<String>,
}
