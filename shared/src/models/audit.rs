//! Audit Log Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audit action label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "Buyer Registered")]
    BuyerRegistered,
    #[serde(rename = "Listing Created")]
    ListingCreated,
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    #[serde(rename = "Delivery Confirmed")]
    DeliveryConfirmed,
    #[serde(rename = "Refund Requested")]
    RefundRequested,
    #[serde(rename = "Refund Approved")]
    RefundApproved,
    #[serde(rename = "Refund Approved (Auto)")]
    RefundAutoApproved,
    #[serde(rename = "Refund Rejected")]
    RefundRejected,
    /// 管理员强制处理异常，区别于正常确认
    #[serde(rename = "Manual Override")]
    ManualOverride,
    #[serde(rename = "Farmer Rated")]
    FarmerRated,
    #[serde(rename = "Rating Skipped")]
    RatingSkipped,
}

impl AuditAction {
    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::BuyerRegistered => "Buyer Registered",
            AuditAction::ListingCreated => "Listing Created",
            AuditAction::OrderPlaced => "Order Placed",
            AuditAction::DeliveryConfirmed => "Delivery Confirmed",
            AuditAction::RefundRequested => "Refund Requested",
            AuditAction::RefundApproved => "Refund Approved",
            AuditAction::RefundAutoApproved => "Refund Approved (Auto)",
            AuditAction::RefundRejected => "Refund Rejected",
            AuditAction::ManualOverride => "Manual Override",
            AuditAction::FarmerRated => "Farmer Rated",
            AuditAction::RatingSkipped => "Rating Skipped",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audit log entry (append-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Sequential, zero-padded (`A001`)
    pub id: String,
    /// Epoch millis
    pub timestamp: i64,
    pub action: AuditAction,
    pub user_id: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_label_matches_serde() {
        let actions = [
            AuditAction::OrderPlaced,
            AuditAction::RefundAutoApproved,
            AuditAction::ManualOverride,
        ];
        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.label()));
        }
    }
}
