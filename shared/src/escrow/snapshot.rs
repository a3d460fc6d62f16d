//! Marketplace snapshot - the whole dataset as one document

use crate::models::{
    AuditAction, AuditLogEntry, Buyer, Delivery, DeliveryAgent, DemandMetric, Farmer, Listing,
    Order, Payment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketplace snapshot
///
/// 持久化为单个 JSON 文档（命名空间键 `agrilink`）。
/// 只有 EventApplier 修改快照；Action 只读。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceSnapshot {
    pub farmers: Vec<Farmer>,
    pub buyers: Vec<Buyer>,
    pub delivery_agents: Vec<DeliveryAgent>,
    pub listings: Vec<Listing>,
    pub orders: Vec<Order>,
    pub deliveries: Vec<Delivery>,
    pub payments: Vec<Payment>,
    /// Keyed by crop name
    pub demand_metrics: BTreeMap<String, DemandMetric>,
    pub audit_log: Vec<AuditLogEntry>,
    /// Last applied event sequence
    pub last_sequence: u64,
    /// Last update time (Unix milliseconds)
    pub updated_at: i64,
}

impl MarketplaceSnapshot {
    // ========== Lookups ==========

    pub fn farmer(&self, id: &str) -> Option<&Farmer> {
        self.farmers.iter().find(|f| f.id == id)
    }

    pub fn farmer_mut(&mut self, id: &str) -> Option<&mut Farmer> {
        self.farmers.iter_mut().find(|f| f.id == id)
    }

    pub fn buyer(&self, id: &str) -> Option<&Buyer> {
        self.buyers.iter().find(|b| b.id == id)
    }

    pub fn buyer_mut(&mut self, id: &str) -> Option<&mut Buyer> {
        self.buyers.iter_mut().find(|b| b.id == id)
    }

    /// Case-insensitive email lookup
    pub fn buyer_by_email(&self, email: &str) -> Option<&Buyer> {
        self.buyers
            .iter()
            .find(|b| b.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn delivery_agent(&self, id: &str) -> Option<&DeliveryAgent> {
        self.delivery_agents.iter().find(|a| a.id == id)
    }

    pub fn listing(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn listing_mut(&mut self, id: &str) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|l| l.id == id)
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    pub fn delivery(&self, id: &str) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.id == id)
    }

    pub fn delivery_mut(&mut self, id: &str) -> Option<&mut Delivery> {
        self.deliveries.iter_mut().find(|d| d.id == id)
    }

    pub fn delivery_for_order(&self, order_id: &str) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.order_id == order_id)
    }

    pub fn payment(&self, id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn payment_mut(&mut self, id: &str) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| p.id == id)
    }

    pub fn payment_for_delivery(&self, delivery_id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.delivery_id == delivery_id)
    }

    pub fn payment_for_order(&self, order_id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.order_id == order_id)
    }

    /// Whether any order already uses this buyer code
    pub fn buyer_code_in_use(&self, code: &str) -> bool {
        self.orders.iter().any(|o| o.buyer_code == code)
    }

    // ========== Audit ==========

    /// Append an audit entry with the next sequential id (`A001`, `A002` ...)
    pub fn append_audit(
        &mut self,
        timestamp: i64,
        action: AuditAction,
        user_id: impl Into<String>,
        details: impl Into<String>,
    ) -> &AuditLogEntry {
        let id = format!("A{:03}", self.audit_log.len() + 1);
        self.audit_log.push(AuditLogEntry {
            id,
            timestamp,
            action,
            user_id: user_id.into(),
            details: details.into(),
        });
        let last = self.audit_log.len() - 1;
        &self.audit_log[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = MarketplaceSnapshot::default();
        assert!(snapshot.orders.is_empty());
        assert!(snapshot.demand_metrics.is_empty());
        assert_eq!(snapshot.last_sequence, 0);
    }

    #[test]
    fn test_append_audit_ids_are_sequential() {
        let mut snapshot = MarketplaceSnapshot::default();
        snapshot.append_audit(1, AuditAction::OrderPlaced, "B1234", "first");
        snapshot.append_audit(2, AuditAction::DeliveryConfirmed, "DA001", "second");

        assert_eq!(snapshot.audit_log[0].id, "A001");
        assert_eq!(snapshot.audit_log[1].id, "A002");
        assert_eq!(snapshot.audit_log[1].user_id, "DA001");
    }

    #[test]
    fn test_missing_collections_deserialize_to_default() {
        let snapshot: MarketplaceSnapshot = serde_json::from_str(r#"{"farmers":[]}"#).unwrap();
        assert!(snapshot.listings.is_empty());
        assert!(snapshot.audit_log.is_empty());
    }
}
