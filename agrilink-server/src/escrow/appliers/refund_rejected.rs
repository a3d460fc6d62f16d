//! RefundRejected event applier

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, RefundStatus};

/// RefundRejected applier
pub struct RefundRejectedApplier;

impl EventApplier for RefundRejectedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::RefundRejected { order_id, note } = &event.payload {
            if let Some(order) = snapshot.order_mut(order_id) {
                order.refund_status = RefundStatus::Rejected;
                order.refund_rejection_note = Some(note.clone());
            }

            snapshot.append_audit(
                event.timestamp,
                AuditAction::RefundRejected,
                event.actor_id.clone(),
                format!("Admin rejected refund for order {}. Reason: {}", order_id, note),
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{TEST_NOW, delivered_snapshot};
    use shared::escrow::{ActorRole, EscrowEventType};

    #[test]
    fn test_refund_rejected_keeps_money() {
        let mut snapshot = delivered_snapshot();
        snapshot.order_mut("O001").unwrap().refund_status = RefundStatus::Pending;
        let before_farmer = snapshot.farmer("F001").unwrap().balance;

        let event = EscrowEvent::new(
            9,
            "admin".to_string(),
            ActorRole::Admin,
            "cmd-9".to_string(),
            TEST_NOW,
            EscrowEventType::RefundRejected,
            EventPayload::RefundRejected {
                order_id: "O001".to_string(),
                note: "photos unclear".to_string(),
            },
        );
        RefundRejectedApplier.apply(&mut snapshot, &event);

        let order = snapshot.order("O001").unwrap();
        assert_eq!(order.refund_status, RefundStatus::Rejected);
        assert_eq!(order.refund_rejection_note.as_deref(), Some("photos unclear"));
        assert!(!order.refund_processed);
        assert_eq!(snapshot.farmer("F001").unwrap().balance, before_farmer);
        assert_eq!(snapshot.buyer("B1001").unwrap().balance, 0.0);
        assert_eq!(
            snapshot.audit_log[0].details,
            "Admin rejected refund for order O001. Reason: photos unclear"
        );
    }
}
