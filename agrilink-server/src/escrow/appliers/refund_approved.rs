//! RefundApproved event applier
//!
//! Closes the refund and credits the buyer. The farmer side is reversed by
//! a separate PaymentRefunded event when the payment had been released.

use crate::escrow::money::credit;
use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, RefundStatus};

/// RefundApproved applier
pub struct RefundApprovedApplier;

impl EventApplier for RefundApprovedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::RefundApproved {
            order_id,
            buyer_id,
            amount,
            automatic,
        } = &event.payload
        {
            let already_processed = match snapshot.order_mut(order_id) {
                Some(order) => {
                    let processed = order.refund_processed;
                    order.refund_status = RefundStatus::Approved;
                    order.refund_processed = true;
                    processed
                }
                None => false,
            };

            if already_processed {
                tracing::warn!(order_id = %order_id, "Refund already processed, buyer not credited again");
            } else if let Some(buyer) = snapshot.buyer_mut(buyer_id) {
                buyer.balance = credit(buyer.balance, *amount);
            }

            let (action, details) = if *automatic {
                (
                    AuditAction::RefundAutoApproved,
                    format!(
                        "Refund auto-approved for order {} ({} ETB). Money returned to buyer.",
                        order_id, amount
                    ),
                )
            } else {
                (
                    AuditAction::RefundApproved,
                    format!(
                        "Admin approved refund for order {} ({} ETB). Money returned to buyer.",
                        order_id, amount
                    ),
                )
            };
            snapshot.append_audit(event.timestamp, action, event.actor_id.clone(), details);

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

    fn create_approved_event(automatic: bool) -> EscrowEvent {
        let (actor, role) = if automatic {
            ("SYSTEM", ActorRole::System)
        } else {
            ("admin", ActorRole::Admin)
        };
        EscrowEvent::new(
            7,
            actor.to_string(),
            role,
            "cmd-7".to_string(),
            TEST_NOW,
            EscrowEventType::RefundApproved,
            EventPayload::RefundApproved {
                order_id: "O001".to_string(),
                buyer_id: "B1001".to_string(),
                amount: 1248.0,
                automatic,
            },
        )
    }

    #[test]
    fn test_refund_approved_credits_buyer_once() {
        let mut snapshot = delivered_snapshot();
        snapshot.order_mut("O001").unwrap().refund_status = RefundStatus::Pending;

        let event = create_approved_event(false);
        RefundApprovedApplier.apply(&mut snapshot, &event);
        RefundApprovedApplier.apply(&mut snapshot, &event);

        let order = snapshot.order("O001").unwrap();
        assert_eq!(order.refund_status, RefundStatus::Approved);
        assert!(order.refund_processed);
        assert_eq!(snapshot.buyer("B1001").unwrap().balance, 1248.0);
        assert_eq!(snapshot.audit_log[0].action, AuditAction::RefundApproved);
        assert_eq!(snapshot.audit_log[0].user_id, "admin");
    }

    #[test]
    fn test_refund_auto_approved_audit_label() {
        let mut snapshot = delivered_snapshot();
        RefundApprovedApplier.apply(&mut snapshot, &create_approved_event(true));
        assert_eq!(snapshot.audit_log[0].action, AuditAction::RefundAutoApproved);
        assert_eq!(snapshot.audit_log[0].user_id, "SYSTEM");
    }
}
