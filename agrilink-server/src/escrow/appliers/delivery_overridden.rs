//! DeliveryOverridden event applier
//!
//! Codes are marked verified on both records. When the payment had already
//! been released only the flags are synced; otherwise a PaymentReleased
//! event from the same command moves the money.

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, PaymentStatus};

/// DeliveryOverridden applier
pub struct DeliveryOverriddenApplier;

impl EventApplier for DeliveryOverriddenApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::DeliveryOverridden {
            delivery_id,
            order_id,
            sync_payment_released,
        } = &event.payload
        {
            let mut releasing = false;
            if let Some(delivery) = snapshot.delivery_mut(delivery_id) {
                delivery.codes_verified = true;
                if *sync_payment_released {
                    delivery.payment_released = true;
                } else {
                    releasing = delivery.is_delivered() && !delivery.payment_released;
                }
            }
            if let Some(order) = snapshot.order_mut(order_id) {
                order.codes_verified = true;
                if *sync_payment_released {
                    order.payment_released = true;
                }
            }

            let releasing = releasing
                && snapshot.order(order_id).is_some_and(|o| !o.refund_is_final())
                && snapshot
                    .payment_for_delivery(delivery_id)
                    .is_some_and(|p| p.status == PaymentStatus::PendingRelease);
            let details = match (*sync_payment_released, releasing) {
                (true, _) => format!(
                    "Admin manually overrode exception for delivery {}. Codes marked verified, payment flags synced.",
                    delivery_id
                ),
                (false, true) => format!(
                    "Admin manually overrode exception for delivery {}. Codes marked verified, payment released.",
                    delivery_id
                ),
                (false, false) => format!(
                    "Admin manually overrode exception for delivery {}. Codes marked verified.",
                    delivery_id
                ),
            };
            snapshot.append_audit(
                event.timestamp,
                AuditAction::ManualOverride,
                event.actor_id.clone(),
                details,
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

    fn create_overridden_event(sync_payment_released: bool) -> EscrowEvent {
        EscrowEvent::new(
            4,
            "admin".to_string(),
            ActorRole::Admin,
            "cmd-4".to_string(),
            TEST_NOW,
            EscrowEventType::DeliveryOverridden,
            EventPayload::DeliveryOverridden {
                delivery_id: "D001".to_string(),
                order_id: "O001".to_string(),
                sync_payment_released,
            },
        )
    }

    #[test]
    fn test_override_syncs_flags_without_money() {
        let mut snapshot = delivered_snapshot();
        snapshot.delivery_mut("D001").unwrap().payment_released = false;
        snapshot.order_mut("O001").unwrap().payment_released = false;

        DeliveryOverriddenApplier.apply(&mut snapshot, &create_overridden_event(true));

        assert!(snapshot.delivery("D001").unwrap().payment_released);
        assert!(snapshot.order("O001").unwrap().payment_released);
        assert_eq!(snapshot.farmer("F001").unwrap().balance, 1248.0);
        assert_eq!(snapshot.audit_log[0].action, AuditAction::ManualOverride);
    }

    #[test]
    fn test_override_marks_codes_verified() {
        let mut snapshot = delivered_snapshot();
        snapshot.delivery_mut("D001").unwrap().codes_verified = false;
        snapshot.order_mut("O001").unwrap().codes_verified = false;

        DeliveryOverriddenApplier.apply(&mut snapshot, &create_overridden_event(false));

        assert!(snapshot.delivery("D001").unwrap().codes_verified);
        assert!(snapshot.order("O001").unwrap().codes_verified);
    }
}
