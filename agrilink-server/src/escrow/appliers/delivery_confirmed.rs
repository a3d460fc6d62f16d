//! DeliveryConfirmed event applier

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, DeliveryStatus, OrderStatus, PaymentStatus};

/// DeliveryConfirmed applier
pub struct DeliveryConfirmedApplier;

impl EventApplier for DeliveryConfirmedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::DeliveryConfirmed {
            delivery_id,
            order_id,
            delivery_agent_id,
            date_delivered,
            time_delivered,
        } = &event.payload
        {
            if let Some(delivery) = snapshot.delivery_mut(delivery_id) {
                delivery.status = DeliveryStatus::Delivered;
                delivery.codes_verified = true;
                delivery.delivery_agent_id = Some(delivery_agent_id.clone());
                delivery.date_delivered = Some(date_delivered.clone());
                delivery.time_delivered = Some(time_delivered.clone());
            }

            if let Some(order) = snapshot.order_mut(order_id) {
                order.status = OrderStatus::Delivered;
                order.codes_verified = true;
                order.delivery_agent_id = Some(delivery_agent_id.clone());
                // 只设置一次
                if order.delivery_timestamp.is_none() {
                    order.delivery_timestamp = Some(event.timestamp);
                }
            }

            // Release follows in the same command
            let releasing = snapshot
                .payment_for_delivery(delivery_id)
                .is_some_and(|p| p.status == PaymentStatus::PendingRelease);
            let details = if releasing {
                format!(
                    "Delivery {} confirmed. All codes verified. Payment released automatically.",
                    delivery_id
                )
            } else {
                format!("Delivery {} confirmed. All codes verified.", delivery_id)
            };
            snapshot.append_audit(
                event.timestamp,
                AuditAction::DeliveryConfirmed,
                delivery_agent_id.clone(),
                details,
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
