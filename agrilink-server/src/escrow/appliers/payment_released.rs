//! PaymentReleased event applier
//!
//! Escrow → farmer. Guarded by the forward-only payment transition, so a
//! replayed or duplicated event never credits twice.

use crate::escrow::money::credit;
use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::PaymentStatus;

/// PaymentReleased applier
pub struct PaymentReleasedApplier;

impl EventApplier for PaymentReleasedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::PaymentReleased {
            payment_id,
            delivery_id,
            order_id,
            farmer_id,
            amount,
            date_released,
        } = &event.payload
        {
            let released = match snapshot.payment_mut(payment_id) {
                Some(payment) if payment.status.can_transition_to(PaymentStatus::Released) => {
                    payment.status = PaymentStatus::Released;
                    payment.date_released = Some(date_released.clone());
                    true
                }
                _ => false,
            };

            if released {
                if let Some(farmer) = snapshot.farmer_mut(farmer_id) {
                    farmer.balance = credit(farmer.balance, *amount);
                    farmer.total_earned = credit(farmer.total_earned, *amount);
                    farmer.successful_deliveries += 1;
                }
                if let Some(delivery) = snapshot.delivery_mut(delivery_id) {
                    delivery.payment_released = true;
                }
                if let Some(order) = snapshot.order_mut(order_id) {
                    order.payment_released = true;
                }
            } else {
                tracing::warn!(payment_id = %payment_id, "Payment not releasable, skipping");
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
