//! PaymentRefunded event applier
//!
//! Released → Refunded. The farmer's balance and total earned are reduced
//! by the amount, floored at zero.

use crate::escrow::money::debit_floored;
use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::PaymentStatus;

/// PaymentRefunded applier
pub struct PaymentRefundedApplier;

impl EventApplier for PaymentRefundedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::PaymentRefunded {
            payment_id,
            farmer_id,
            amount,
            date_refunded,
            ..
        } = &event.payload
        {
            let refunded = match snapshot.payment_mut(payment_id) {
                Some(payment) if payment.status.can_transition_to(PaymentStatus::Refunded) => {
                    payment.status = PaymentStatus::Refunded;
                    payment.date_refunded = Some(date_refunded.clone());
                    true
                }
                _ => false,
            };

            if refunded {
                if let Some(farmer) = snapshot.farmer_mut(farmer_id) {
                    farmer.balance = debit_floored(farmer.balance, *amount);
                    farmer.total_earned = debit_floored(farmer.total_earned, *amount);
                }
            } else {
                tracing::warn!(payment_id = %payment_id, "Payment not refundable, skipping");
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
