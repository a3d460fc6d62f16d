//! RefundRequested event applier

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, RefundStatus};

/// RefundRequested applier
pub struct RefundRequestedApplier;

impl EventApplier for RefundRequestedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::RefundRequested {
            order_id,
            buyer_id,
            reason,
        } = &event.payload
        {
            let mut total = 0.0;
            if let Some(order) = snapshot.order_mut(order_id) {
                order.refund_requested = true;
                order.refund_status = RefundStatus::Pending;
                order.refund_reason = Some(reason.clone());
                order.refund_timestamp = Some(event.timestamp);
                order.refund_rejection_note = None;
                total = order.total_price;
            }

            snapshot.append_audit(
                event.timestamp,
                AuditAction::RefundRequested,
                buyer_id.clone(),
                format!(
                    "Buyer requested refund for order {} ({} ETB). Reason: {}",
                    order_id, total, reason
                ),
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
