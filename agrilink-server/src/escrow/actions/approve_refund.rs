//! ApproveRefund command handler (admin)
//!
//! Credits the buyer with the order total. A payment already released to the
//! farmer is reversed (Released → Refunded).

use async_trait::async_trait;

use crate::escrow::settlement::{self, within_refund_window};
use crate::escrow::traits::{
    CommandContext, CommandHandler, CommandMetadata, EscrowError, require_admin,
};
use shared::escrow::EscrowEvent;
use shared::models::RefundStatus;

/// ApproveRefund action
#[derive(Debug, Clone)]
pub struct ApproveRefundAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for ApproveRefundAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        // 1. Admin only
        require_admin(&metadata.actor)?;

        // 2. Order must exist with a pending refund
        let snapshot = ctx.snapshot();
        let order = snapshot
            .order(&self.order_id)
            .ok_or_else(|| EscrowError::OrderNotFound(self.order_id.clone()))?;
        if order.refund_is_final() {
            return Err(EscrowError::RefundAlreadyFinal(order.id.clone()));
        }
        if order.refund_status != RefundStatus::Pending {
            return Err(EscrowError::RefundNotPending(order.id.clone()));
        }

        // 3. Request must have been made inside the window
        let delivered_at = order
            .delivery_timestamp
            .ok_or_else(|| EscrowError::DeliveryTimestampMissing(order.id.clone()))?;
        let requested_at = order.refund_timestamp.unwrap_or(metadata.timestamp);
        if !within_refund_window(delivered_at, requested_at, ctx.policy().refund_window_ms) {
            return Err(EscrowError::RefundWindowExpired(order.id.clone()));
        }

        // 4. Create events
        Ok(settlement::approve_refund(ctx, metadata, &metadata.actor, order))
    }
}
