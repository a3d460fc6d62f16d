//! RequestRefund command handler
//!
//! Buyer asks for a refund on a delivered order, inside the refund window.
//! No money moves here unless auto-approval is enabled and the order's codes
//! were verified, in which case SYSTEM approves in the same command.

use async_trait::async_trait;

use crate::auth::passcode::verify_passcode;
use crate::escrow::settlement::{approve_refund, within_refund_window};
use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{Actor, ActorRole, EscrowEvent, EscrowEventType, EventPayload, Secret};
use shared::models::RefundStatus;

/// Stored when the buyer leaves the reason blank
pub const NO_REASON: &str = "No reason provided";

/// RequestRefund action
#[derive(Debug, Clone)]
pub struct RequestRefundAction {
    pub order_id: String,
    pub passcode: Secret,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for RequestRefundAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let snapshot = ctx.snapshot();

        // 1. Order must exist
        let order = snapshot
            .order(&self.order_id)
            .ok_or_else(|| EscrowError::OrderNotFound(self.order_id.clone()))?;

        // 2. Only the order's buyer (or admin)
        match metadata.actor.role {
            ActorRole::Admin => {}
            ActorRole::Buyer if metadata.actor.id == order.buyer_id => {}
            _ => {
                return Err(EscrowError::PermissionDenied(
                    "refunds can only be requested by the order's buyer".to_string(),
                ));
            }
        }

        // 3. Passcode of the order's buyer
        let buyer = snapshot
            .buyer(&order.buyer_id)
            .ok_or_else(|| EscrowError::BuyerNotFound(order.buyer_id.clone()))?;
        if !verify_passcode(self.passcode.expose(), &buyer.passcode_hash) {
            crate::security_log!(
                "WARN",
                "refund_passcode_failed",
                buyer_id = buyer.id.as_str(),
                order_id = order.id.as_str()
            );
            return Err(EscrowError::InvalidPasscode);
        }

        // 4. Delivered with a timestamp, inside the window
        if !order.is_delivered() {
            return Err(EscrowError::OrderNotDelivered(order.id.clone()));
        }
        let delivered_at = order
            .delivery_timestamp
            .ok_or_else(|| EscrowError::DeliveryTimestampMissing(order.id.clone()))?;
        if !within_refund_window(delivered_at, metadata.timestamp, ctx.policy().refund_window_ms) {
            return Err(EscrowError::RefundWindowExpired(order.id.clone()));
        }

        // 5. Refund state (rejected may be resubmitted)
        if order.refund_status == RefundStatus::Pending {
            return Err(EscrowError::RefundAlreadyRequested(order.id.clone()));
        }
        if order.refund_is_final() {
            return Err(EscrowError::RefundAlreadyFinal(order.id.clone()));
        }

        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(NO_REASON)
            .to_string();

        // 6. Create events
        let seq = ctx.next_sequence();
        let mut events = vec![EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::RefundRequested,
            EventPayload::RefundRequested {
                order_id: order.id.clone(),
                buyer_id: order.buyer_id.clone(),
                reason,
            },
        )];

        // 7. Auto-approval
        if ctx.policy().auto_approve_refunds && order.codes_verified {
            events.extend(approve_refund(ctx, metadata, &Actor::system(), order));
        }

        Ok(events)
    }
}
