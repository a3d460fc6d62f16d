//! ConfirmDelivery command handler
//!
//! Two-sided code handshake at handoff: the agent submits the farmer's code
//! and the buyer's code. On success the delivery is marked Delivered and a
//! pending payment is released to the farmer in the same command.

use async_trait::async_trait;

use crate::escrow::codes::codes_match;
use crate::escrow::settlement::release_payment;
use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{ActorRole, EscrowEvent, EscrowEventType, EventPayload, Secret};
use shared::util::{format_date, format_time};

/// ConfirmDelivery action
#[derive(Debug, Clone)]
pub struct ConfirmDeliveryAction {
    pub delivery_id: String,
    pub delivery_agent_id: String,
    pub farmer_code: Secret,
    pub buyer_code: Secret,
}

#[async_trait]
impl CommandHandler for ConfirmDeliveryAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let snapshot = ctx.snapshot();

        // 1. Agents may only confirm as themselves
        match metadata.actor.role {
            ActorRole::Admin => {}
            ActorRole::DeliveryAgent if metadata.actor.id == self.delivery_agent_id => {}
            _ => {
                return Err(EscrowError::PermissionDenied(
                    "deliveries can only be confirmed by the delivery agent".to_string(),
                ));
            }
        }

        // 2. Delivery must exist and still be pending
        let delivery = snapshot
            .delivery(&self.delivery_id)
            .ok_or_else(|| EscrowError::DeliveryNotFound(self.delivery_id.clone()))?;
        if delivery.is_delivered() {
            return Err(EscrowError::AlreadyConfirmed(self.delivery_id.clone()));
        }

        // 3. Referenced order must exist
        let Some(order) = snapshot.order(&delivery.order_id) else {
            tracing::error!(
                delivery_id = %delivery.id,
                order_id = %delivery.order_id,
                "Delivery references a missing order"
            );
            return Err(EscrowError::OrphanDelivery(self.delivery_id.clone()));
        };

        // 4. Codes
        if !codes_match(self.farmer_code.expose(), &order.farmer_code) {
            crate::security_log!(
                "WARN",
                "farmer_code_mismatch",
                delivery_id = delivery.id.as_str(),
                agent_id = self.delivery_agent_id.as_str()
            );
            return Err(EscrowError::FarmerCodeMismatch);
        }
        if !codes_match(self.buyer_code.expose(), &order.buyer_code) {
            crate::security_log!(
                "WARN",
                "buyer_code_mismatch",
                delivery_id = delivery.id.as_str(),
                agent_id = self.delivery_agent_id.as_str()
            );
            return Err(EscrowError::BuyerCodeMismatch);
        }

        // 5. Agent binding (unset accepts the submitted agent)
        if let Some(bound) = &order.delivery_agent_id
            && bound != &self.delivery_agent_id
        {
            crate::security_log!(
                "WARN",
                "agent_mismatch",
                delivery_id = delivery.id.as_str(),
                agent_id = self.delivery_agent_id.as_str()
            );
            return Err(EscrowError::AgentMismatch);
        }

        // 6. Create events
        let seq = ctx.next_sequence();
        let mut events = vec![EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::DeliveryConfirmed,
            EventPayload::DeliveryConfirmed {
                delivery_id: delivery.id.clone(),
                order_id: order.id.clone(),
                delivery_agent_id: self.delivery_agent_id.clone(),
                date_delivered: format_date(metadata.timestamp),
                time_delivered: format_time(metadata.timestamp),
            },
        )];

        // 7. Release escrow
        match snapshot.payment_for_delivery(&delivery.id) {
            Some(payment) => events.extend(release_payment(ctx, metadata, payment)),
            None => {
                tracing::warn!(delivery_id = %delivery.id, "Delivery confirmed without payment record");
            }
        }

        Ok(events)
    }
}
