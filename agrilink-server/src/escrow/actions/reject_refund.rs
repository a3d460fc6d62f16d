//! RejectRefund command handler (admin)
//!
//! No money moves. A rejected refund may be requested again.

use async_trait::async_trait;

use super::request_refund::NO_REASON;
use crate::escrow::traits::{
    CommandContext, CommandHandler, CommandMetadata, EscrowError, require_admin,
};
use shared::escrow::{EscrowEvent, EscrowEventType, EventPayload};
use shared::models::RefundStatus;

/// RejectRefund action
#[derive(Debug, Clone)]
pub struct RejectRefundAction {
    pub order_id: String,
    pub note: Option<String>,
}

#[async_trait]
impl CommandHandler for RejectRefundAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        // 1. Admin only
        require_admin(&metadata.actor)?;

        // 2. Must be pending
        let snapshot = ctx.snapshot();
        let order = snapshot
            .order(&self.order_id)
            .ok_or_else(|| EscrowError::OrderNotFound(self.order_id.clone()))?;
        if order.refund_status != RefundStatus::Pending {
            return Err(EscrowError::RefundNotPending(order.id.clone()));
        }

        let note = self
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(NO_REASON)
            .to_string();

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::RefundRejected,
            EventPayload::RefundRejected {
                order_id: order.id.clone(),
                note,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{create_test_metadata, delivered_snapshot};
    use crate::escrow::traits::EscrowPolicy;
    use shared::escrow::{Actor, ActorRole};

    #[tokio::test]
    async fn test_reject_refund_default_note() {
        let mut snapshot = delivered_snapshot();
        snapshot.order_mut("O001").unwrap().refund_status = RefundStatus::Pending;

        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::admin("admin"));
        let events = RejectRefundAction {
            order_id: "O001".to_string(),
            note: None,
        }
        .execute(&mut ctx, &metadata)
        .await
        .unwrap();

        assert_eq!(events.len(), 1);
        if let EventPayload::RefundRejected { note, .. } = &events[0].payload {
            assert_eq!(note, NO_REASON);
        } else {
            panic!("Expected RefundRejected payload");
        }
    }

    #[tokio::test]
    async fn test_reject_refund_requires_pending() {
        let snapshot = delivered_snapshot();
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::admin("admin"));
        let result = RejectRefundAction {
            order_id: "O001".to_string(),
            note: Some("photos unclear".to_string()),
        }
        .execute(&mut ctx, &metadata)
        .await;
        assert!(matches!(result, Err(EscrowError::RefundNotPending(_))));
    }

    #[tokio::test]
    async fn test_reject_refund_requires_admin() {
        let snapshot = delivered_snapshot();
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::new("F001", ActorRole::Farmer));
        let result = RejectRefundAction {
            order_id: "O001".to_string(),
            note: None,
        }
        .execute(&mut ctx, &metadata)
        .await;
        assert!(matches!(result, Err(EscrowError::AdminRequired)));
    }
}
