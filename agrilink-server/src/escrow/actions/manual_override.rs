//! ManualOverride command handler (admin)
//!
//! Force-resolves a delivery flagged by the exception auditor: codes are
//! marked verified, and a delivered-but-unpaid escrow is released unless the
//! buyer has already been refunded.

use async_trait::async_trait;

use crate::escrow::auditor::classify;
use crate::escrow::settlement::release_payment;
use crate::escrow::traits::{
    CommandContext, CommandHandler, CommandMetadata, EscrowError, require_admin,
};
use shared::escrow::{EscrowEvent, EscrowEventType, EventPayload};
use shared::models::PaymentStatus;

/// ManualOverride action
#[derive(Debug, Clone)]
pub struct ManualOverrideAction {
    pub delivery_id: String,
}

#[async_trait]
impl CommandHandler for ManualOverrideAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        // 1. Admin only
        require_admin(&metadata.actor)?;

        // 2. Delivery and order must exist
        let snapshot = ctx.snapshot();
        let delivery = snapshot
            .delivery(&self.delivery_id)
            .ok_or_else(|| EscrowError::DeliveryNotFound(self.delivery_id.clone()))?;
        let Some(order) = snapshot.order(&delivery.order_id) else {
            tracing::error!(
                delivery_id = %delivery.id,
                order_id = %delivery.order_id,
                "Delivery references a missing order"
            );
            return Err(EscrowError::OrphanDelivery(self.delivery_id.clone()));
        };

        // 3. Only exceptions can be overridden
        let Some(issue) = classify(delivery) else {
            return Err(EscrowError::NotAnException(delivery.id.clone()));
        };

        // 4. Payment handling
        let payment = snapshot.payment_for_delivery(&delivery.id);
        let unpaid = delivery.is_delivered() && !delivery.payment_released;
        let sync_payment_released =
            unpaid && payment.is_some_and(|p| p.status == PaymentStatus::Released);
        // 已退款给买家的订单，托管款不再付给农户
        let needs_release = unpaid && !order.refund_is_final();
        if unpaid && !needs_release {
            tracing::warn!(
                delivery_id = %delivery.id,
                order_id = %order.id,
                "Refund already approved, escrow stays frozen"
            );
        }

        tracing::info!(
            delivery_id = %delivery.id,
            issue = issue.label(),
            admin = %metadata.actor.id,
            "Manual override"
        );

        // 5. Create events
        let seq = ctx.next_sequence();
        let mut events = vec![EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::DeliveryOverridden,
            EventPayload::DeliveryOverridden {
                delivery_id: delivery.id.clone(),
                order_id: order.id.clone(),
                sync_payment_released,
            },
        )];

        if needs_release && let Some(payment) = payment {
            events.extend(release_payment(ctx, metadata, payment));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{
        create_test_metadata, delivered_snapshot, snapshot_with_triple,
    };
    use crate::escrow::traits::EscrowPolicy;
    use shared::escrow::{Actor, ActorRole, MarketplaceSnapshot};
    use shared::models::{DeliveryStatus, RefundStatus};

    async fn run(
        snapshot: &MarketplaceSnapshot,
        actor: Actor,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(snapshot, &policy, 0);
        let metadata = create_test_metadata(actor);
        ManualOverrideAction {
            delivery_id: "D001".to_string(),
        }
        .execute(&mut ctx, &metadata)
        .await
    }

    #[tokio::test]
    async fn test_override_codes_not_verified_releases_payment() {
        let mut snapshot = snapshot_with_triple();
        snapshot.delivery_mut("D001").unwrap().status = DeliveryStatus::Delivered;

        let events = run(&snapshot, Actor::admin("admin")).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EscrowEventType::DeliveryOverridden);
        assert_eq!(events[1].event_type, EscrowEventType::PaymentReleased);
        if let EventPayload::DeliveryOverridden {
            sync_payment_released,
            ..
        } = &events[0].payload
        {
            assert!(!sync_payment_released);
        } else {
            panic!("Expected DeliveryOverridden payload");
        }
    }

    #[tokio::test]
    async fn test_override_status_inconsistency_moves_no_money() {
        let mut snapshot = snapshot_with_triple();
        snapshot.delivery_mut("D001").unwrap().codes_verified = true;

        let events = run(&snapshot, Actor::admin("admin")).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_override_already_released_only_syncs_flags() {
        let mut snapshot = delivered_snapshot();
        {
            let delivery = snapshot.delivery_mut("D001").unwrap();
            delivery.payment_released = false;
        }

        let events = run(&snapshot, Actor::admin("admin")).await.unwrap();
        assert_eq!(events.len(), 1);
        if let EventPayload::DeliveryOverridden {
            sync_payment_released,
            ..
        } = &events[0].payload
        {
            assert!(sync_payment_released);
        } else {
            panic!("Expected DeliveryOverridden payload");
        }
    }

    #[tokio::test]
    async fn test_override_after_refund_never_pays_farmer() {
        let mut snapshot = snapshot_with_triple();
        snapshot.delivery_mut("D001").unwrap().status = DeliveryStatus::Delivered;
        {
            let order = snapshot.order_mut("O001").unwrap();
            order.refund_requested = true;
            order.refund_status = RefundStatus::Approved;
            order.refund_processed = true;
        }

        let events = run(&snapshot, Actor::admin("admin")).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EscrowEventType::DeliveryOverridden);
    }

    #[tokio::test]
    async fn test_override_healthy_delivery_rejected() {
        let snapshot = delivered_snapshot();
        let result = run(&snapshot, Actor::admin("admin")).await;
        assert!(matches!(result, Err(EscrowError::NotAnException(_))));

        let snapshot = snapshot_with_triple();
        let result = run(&snapshot, Actor::admin("admin")).await;
        assert!(matches!(result, Err(EscrowError::NotAnException(_))));
    }

    #[tokio::test]
    async fn test_override_requires_admin() {
        let snapshot = snapshot_with_triple();
        let result = run(&snapshot, Actor::new("DA001", ActorRole::DeliveryAgent)).await;
        assert!(matches!(result, Err(EscrowError::AdminRequired)));
    }

    #[tokio::test]
    async fn test_override_orphan() {
        let mut snapshot = snapshot_with_triple();
        snapshot.delivery_mut("D001").unwrap().status = DeliveryStatus::Delivered;
        snapshot.orders.clear();
        let result = run(&snapshot, Actor::admin("admin")).await;
        assert!(matches!(result, Err(EscrowError::OrphanDelivery(_))));
    }
}
