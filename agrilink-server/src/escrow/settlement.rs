//! Payment settlement helpers shared by actions
//!
//! - Release: Pending Release → Released (confirmation, manual override)
//! - Refund: RefundApproved, plus Released → Refunded when the farmer was paid

use super::traits::{CommandContext, CommandMetadata};
use shared::escrow::{Actor, EscrowEvent, EscrowEventType, EventPayload};
use shared::models::{Order, Payment, PaymentStatus};
use shared::util::format_date;

/// Whether `at` is still inside the refund window opened at `delivered_at`
///
/// 边界包含：恰好等于窗口长度仍然有效。
pub fn within_refund_window(delivered_at: i64, at: i64, window_ms: i64) -> bool {
    at.saturating_sub(delivered_at) <= window_ms
}

/// PaymentReleased event for a pending payment, `None` if nothing to release
pub fn release_payment(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    payment: &Payment,
) -> Option<EscrowEvent> {
    if !payment.status.can_transition_to(PaymentStatus::Released) {
        return None;
    }

    let seq = ctx.next_sequence();
    Some(EscrowEvent::new(
        seq,
        metadata.actor.id.clone(),
        metadata.actor.role,
        metadata.command_id.clone(),
        metadata.timestamp,
        EscrowEventType::PaymentReleased,
        EventPayload::PaymentReleased {
            payment_id: payment.id.clone(),
            delivery_id: payment.delivery_id.clone(),
            order_id: payment.order_id.clone(),
            farmer_id: payment.farmer_id.clone(),
            amount: payment.amount,
            date_released: format_date(metadata.timestamp),
        },
    ))
}

/// Approval events for a pending refund
///
/// `approver` is the admin, or SYSTEM for automatic approval.
pub fn approve_refund(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    approver: &Actor,
    order: &Order,
) -> Vec<EscrowEvent> {
    let automatic = approver.id == Actor::system().id;
    let mut events = Vec::with_capacity(2);

    let seq = ctx.next_sequence();
    events.push(EscrowEvent::new(
        seq,
        approver.id.clone(),
        approver.role,
        metadata.command_id.clone(),
        metadata.timestamp,
        EscrowEventType::RefundApproved,
        EventPayload::RefundApproved {
            order_id: order.id.clone(),
            buyer_id: order.buyer_id.clone(),
            amount: order.total_price,
            automatic,
        },
    ));

    // 农户已收款时冲正
    let snapshot = ctx.snapshot();
    match snapshot.payment_for_order(&order.id) {
        Some(payment) if payment.status.can_transition_to(PaymentStatus::Refunded) => {
            let seq = ctx.next_sequence();
            events.push(EscrowEvent::new(
                seq,
                approver.id.clone(),
                approver.role,
                metadata.command_id.clone(),
                metadata.timestamp,
                EscrowEventType::PaymentRefunded,
                EventPayload::PaymentRefunded {
                    payment_id: payment.id.clone(),
                    order_id: order.id.clone(),
                    farmer_id: payment.farmer_id.clone(),
                    amount: payment.amount,
                    date_refunded: format_date(metadata.timestamp),
                },
            ));
        }
        Some(_) => {}
        None => {
            tracing::warn!(order_id = %order.id, "Refund approved for order without payment record");
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{create_test_metadata, order_fixture, payment_fixture};
    use crate::escrow::traits::{DEFAULT_REFUND_WINDOW_MS, EscrowPolicy};
    use shared::escrow::MarketplaceSnapshot;

    #[test]
    fn test_refund_window_is_inclusive() {
        let delivered = 1_000;
        assert!(within_refund_window(delivered, delivered, DEFAULT_REFUND_WINDOW_MS));
        assert!(within_refund_window(
            delivered,
            delivered + DEFAULT_REFUND_WINDOW_MS,
            DEFAULT_REFUND_WINDOW_MS
        ));
        assert!(!within_refund_window(
            delivered,
            delivered + DEFAULT_REFUND_WINDOW_MS + 1,
            DEFAULT_REFUND_WINDOW_MS
        ));
    }

    #[test]
    fn test_release_only_pending_payment() {
        let snapshot = MarketplaceSnapshot::default();
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::admin("admin"));

        let mut payment = payment_fixture("P001", "O001", "D001");
        let event = release_payment(&mut ctx, &metadata, &payment).unwrap();
        assert_eq!(event.event_type, EscrowEventType::PaymentReleased);
        assert_eq!(event.sequence, 1);

        payment.status = PaymentStatus::Released;
        assert!(release_payment(&mut ctx, &metadata, &payment).is_none());
    }

    #[test]
    fn test_approve_refund_reverses_released_payment() {
        let mut payment = payment_fixture("P001", "O001", "D001");
        payment.status = PaymentStatus::Released;
        let snapshot = MarketplaceSnapshot {
            payments: vec![payment],
            ..Default::default()
        };
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 5);
        let metadata = create_test_metadata(Actor::admin("admin"));

        let events =
            approve_refund(&mut ctx, &metadata, &metadata.actor, &order_fixture("O001"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EscrowEventType::RefundApproved);
        assert_eq!(events[1].event_type, EscrowEventType::PaymentRefunded);
        assert_eq!(events[1].sequence, 7);
    }

    #[test]
    fn test_approve_refund_pending_payment_has_no_reversal() {
        let snapshot = MarketplaceSnapshot {
            payments: vec![payment_fixture("P001", "O001", "D001")],
            ..Default::default()
        };
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::admin("admin"));

        let events =
            approve_refund(&mut ctx, &metadata, &Actor::system(), &order_fixture("O001"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor_id, "SYSTEM");
        if let EventPayload::RefundApproved { automatic, .. } = &events[0].payload {
            assert!(*automatic);
        } else {
            panic!("Expected RefundApproved payload");
        }
    }
}
