//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};

mod buyer_registered;
mod delivery_confirmed;
mod delivery_overridden;
mod farmer_rated;
mod listing_created;
mod order_placed;
mod payment_refunded;
mod payment_released;
mod refund_approved;
mod refund_rejected;
mod refund_requested;

pub use buyer_registered::BuyerRegisteredApplier;
pub use delivery_confirmed::DeliveryConfirmedApplier;
pub use delivery_overridden::DeliveryOverriddenApplier;
pub use farmer_rated::{FarmerRatedApplier, RatingSkippedApplier};
pub use listing_created::ListingCreatedApplier;
pub use order_placed::OrderPlacedApplier;
pub use payment_refunded::PaymentRefundedApplier;
pub use payment_released::PaymentReleasedApplier;
pub use refund_approved::RefundApprovedApplier;
pub use refund_rejected::RefundRejectedApplier;
pub use refund_requested::RefundRequestedApplier;

/// Event applier
///
/// 与 `EventAction` 放在同一模块，生成的 impl 才能看到各 applier 类型。
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent);
}

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    BuyerRegistered(BuyerRegisteredApplier),
    ListingCreated(ListingCreatedApplier),
    OrderPlaced(OrderPlacedApplier),
    DeliveryConfirmed(DeliveryConfirmedApplier),
    PaymentReleased(PaymentReleasedApplier),
    RefundRequested(RefundRequestedApplier),
    RefundApproved(RefundApprovedApplier),
    PaymentRefunded(PaymentRefundedApplier),
    RefundRejected(RefundRejectedApplier),
    DeliveryOverridden(DeliveryOverriddenApplier),
    FarmerRated(FarmerRatedApplier),
    RatingSkipped(RatingSkippedApplier),
}

/// Convert EscrowEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&EscrowEvent> for EventAction {
    fn from(event: &EscrowEvent) -> Self {
        match &event.payload {
            EventPayload::BuyerRegistered { .. } => {
                EventAction::BuyerRegistered(BuyerRegisteredApplier)
            }
            EventPayload::ListingCreated { .. } => {
                EventAction::ListingCreated(ListingCreatedApplier)
            }
            EventPayload::OrderPlaced { .. } => EventAction::OrderPlaced(OrderPlacedApplier),
            EventPayload::DeliveryConfirmed { .. } => {
                EventAction::DeliveryConfirmed(DeliveryConfirmedApplier)
            }
            EventPayload::PaymentReleased { .. } => {
                EventAction::PaymentReleased(PaymentReleasedApplier)
            }
            EventPayload::RefundRequested { .. } => {
                EventAction::RefundRequested(RefundRequestedApplier)
            }
            EventPayload::RefundApproved { .. } => {
                EventAction::RefundApproved(RefundApprovedApplier)
            }
            EventPayload::PaymentRefunded { .. } => {
                EventAction::PaymentRefunded(PaymentRefundedApplier)
            }
            EventPayload::RefundRejected { .. } => {
                EventAction::RefundRejected(RefundRejectedApplier)
            }
            EventPayload::DeliveryOverridden { .. } => {
                EventAction::DeliveryOverridden(DeliveryOverriddenApplier)
            }
            EventPayload::FarmerRated { .. } => EventAction::FarmerRated(FarmerRatedApplier),
            EventPayload::RatingSkipped { .. } => EventAction::RatingSkipped(RatingSkippedApplier),
        }
    }
}

/// Replay events onto a snapshot in order
pub fn replay<'e>(
    snapshot: &mut MarketplaceSnapshot,
    events: impl IntoIterator<Item = &'e EscrowEvent>,
) {
    for event in events {
        let applier: EventAction = event.into();
        applier.apply(snapshot, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{TEST_BUYER_ID, TEST_NOW, delivered_snapshot};
    use shared::escrow::{ActorRole, EscrowEventType};
    use shared::models::RefundStatus;

    fn event(sequence: u64, event_type: EscrowEventType, payload: EventPayload) -> EscrowEvent {
        EscrowEvent::new(
            sequence,
            TEST_BUYER_ID.to_string(),
            ActorRole::Buyer,
            format!("cmd-{}", sequence),
            TEST_NOW + sequence as i64,
            event_type,
            payload,
        )
    }

    #[test]
    fn test_replay_dispatches_by_payload() {
        let mut snapshot = delivered_snapshot();
        let audit_before = snapshot.audit_log.len();
        let events = vec![
            event(
                1,
                EscrowEventType::RefundRequested,
                EventPayload::RefundRequested {
                    order_id: "O001".to_string(),
                    buyer_id: TEST_BUYER_ID.to_string(),
                    reason: "bruised".to_string(),
                },
            ),
            event(
                2,
                EscrowEventType::RefundRejected,
                EventPayload::RefundRejected {
                    order_id: "O001".to_string(),
                    note: "photos show good condition".to_string(),
                },
            ),
        ];

        replay(&mut snapshot, &events);

        let order = snapshot.order("O001").unwrap();
        assert_eq!(order.refund_status, RefundStatus::Rejected);
        assert_eq!(order.refund_reason.as_deref(), Some("bruised"));
        assert_eq!(snapshot.last_sequence, 2);
        assert_eq!(snapshot.audit_log.len(), audit_before + 2);
    }
}
