//! BuyerRegistered event applier

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::AuditAction;

/// BuyerRegistered applier
pub struct BuyerRegisteredApplier;

impl EventApplier for BuyerRegisteredApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::BuyerRegistered { buyer } = &event.payload {
            let details = format!("New buyer account created: {} ({})", buyer.name, buyer.email);
            snapshot.buyers.push(buyer.as_ref().clone());
            snapshot.append_audit(
                event.timestamp,
                AuditAction::BuyerRegistered,
                buyer.id.clone(),
                details,
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
