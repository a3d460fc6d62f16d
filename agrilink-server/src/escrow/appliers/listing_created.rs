//! ListingCreated event applier

use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::AuditAction;

/// ListingCreated applier
pub struct ListingCreatedApplier;

impl EventApplier for ListingCreatedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::ListingCreated { listing } = &event.payload {
            let details = format!(
                "Farmer listed {}{} of {}",
                listing.quantity, listing.unit, listing.crop_en
            );
            snapshot.listings.push(listing.as_ref().clone());
            snapshot.append_audit(
                event.timestamp,
                AuditAction::ListingCreated,
                event.actor_id.clone(),
                details,
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
