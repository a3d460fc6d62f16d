//! OrderPlaced event applier
//!
//! Appends the Order/Delivery/Payment triple, takes the quantity out of the
//! listing (sold at zero) and records the crop's demand.

use crate::escrow::money::record_demand;
use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::{AuditAction, ListingStatus};

/// OrderPlaced applier
pub struct OrderPlacedApplier;

impl EventApplier for OrderPlacedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::OrderPlaced {
            order,
            delivery,
            payment,
        } = &event.payload
        {
            // Stock
            if let Some(listing) = snapshot.listing_mut(&order.listing_id) {
                listing.quantity = (listing.quantity - order.quantity).max(0);
                if listing.quantity == 0 {
                    listing.status = ListingStatus::Sold;
                }
            }

            // Demand
            let metric = record_demand(snapshot.demand_metrics.get(&order.crop), order.price_per_unit);
            snapshot.demand_metrics.insert(order.crop.clone(), metric);

            let details = format!(
                "Buyer ordered {}{} of {}",
                order.quantity, order.unit, order.crop_en
            );
            snapshot.orders.push(order.as_ref().clone());
            snapshot.deliveries.push(delivery.as_ref().clone());
            snapshot.payments.push(payment.as_ref().clone());
            snapshot.append_audit(
                event.timestamp,
                AuditAction::OrderPlaced,
                event.actor_id.clone(),
                details,
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
